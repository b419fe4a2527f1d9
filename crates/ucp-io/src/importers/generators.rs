use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use ucp_core::Generator;

/// Lines preceding the first generator row (column names, then units)
pub const GENERATOR_HEADER_LINES: usize = 2;

/// Columns after the header, in file order
pub const GENERATOR_COLUMNS: [&str; 9] = [
    "name",
    "minOutput",
    "maxOutput",
    "startupCost",
    "commitmentCost",
    "rampRate",
    "minUpTime",
    "minDownTime",
    "marginalCost",
];

/// Read a whitespace-separated generator table from disk.
pub fn parse_generators_file(path: &Path) -> Result<Vec<Generator>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading generator table '{}'", path.display()))?;
    parse_generators_string(&content)
        .with_context(|| format!("parsing generator table '{}'", path.display()))
}

/// Parse a generator table.
///
/// The first [`GENERATOR_HEADER_LINES`] lines are skipped. Every following
/// non-blank line holds the nine [`GENERATOR_COLUMNS`]; the ramp rate
/// applies to both directions.
pub fn parse_generators_string(content: &str) -> Result<Vec<Generator>> {
    let mut lines = content.lines().enumerate();
    for _ in 0..GENERATOR_HEADER_LINES {
        if lines.next().is_none() {
            bail!("generator table ends inside its {GENERATOR_HEADER_LINES}-line header");
        }
    }

    let mut generators = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let generator = parse_generator_line(line).with_context(|| format!("line {}", index + 1))?;
        generators.push(generator);
    }

    if generators.is_empty() {
        bail!("generator table contains no generators");
    }
    Ok(generators)
}

fn parse_generator_line(line: &str) -> Result<Generator> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != GENERATOR_COLUMNS.len() {
        bail!(
            "expected {} columns ({}), found {}",
            GENERATOR_COLUMNS.len(),
            GENERATOR_COLUMNS.join(" "),
            fields.len()
        );
    }

    let number = |k: usize| -> Result<f64> {
        let value: f64 = fields[k]
            .parse()
            .map_err(|_| anyhow!("{} '{}' is not a number", GENERATOR_COLUMNS[k], fields[k]))?;
        if !value.is_finite() {
            bail!("{} must be finite, got {}", GENERATOR_COLUMNS[k], fields[k]);
        }
        Ok(value)
    };
    let periods = |k: usize| -> Result<usize> {
        let value = number(k)?;
        if value < 0.0 || value.fract() != 0.0 {
            bail!(
                "{} must be a whole number of periods, got {}",
                GENERATOR_COLUMNS[k],
                fields[k]
            );
        }
        Ok(value as usize)
    };

    let ramp_rate = number(5)?;
    Ok(Generator::new(fields[0])
        .with_output_limits(number(1)?, number(2)?)
        .with_costs(number(4)?, number(3)?, number(8)?)
        .with_ramp_rate(ramp_rate)
        .with_min_times(periods(6)?, periods(7)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
name  min  max  startup  commitment  ramp  minUp  minDown  marginal
      MW   MW   $        $/h         MW/h  h      h        $/MWh
U12   2.4  12   87.4     0           60    4      2        23.41

U400  100  400  0        65000       1200  1      1        5.31
";

    #[test]
    fn test_parse_columns() {
        let generators = parse_generators_string(TABLE).unwrap();
        assert_eq!(generators.len(), 2);

        let u12 = &generators[0];
        assert_eq!(u12.name, "U12");
        assert_eq!(u12.min_output, 2.4);
        assert_eq!(u12.max_output, 12.0);
        assert_eq!(u12.startup_cost, 87.4);
        assert_eq!(u12.commitment_cost, 0.0);
        assert_eq!(u12.ramp_up, 60.0);
        assert_eq!(u12.ramp_down, 60.0);
        assert_eq!(u12.min_up_time, 4);
        assert_eq!(u12.min_down_time, 2);
        assert_eq!(u12.marginal_cost, 23.41);

        assert_eq!(generators[1].commitment_cost, 65000.0);
    }

    #[test]
    fn test_wrong_column_count_names_line() {
        let table = "h1\nh2\nU1 1 2 3\n";
        let err = parse_generators_string(table).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("expected 9 columns"), "{msg}");
    }

    #[test]
    fn test_non_numeric_field() {
        let table = "h1\nh2\nU1 0 10 x 0 5 1 1 2\n";
        let err = parse_generators_string(table).unwrap_err();
        assert!(format!("{err:#}").contains("startupCost 'x' is not a number"));
    }

    #[test]
    fn test_fractional_min_up_time_rejected() {
        let table = "h1\nh2\nU1 0 10 0 0 5 1.5 1 2\n";
        let err = parse_generators_string(table).unwrap_err();
        assert!(format!("{err:#}").contains("minUpTime must be a whole number"));
    }

    #[test]
    fn test_header_only() {
        assert!(parse_generators_string("h1\nh2\n").is_err());
        assert!(parse_generators_string("h1\n").is_err());
    }
}
