use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

/// Lines preceding the first demand value
pub const DEMAND_HEADER_LINES: usize = 1;

/// Read a demand table from disk.
pub fn parse_demand_file(path: &Path) -> Result<Vec<f64>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading demand table '{}'", path.display()))?;
    parse_demand_string(&content).with_context(|| format!("parsing demand table '{}'", path.display()))
}

/// Parse a demand table: one header line, then one value per period.
///
/// Values may also share lines; every whitespace-separated token after the
/// header is one period.
pub fn parse_demand_string(content: &str) -> Result<Vec<f64>> {
    let mut lines = content.lines().enumerate();
    if lines.next().is_none() {
        bail!("demand table is empty");
    }

    let mut demand = Vec::new();
    for (index, line) in lines {
        for token in line.split_whitespace() {
            let value: f64 = token
                .parse()
                .map_err(|_| anyhow!("line {}: demand '{}' is not a number", index + 1, token))?;
            if !value.is_finite() || value < 0.0 {
                bail!("line {}: demand must be finite and non-negative, got {}", index + 1, token);
            }
            demand.push(value);
        }
    }

    if demand.is_empty() {
        bail!("demand table contains no periods");
    }
    Ok(demand)
}
