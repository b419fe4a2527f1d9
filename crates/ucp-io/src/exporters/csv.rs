use std::path::Path;

use anyhow::{Context, Result};

use super::DispatchTable;

/// Write a dispatch table as CSV.
///
/// Columns are `period`, `demand_mw`, `load_shed_mw`, then one column per
/// generator named after it.
pub fn write_dispatch_csv(table: &DispatchTable, path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating CSV writer for {}", path.display()))?;

    let mut header = vec!["period".to_string(), "demand_mw".to_string(), "load_shed_mw".to_string()];
    header.extend(table.generator_names.iter().cloned());
    wtr.write_record(&header).context("writing CSV header")?;

    for row in &table.rows {
        let mut record = vec![row.period.to_string(), row.demand.to_string(), row.load_shed.to_string()];
        record.extend(row.output.iter().map(|p| p.to_string()));
        wtr.write_record(&record)
            .with_context(|| format!("writing CSV record for period {}", row.period))?;
    }

    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_one_row_per_period() {
        let table = DispatchTable::from_profiles(
            vec!["A".into(), "B".into()],
            &[100.0, 90.0],
            &[0.0, 5.0],
            &[vec![60.0, 60.0], vec![40.0, 25.0]],
        );
        let dir = tempdir().unwrap();
        let path = dir.path().join("dispatch.csv");
        write_dispatch_csv(&table, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "period,demand_mw,load_shed_mw,A,B");
        assert_eq!(lines[1], "0,100,0,60,40");
        assert_eq!(lines[2], "1,90,5,60,25");
        assert_eq!(lines.len(), 3);
    }
}
