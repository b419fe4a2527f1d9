//! Solution exporters
//!
//! Solvers convert their result into a [`DispatchTable`] (one row per period)
//! and implement [`SolutionExport`]; the writers here only know about the
//! table and plain `serde` values, so this crate stays independent of the
//! solver crates.

mod csv;
mod json;

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

pub use self::csv::write_dispatch_csv;
pub use self::json::{write_json, write_json_string};

/// Trait for exporting unit commitment solutions
pub trait SolutionExport {
    /// Export the per-period dispatch as CSV
    fn to_csv(&self, path: &Path) -> Result<()>;

    /// Export the full solution as pretty-printed JSON
    fn to_json(&self, path: &Path) -> Result<()>;

    /// Convert to JSON value (for streaming/stdout)
    fn to_json_value(&self) -> Result<serde_json::Value>;
}

/// Per-period dispatch: demand, load shed and output of every generator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchTable {
    pub generator_names: Vec<String>,
    pub rows: Vec<DispatchRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRow {
    pub period: usize,
    pub demand: f64,
    pub load_shed: f64,
    /// Output (MW) in `generator_names` order
    pub output: Vec<f64>,
}

impl DispatchTable {
    /// Build a table from per-generator output profiles (`output[i][j]`).
    pub fn from_profiles(
        generator_names: Vec<String>,
        demand: &[f64],
        load_shed: &[f64],
        output: &[Vec<f64>],
    ) -> Self {
        let rows = demand
            .iter()
            .enumerate()
            .map(|(j, &d)| DispatchRow {
                period: j,
                demand: d,
                load_shed: load_shed.get(j).copied().unwrap_or(0.0),
                output: output.iter().map(|p_i| p_i.get(j).copied().unwrap_or(0.0)).collect(),
            })
            .collect();
        Self { generator_names, rows }
    }

    pub fn n_periods(&self) -> usize {
        self.rows.len()
    }
}
