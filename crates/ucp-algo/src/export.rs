//! Implementation of SolutionExport for UcpSolution
//!
//! The trait and the writers live in ucp-io; this module only maps the
//! solution onto a [`DispatchTable`].

use std::path::Path;

use anyhow::{Context, Result};
use ucp_io::exporters::{write_dispatch_csv, write_json, DispatchTable, SolutionExport};

use crate::solution::UcpSolution;

impl UcpSolution {
    /// Per-period dispatch of this solution
    pub fn dispatch_table(&self) -> DispatchTable {
        DispatchTable::from_profiles(self.generator_names.clone(), &self.demand, &self.load_shed, &self.output)
    }
}

impl SolutionExport for UcpSolution {
    fn to_csv(&self, path: &Path) -> Result<()> {
        write_dispatch_csv(&self.dispatch_table(), path)
    }

    fn to_json(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }

    fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).context("converting UcpSolution to JSON value")
    }
}
