//! Configuration file for the `ucp` binary
//!
//! Looked up at `--config <path>`, otherwise at `<config dir>/ucp/config.toml`
//! when that file exists. Every key is optional; command-line flags override
//! file values.
//!
//! ```toml
//! [solver]
//! method = "benders"
//! max_iterations = 10000
//! time_limit_seconds = 600
//! mip_rel_gap = 1e-9
//! tolerance = 1e-9
//!
//! [instance]
//! load_shedding_cost = 46
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use ucp_algo::{BendersConfig, MonolithicConfig};

use crate::cli::{Method, SolveArgs};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UcpConfig {
    #[serde(default)]
    pub solver: SolverSection,
    #[serde(default)]
    pub instance: InstanceSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverSection {
    #[serde(default)]
    pub method: Method,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// No limit when absent
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,
    #[serde(default = "default_mip_rel_gap")]
    pub mip_rel_gap: f64,
    /// Feasibility and optimality tolerance of the decomposition
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            method: Method::default(),
            max_iterations: default_max_iterations(),
            time_limit_seconds: None,
            mip_rel_gap: default_mip_rel_gap(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_max_iterations() -> usize {
    10_000
}

fn default_mip_rel_gap() -> f64 {
    1e-9
}

fn default_tolerance() -> f64 {
    1e-9
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceSection {
    #[serde(default = "default_load_shedding_cost")]
    pub load_shedding_cost: f64,
}

impl Default for InstanceSection {
    fn default() -> Self {
        Self {
            load_shedding_cost: default_load_shedding_cost(),
        }
    }
}

fn default_load_shedding_cost() -> f64 {
    46.0
}

/// `<config dir>/ucp/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("ucp").join("config.toml"))
}

impl UcpConfig {
    /// Load from an explicit path, or from the default location when it
    /// exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file '{}'", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("parsing config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Apply command-line overrides and check the result.
    pub fn with_overrides(mut self, args: &SolveArgs) -> Result<Self> {
        if let Some(method) = args.method {
            self.solver.method = method;
        }
        if let Some(max_iterations) = args.max_iterations {
            self.solver.max_iterations = max_iterations;
        }
        if let Some(seconds) = args.time_limit {
            self.solver.time_limit_seconds = Some(seconds);
        }
        if let Some(gap) = args.mip_gap {
            self.solver.mip_rel_gap = gap;
        }
        if let Some(cost) = args.instance.shedding_cost {
            self.instance.load_shedding_cost = cost;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let solver = &self.solver;
        if solver.max_iterations == 0 {
            bail!("solver.max_iterations must be at least 1");
        }
        if let Some(seconds) = solver.time_limit_seconds {
            if !seconds.is_finite() || seconds <= 0.0 {
                bail!("solver.time_limit_seconds must be positive, got {seconds}");
            }
        }
        if !(0.0..1.0).contains(&solver.mip_rel_gap) {
            bail!("solver.mip_rel_gap must lie in [0, 1), got {}", solver.mip_rel_gap);
        }
        if !solver.tolerance.is_finite() || solver.tolerance < 0.0 {
            bail!("solver.tolerance must be non-negative, got {}", solver.tolerance);
        }
        Ok(())
    }

    fn time_limit(&self) -> Option<Duration> {
        self.solver.time_limit_seconds.map(Duration::from_secs_f64)
    }

    pub fn benders(&self) -> BendersConfig {
        BendersConfig {
            feasibility_tolerance: self.solver.tolerance,
            optimality_tolerance: self.solver.tolerance,
            max_iterations: self.solver.max_iterations,
            time_limit: self.time_limit(),
            mip_rel_gap: self.solver.mip_rel_gap,
            verbose: false,
        }
    }

    pub fn monolithic(&self) -> MonolithicConfig {
        MonolithicConfig {
            mip_rel_gap: self.solver.mip_rel_gap,
            time_limit: self.time_limit(),
            verbose: false,
        }
    }
}
