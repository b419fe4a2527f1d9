//! Commitment schedules
//!
//! A [`CommitmentSchedule`] is a complete on/off assignment for every
//! generator in every period. It is never partially defined: every
//! constructor produces a full `n_generators x n_periods` matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{UcpError, UcpResult};

/// Complete 0/1 commitment matrix `u[i][j]` (generator `i` online in period `j`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentSchedule {
    n_generators: usize,
    n_periods: usize,
    /// Row-major: generator `i`, period `j` at `i * n_periods + j`
    on: Vec<bool>,
}

impl CommitmentSchedule {
    /// Every generator offline in every period
    pub fn all_off(n_generators: usize, n_periods: usize) -> Self {
        Self {
            n_generators,
            n_periods,
            on: vec![false; n_generators * n_periods],
        }
    }

    /// Every generator online in every period
    pub fn all_on(n_generators: usize, n_periods: usize) -> Self {
        Self {
            n_generators,
            n_periods,
            on: vec![true; n_generators * n_periods],
        }
    }

    /// Build from one row of flags per generator.
    ///
    /// All rows must have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> UcpResult<Self> {
        let n_generators = rows.len();
        let n_periods = rows.first().map_or(0, Vec::len);
        if n_generators == 0 || n_periods == 0 {
            return Err(UcpError::Validation(
                "commitment schedule must cover at least one generator and one period".to_string(),
            ));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_periods) {
            return Err(UcpError::Validation(format!(
                "commitment row {i} has {} periods, expected {n_periods}",
                row.len()
            )));
        }
        Ok(Self {
            n_generators,
            n_periods,
            on: rows.into_iter().flatten().collect(),
        })
    }

    /// Build from a row-major 0/1 flag vector.
    pub fn from_flags(n_generators: usize, n_periods: usize, on: Vec<bool>) -> UcpResult<Self> {
        if on.len() != n_generators * n_periods {
            return Err(UcpError::Validation(format!(
                "commitment schedule needs {} entries, got {}",
                n_generators * n_periods,
                on.len()
            )));
        }
        Ok(Self {
            n_generators,
            n_periods,
            on,
        })
    }

    pub fn n_generators(&self) -> usize {
        self.n_generators
    }

    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Whether generator `i` is online in period `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range, like slice indexing. Use
    /// [`get`](Self::get) for a checked lookup.
    pub fn is_on(&self, i: usize, j: usize) -> bool {
        assert!(
            i < self.n_generators && j < self.n_periods,
            "commitment index ({i}, {j}) outside {}x{} schedule",
            self.n_generators,
            self.n_periods
        );
        self.on[i * self.n_periods + j]
    }

    /// Checked lookup with a bounds-violation error naming the valid range.
    pub fn get(&self, i: usize, j: usize) -> UcpResult<bool> {
        if i >= self.n_generators {
            return Err(UcpError::OutOfRange {
                what: "generator",
                index: i,
                len: self.n_generators,
            });
        }
        if j >= self.n_periods {
            return Err(UcpError::OutOfRange {
                what: "period",
                index: j,
                len: self.n_periods,
            });
        }
        Ok(self.on[i * self.n_periods + j])
    }

    /// `u[i][j]` as 0.0 or 1.0
    pub fn value(&self, i: usize, j: usize) -> f64 {
        if self.is_on(i, j) {
            1.0
        } else {
            0.0
        }
    }

    /// Set the status of generator `i` in period `j`.
    pub fn set(&mut self, i: usize, j: usize, on: bool) -> UcpResult<()> {
        self.get(i, j)?;
        self.on[i * self.n_periods + j] = on;
        Ok(())
    }

    /// Whether generator `i` starts up in period `j` (units are offline before the horizon).
    pub fn starts_up(&self, i: usize, j: usize) -> bool {
        self.is_on(i, j) && (j == 0 || !self.is_on(i, j - 1))
    }

    /// Number of startups of generator `i` over the horizon
    pub fn startups(&self, i: usize) -> usize {
        (0..self.n_periods).filter(|&j| self.starts_up(i, j)).count()
    }

    /// Number of online generator-periods
    pub fn online_count(&self) -> usize {
        self.on.iter().filter(|&&on| on).count()
    }

    /// Flags for generator `i` across periods
    pub fn row(&self, i: usize) -> &[bool] {
        &self.on[i * self.n_periods..(i + 1) * self.n_periods]
    }
}

impl fmt::Display for CommitmentSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.n_generators {
            let line: String = self
                .row(i)
                .iter()
                .map(|&on| if on { '1' } else { '0' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_lookup() {
        let schedule =
            CommitmentSchedule::from_rows(vec![vec![true, false, true], vec![false, true, true]])
                .unwrap();
        assert_eq!(schedule.n_generators(), 2);
        assert_eq!(schedule.n_periods(), 3);
        assert!(schedule.is_on(0, 0));
        assert!(!schedule.is_on(1, 0));
        assert_eq!(schedule.value(1, 2), 1.0);
        assert_eq!(schedule.online_count(), 4);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = CommitmentSchedule::from_rows(vec![vec![true, false], vec![true]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_checked_get_names_range() {
        let schedule = CommitmentSchedule::all_on(2, 4);
        let err = schedule.get(0, 4).unwrap_err();
        assert!(err.to_string().contains("period index 4"));
        assert!(schedule.get(2, 0).is_err());
    }

    #[test]
    fn test_startups_count_initial_period() {
        let schedule =
            CommitmentSchedule::from_rows(vec![vec![true, false, true, true]]).unwrap();
        assert!(schedule.starts_up(0, 0));
        assert!(!schedule.starts_up(0, 3));
        assert_eq!(schedule.startups(0), 2);
    }

    #[test]
    fn test_set_and_display() {
        let mut schedule = CommitmentSchedule::all_off(2, 2);
        schedule.set(1, 1, true).unwrap();
        assert_eq!(schedule.to_string(), "00\n01\n");
        assert!(schedule.set(2, 0, true).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let schedule = CommitmentSchedule::all_on(1, 2);
        let json = serde_json::to_string(&schedule).unwrap();
        let back: CommitmentSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, back);
    }
}
