//! Solver-independent linear program representation
//!
//! Columns and rows are addressed by the typed handles [`ColId`] and
//! [`RowId`], returned in insertion order. Every row carries a lower and an
//! upper bound (either may be infinite); equality rows use the same value for
//! both.

use serde::{Deserialize, Serialize};

/// Handle to a column (decision variable) of a [`LinearProgram`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColId(usize);

impl ColId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle to a row (constraint) of a [`LinearProgram`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(usize);

impl RowId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Domain of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Continuous,
    Binary,
}

/// A decision variable with bounds and objective coefficient
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cost: f64,
    pub lower: f64,
    pub upper: f64,
    pub kind: ColumnKind,
}

/// A linear constraint `lower <= sum(coef * x) <= upper`
#[derive(Debug, Clone)]
pub struct Row {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub terms: Vec<(ColId, f64)>,
}

impl Row {
    /// `sum(terms) >= rhs`
    pub fn greater_eq(name: impl Into<String>, terms: Vec<(ColId, f64)>, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lower: rhs,
            upper: f64::INFINITY,
            terms,
        }
    }

    /// `sum(terms) <= rhs`
    pub fn less_eq(name: impl Into<String>, terms: Vec<(ColId, f64)>, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lower: f64::NEG_INFINITY,
            upper: rhs,
            terms,
        }
    }

    /// `sum(terms) == rhs`
    pub fn equal(name: impl Into<String>, terms: Vec<(ColId, f64)>, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lower: rhs,
            upper: rhs,
            terms,
        }
    }

    /// Row activity for the given column values
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(col, coef)| coef * values[col.index()])
            .sum()
    }

    /// Amount by which the row is violated at `values` (0 when satisfied)
    pub fn violation(&self, values: &[f64]) -> f64 {
        let activity = self.activity(values);
        (self.lower - activity).max(activity - self.upper).max(0.0)
    }
}

/// A minimisation problem over bounded columns and ranged rows
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a continuous column `lower <= x <= upper` with objective coefficient `cost`
    pub fn add_continuous(&mut self, name: impl Into<String>, cost: f64, lower: f64, upper: f64) -> ColId {
        self.push_column(Column {
            name: name.into(),
            cost,
            lower,
            upper,
            kind: ColumnKind::Continuous,
        })
    }

    /// Add a binary column with objective coefficient `cost`
    pub fn add_binary(&mut self, name: impl Into<String>, cost: f64) -> ColId {
        self.push_column(Column {
            name: name.into(),
            cost,
            lower: 0.0,
            upper: 1.0,
            kind: ColumnKind::Binary,
        })
    }

    fn push_column(&mut self, column: Column) -> ColId {
        self.columns.push(column);
        ColId(self.columns.len() - 1)
    }

    /// Append a row
    pub fn add_row(&mut self, row: Row) -> RowId {
        self.rows.push(row);
        RowId(self.rows.len() - 1)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column(&self, id: ColId) -> &Column {
        &self.columns[id.index()]
    }

    pub fn row(&self, id: RowId) -> &Row {
        &self.rows[id.index()]
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether any column is integer-constrained
    pub fn is_mixed_integer(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Binary)
    }

    /// Objective value `sum(cost * x)` for the given column values
    pub fn objective_of(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_follow_insertion_order() {
        let mut lp = LinearProgram::new();
        let x = lp.add_continuous("x", 1.0, 0.0, f64::INFINITY);
        let y = lp.add_binary("y", 2.0);
        assert_eq!(x.index(), 0);
        assert_eq!(y.index(), 1);
        let r = lp.add_row(Row::less_eq("cap", vec![(x, 1.0), (y, -5.0)], 0.0));
        assert_eq!(r.index(), 0);
        assert!(lp.is_mixed_integer());
        assert_eq!(lp.column(y).kind, ColumnKind::Binary);
    }

    #[test]
    fn test_row_violation() {
        let mut lp = LinearProgram::new();
        let x = lp.add_continuous("x", 0.0, 0.0, 10.0);
        let ge = Row::greater_eq("ge", vec![(x, 2.0)], 4.0);
        assert_eq!(ge.violation(&[1.0]), 2.0);
        assert_eq!(ge.violation(&[3.0]), 0.0);
        let eq = Row::equal("eq", vec![(x, 1.0)], 5.0);
        assert_eq!(eq.violation(&[7.0]), 2.0);
    }

    #[test]
    fn test_objective_of() {
        let mut lp = LinearProgram::new();
        lp.add_continuous("x", 3.0, 0.0, 1.0);
        lp.add_continuous("y", -1.0, 0.0, 1.0);
        assert_eq!(lp.objective_of(&[2.0, 4.0]), 2.0);
    }
}
