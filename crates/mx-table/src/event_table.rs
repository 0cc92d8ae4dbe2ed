//! Columnar event storage (Structure-of-Arrays).

use mx_core::{Error, Result};
use std::collections::HashMap;

/// Reserved column name for the run number.
pub const RUN_COLUMN: &str = "runNumber";

/// Reserved column name for the event number.
pub const EVENT_COLUMN: &str = "eventNumber";

/// Columnar event storage.
///
/// Identity columns (`runNumber`, `eventNumber`) are `i64`; every other
/// column is `f64`. Row identity is `(runNumber, eventNumber)` — uniqueness
/// is not guaranteed by the input, ordering is established via
/// [`EventTable::sorted_index`].
#[derive(Debug, Clone)]
pub struct EventTable {
    n_rows: usize,
    runs: Vec<i64>,
    events: Vec<i64>,
    column_names: Vec<String>,
    columns: Vec<Vec<f64>>,
    name_to_index: HashMap<String, usize>,
}

impl EventTable {
    /// Create a table from identity vectors and named kinematic columns.
    ///
    /// All columns must have the same length as `runs`/`events`, values must
    /// be finite, and column names must be unique and must not collide with
    /// the reserved identity names.
    pub fn from_columns(
        runs: Vec<i64>,
        events: Vec<i64>,
        columns: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self> {
        if runs.len() != events.len() {
            return Err(Error::Table(format!(
                "identity length mismatch: {} run numbers, {} event numbers",
                runs.len(),
                events.len()
            )));
        }
        let n_rows = runs.len();

        let mut column_names = Vec::new();
        let mut cols = Vec::new();
        let mut name_to_index = HashMap::new();

        for (name, col) in columns {
            if name.is_empty() {
                return Err(Error::Table("column name must be non-empty".into()));
            }
            if name == RUN_COLUMN || name == EVENT_COLUMN {
                return Err(Error::Table(format!("column name '{name}' is reserved")));
            }
            if name_to_index.contains_key(&name) {
                return Err(Error::Table(format!("duplicate column '{name}'")));
            }
            if col.len() != n_rows {
                return Err(Error::Table(format!(
                    "column length mismatch for '{}': expected {}, got {}",
                    name,
                    n_rows,
                    col.len()
                )));
            }
            if col.iter().any(|x| !x.is_finite()) {
                return Err(Error::Table(format!("column '{name}' contains non-finite values")));
            }
            name_to_index.insert(name.clone(), cols.len());
            column_names.push(name);
            cols.push(col);
        }

        Ok(Self { n_rows, runs, events, column_names, columns: cols, name_to_index })
    }

    /// Number of rows (events).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Run number of a row.
    pub fn run(&self, row: usize) -> i64 {
        self.runs[row]
    }

    /// Event number of a row.
    pub fn event(&self, row: usize) -> i64 {
        self.events[row]
    }

    /// All run numbers, in storage order.
    pub fn runs(&self) -> &[i64] {
        &self.runs
    }

    /// All event numbers, in storage order.
    pub fn events(&self) -> &[i64] {
        &self.events
    }

    /// Names of kinematic columns (stable order, identity columns excluded).
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get a kinematic column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let idx = self.name_to_index.get(name).copied()?;
        self.columns.get(idx).map(|c| c.as_slice())
    }

    /// Whether a kinematic column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Stable permutation of row indices ordered by ascending
    /// `(runNumber, eventNumber)`.
    ///
    /// Rows sharing an identity keep their storage order.
    pub fn sorted_index(&self) -> Vec<usize> {
        let mut index: Vec<usize> = (0..self.n_rows).collect();
        index.sort_by_key(|&i| (self.runs[i], self.events[i]));
        index
    }
}
