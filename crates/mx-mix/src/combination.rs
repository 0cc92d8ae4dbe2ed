//! Mix combinations: a candidate name plus the stems to combine.

use mx_core::{Error, Result};
use mx_table::EventTable;
use serde::{Deserialize, Serialize};

/// Per-stem columns a combination needs in the input table.
pub const KINEMATIC_SUFFIXES: [&str; 7] = ["PX", "PY", "PZ", "PE", "M", "PT", "Y"];

/// Per-particle columns passed through to the output.
pub const SUMMARY_SUFFIXES: [&str; 3] = ["M", "PT", "Y"];

/// A named pairing of a synthetic candidate with the ordered stems whose
/// particles are combined to form it.
///
/// The first stem is the "head": its particle is taken from the current
/// record. Every following stem is a partner drawn from a distinct pool
/// event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixCombination {
    /// Mixed candidate name, used as the output column prefix.
    pub name: String,
    /// Ordered stem names (head first), at least one.
    pub stems: Vec<String>,
}

impl MixCombination {
    /// Create a combination, validating name and stems are non-empty.
    pub fn new(name: impl Into<String>, stems: Vec<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Validation("mixed candidate name must be non-empty".into()));
        }
        if stems.is_empty() {
            return Err(Error::Validation(format!(
                "combination '{name}' requires at least one stem"
            )));
        }
        if stems.iter().any(|s| s.is_empty()) {
            return Err(Error::Validation(format!(
                "combination '{name}' has an empty stem name"
            )));
        }
        Ok(Self { name, stems })
    }

    /// Number of partner particles drawn from the pool.
    pub fn n_partners(&self) -> usize {
        self.stems.len() - 1
    }

    /// Input columns this combination requires, per stem.
    pub fn required_columns(&self) -> Vec<String> {
        self.stems
            .iter()
            .flat_map(|stem| KINEMATIC_SUFFIXES.iter().map(move |v| format!("{stem}_{v}")))
            .collect()
    }

    /// Required columns absent from `table`.
    pub fn missing_columns(&self, table: &EventTable) -> Vec<String> {
        self.required_columns().into_iter().filter(|c| !table.has_column(c)).collect()
    }

    /// Output columns contributed by this combination:
    /// `<name>_{M,PT,Y}` then `<stem>_{M,PT,Y}` per stem, in order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> =
            SUMMARY_SUFFIXES.iter().map(|v| format!("{}_{v}", self.name)).collect();
        for stem in &self.stems {
            cols.extend(SUMMARY_SUFFIXES.iter().map(|v| format!("{stem}_{v}")));
        }
        cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx_table::EventTable;

    fn stems(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn validates_name_and_stems() {
        assert!(MixCombination::new("", stems(&["muplus"])).is_err());
        assert!(MixCombination::new("J_psi_1S", vec![]).is_err());
        assert!(MixCombination::new("J_psi_1S", stems(&["muplus", ""])).is_err());
        let c = MixCombination::new("J_psi_1S", stems(&["muplus", "muminus"])).unwrap();
        assert_eq!(c.n_partners(), 1);
    }

    #[test]
    fn required_columns_cover_all_suffixes() {
        let c = MixCombination::new("B", stems(&["k", "pi"])).unwrap();
        let req = c.required_columns();
        assert_eq!(req.len(), 14);
        assert!(req.contains(&"k_PX".to_string()));
        assert!(req.contains(&"pi_Y".to_string()));
    }

    #[test]
    fn output_columns_ordering() {
        let c = MixCombination::new("J_psi_1S", stems(&["muplus", "muminus"])).unwrap();
        assert_eq!(
            c.output_columns(),
            vec![
                "J_psi_1S_M",
                "J_psi_1S_PT",
                "J_psi_1S_Y",
                "muplus_M",
                "muplus_PT",
                "muplus_Y",
                "muminus_M",
                "muminus_PT",
                "muminus_Y",
            ]
        );
    }

    #[test]
    fn missing_columns_reported() {
        let table = EventTable::from_columns(
            vec![1],
            vec![1],
            KINEMATIC_SUFFIXES
                .iter()
                .filter(|v| **v != "PT")
                .map(|v| (format!("mu_{v}"), vec![0.0]))
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let c = MixCombination::new("X", stems(&["mu"])).unwrap();
        assert_eq!(c.missing_columns(&table), vec!["mu_PT".to_string()]);
    }
}
