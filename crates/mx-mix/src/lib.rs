//! # mx-mix
//!
//! Pooled event mixing for combinatorial-background estimation.
//!
//! A [`Mixer`] consumes an event table in `(runNumber, eventNumber)` order
//! and, for each registered [`MixCombination`], assembles synthetic
//! candidates whose daughter particles come from *different* collision
//! events: the head stem from the current record, the remaining stems from
//! members of a bounded FIFO pool of recent events (the "train").
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use mx_mix::{Mixer, MixOptions};
//!
//! let table = mx_table::read_events(Path::new("events.parquet")).unwrap();
//! let mut mixer = Mixer::new(50, table, "mixed.parquet").unwrap();
//! mixer.add_combination("J_psi_1S", vec!["muplus".into(), "muminus".into()]).unwrap();
//! let report = mixer.run_mixing(MixOptions::default()).unwrap();
//! println!("mixed {} rows", report.rows_written);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combination;
pub mod mixer;
pub mod policy;
pub mod train;

pub use combination::{MixCombination, KINEMATIC_SUFFIXES, SUMMARY_SUFFIXES};
pub use mixer::{MixOptions, MixReport, Mixer};
pub use policy::MixPolicy;
pub use train::Train;
