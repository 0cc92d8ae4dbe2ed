//! # mx-table
//!
//! Columnar event storage for evmix plus the Parquet bridge.
//!
//! An [`EventTable`] holds one collision event per row: the
//! `(runNumber, eventNumber)` identity as `i64` columns and any number of
//! per-particle kinematic columns as `f64` (SoA layout). [`read_events`] /
//! [`write_events`] move tables in and out of Parquet files, and
//! [`CandidateWriter`] is the append-only sink the mixer streams mixed
//! candidates into.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event_table;
pub mod parquet_io;

pub use event_table::{EventTable, EVENT_COLUMN, RUN_COLUMN};
pub use parquet_io::{
    read_events, write_events, CandidateWriter, CombinationMeta, CANDIDATES_SCHEMA_V1,
    EVENTS_SCHEMA_V1, META_KEY_COMBINATIONS, META_KEY_SCHEMA_VERSION,
};
