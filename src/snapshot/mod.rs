//! Parsing for turbostat-style snapshot logs: repeated header-delimited blocks
//! turned into per-entity series aligned on the block index.

pub mod error;
pub mod parse;
pub mod row;

pub use parse::parse_snapshot_file;
pub use row::{SlicedSeries, SnapshotQuery, TURBOSTAT_HEADER};
