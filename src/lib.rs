//! staffdb - staff roster over a flat file of fixed-size records
//!
//! - `storage`: record layout, append, scan and in-place overwrite
//! - `query`: visibility filtering, pagination and incremental search
//! - `matcher`: KMP substring search and `LIKE` wildcard matching
//! - `hash`: 64-bit BLAKE2b credential digest
//! - `roster`: the actions a shell calls, with result codes

pub mod cli;
pub mod config;
pub mod hash;
pub mod matcher;
pub mod observability;
pub mod query;
pub mod roster;
pub mod storage;
