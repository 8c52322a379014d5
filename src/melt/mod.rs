//! WITSML melting - flatten typed object trees into tables
//!
//! This module turns WITSML objects into data that is easy to analyse:
//!
//! - [`Flattener::flatten`] maps one object to `path -> value`
//! - [`Flattener::frame`] merges a repeated element into columns
//! - [`PlainConverter`] produces nested maps and lists of plain values
//! - [`decode_log`] splits the delimited rows of a log into typed columns

pub mod flatten;
pub mod logdata;
pub mod plain;
pub mod types;
pub mod writer;

pub use flatten::Flattener;
pub use logdata::{decode_log, is_log_with_data, LogDataType};
pub use plain::{pivot, PlainConverter};
pub use types::{Column, FlatMap, FlattenConfig, Frame, Plain, PlainConfig};
pub use writer::{FrameWriter, RowWriter};
