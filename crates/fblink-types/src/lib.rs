//! IEC 61499 data type catalog and DATE_AND_TIME timestamp adapter.
//!
//! 4diac-RTE (FORTE) communication service interface function blocks exchange
//! typed values in a compact tagged binary form. This crate holds the leaf
//! pieces everything else builds on:
//! - [`WireType`]: the supported data kinds with their on-wire tags and
//!   encoded byte lengths.
//! - [`DateAndTime`]: the adapter between a local "seconds since simulation
//!   start" clock and FORTE's absolute millisecond DATE_AND_TIME value.

pub mod date_and_time;
pub mod error;
pub mod wire_type;

pub use date_and_time::DateAndTime;
pub use error::{Result, TypeError};
pub use wire_type::{tags, WireType};
