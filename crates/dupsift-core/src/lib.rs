//! Core types and traits for dupsift.
//!
//! This crate provides the data model shared by the scanner and the
//! classifier: file records, actions, the keyed partitioner that every
//! classification stage is built on, and the error types.

mod action;
mod config;
mod error;
mod partition;
mod record;
mod source;

pub use action::{Action, ActionKind};
pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{HashError, RecordError, ScanError, ScanWarning, WarningKind};
pub use partition::{PartitionResult, partition_by};
pub use record::{ContentHash, FileRecord};
pub use source::{Discovery, FileSource};
