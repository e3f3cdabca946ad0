//! Change detection and synchronization engine for wac
//!
//! This crate turns a loaded [`wac_core::Config`] into a watch
//! session:
//! - [`registry`] filters the configured groups through the ignore
//!   list into an active watch list,
//! - [`poller`] drives the fixed-interval mtime scan loop,
//! - [`copier`] replicates a changed file under its destination root,
//!   mirroring relative structure.
//!
//! Detection is purely mtime-based: no hashing, no diffing, no
//! filesystem event subscriptions.

pub mod copier;
pub mod poller;
pub mod registry;

#[cfg(test)]
pub(crate) mod testutil;

pub use copier::{copy_file, CopyError};
pub use poller::{Poller, ScanReport, DEFAULT_POLL_INTERVAL};
pub use registry::{build_active_list, ActiveGroup, ActiveWatchList, WatchEntry};
