//! Sweeper Core
//!
//! Core types and retention logic for the Sweeper pipeline cleanup tool.
//!
//! This crate contains:
//! - Domain types: Pipeline records and deletion summaries
//! - Retention: The age filter deciding which pipelines are old enough to delete
//!
//! Nothing in here performs I/O; the HTTP side lives in `sweeper-client`.

pub mod domain;
pub mod retention;
