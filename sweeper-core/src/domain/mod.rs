//! Core domain types
//!
//! This module contains the structures shared between the client (which
//! decodes them from the GitLab API) and the CLI (which filters and reports them).

pub mod pipeline;
pub mod summary;
