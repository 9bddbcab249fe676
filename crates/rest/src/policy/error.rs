//! Route policy configuration errors.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

use super::rule::RouteMethod;

/// A defect in a route policy table.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("failed to read route policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route policy table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("route path must start with '/': {path}")]
    InvalidPath { path: String },

    #[error("duplicate route policy for {method} {path}")]
    DuplicateRoute { method: RouteMethod, path: String },

    #[error("{method} {path}: unknown permission group '{group}'")]
    UnknownGroup {
        method: RouteMethod,
        path: String,
        group: String,
    },

    #[error("{method} {path}: role list is empty")]
    EmptyRoles { method: RouteMethod, path: String },

    #[error("{method} {path}: path has no parameter '{param}'")]
    UnknownParam {
        method: RouteMethod,
        path: String,
        param: String,
    },
}
