//! Common test utilities for REST API testing.
//!
//! - [`harness`] - Test servers, callers and echo handlers
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod harness;
