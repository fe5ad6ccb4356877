//! wire4d application library
//!
//! Holds the configuration layer shared by the `wire4d` binary and the
//! integration tests.

pub mod config;
