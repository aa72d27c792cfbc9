//! # scootview-common
//!
//! Shared identifiers, configuration model, constants, and error types
//! used across the scootview workspace.
//!
//! This crate is the leaf of the dependency graph. It knows nothing about
//! HTTP or terminals and only describes what is polled and where it is drawn.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
