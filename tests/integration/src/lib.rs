//! Integration test utilities for the chat client
//!
//! This crate provides a mock platform API and helpers for running end-to-end
//! tests through the real HTTP transport.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
