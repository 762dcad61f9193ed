//! Integration tests for the token operations workspace.

pub mod bulk_tests;
pub mod chain_tests;
pub mod distribution_tests;
pub mod poll_tests;
