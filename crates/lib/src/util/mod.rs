//! Shared utilities.
//!
//! Test helpers shared by the unit tests of every module.

#[cfg(test)]
pub mod testutil;
