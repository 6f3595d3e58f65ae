//! Shared utilities.
//!
//! Filesystem helpers used by staging, packaging and cleaning, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
