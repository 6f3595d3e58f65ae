//! End-to-end tests driving the shipyard binary against a fake Flutter toolchain.

#![cfg(unix)]

mod build_tests;
mod clean_tests;
mod common;
mod optimize_tests;
