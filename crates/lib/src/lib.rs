//! shipyard-lib: release build orchestration for Flutter projects
//!
//! This crate provides the building blocks of a multi-platform release build:
//! - `BuildContext`: project, release tree, host and toolchain settings
//! - `BuildTask`: the per-platform recipe of toolchain commands and artifact copies
//! - `execute::run`: the scheduler that runs tasks sequentially or on a bounded pool
//! - `tune`: idempotent toolchain config tuning
//! - `stage`: artifact staging into the release tree and `.ipa` packaging

pub mod clean;
pub mod consts;
pub mod context;
pub mod execute;
pub mod platform;
pub mod stage;
pub mod tune;
pub mod util;
