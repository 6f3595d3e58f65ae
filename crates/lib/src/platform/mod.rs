pub mod os;
pub mod paths;
pub mod target;

pub use os::Os;
pub use target::{Target, UnknownTarget, resolve_targets};

/// Number of CPUs available to this process, used to size the worker pool
pub fn cpu_count() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
