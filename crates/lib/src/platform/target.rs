use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::os::Os;

/// A release target the orchestrator can build.
///
/// Declaration order is the order targets are built in sequential mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
  Ios,
  Android,
  Macos,
  Web,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform '{0}' (expected one of: ios, android, macos, web)")]
pub struct UnknownTarget(pub String);

impl Target {
  pub const ALL: [Target; 4] = [Target::Ios, Target::Android, Target::Macos, Target::Web];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ios => "ios",
      Self::Android => "android",
      Self::Macos => "macos",
      Self::Web => "web",
    }
  }

  /// Subdirectory of the release root holding this target's artifacts.
  pub fn release_subdir(&self) -> &'static str {
    match self {
      Self::Ios => "iOS",
      Self::Android => "Android",
      Self::Macos => "macOS",
      Self::Web => "Web",
    }
  }

  /// Whether this target can be built on `host`.
  ///
  /// Apple targets need Xcode and therefore a Darwin host. An unrecognised host
  /// only gets the host-independent targets.
  pub fn is_available_on(&self, host: Option<Os>) -> bool {
    match self {
      Self::Ios | Self::Macos => host.is_some_and(|os| os.is_darwin()),
      Self::Android | Self::Web => true,
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Target {
  type Err = UnknownTarget;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "ios" => Ok(Self::Ios),
      "android" => Ok(Self::Android),
      "macos" => Ok(Self::Macos),
      "web" => Ok(Self::Web),
      _ => Err(UnknownTarget(s.to_string())),
    }
  }
}

/// Targets from `requested` (or every target) that `host` can build.
///
/// The result follows declaration order and contains no duplicates.
/// Requested targets the host cannot build are dropped without error.
pub fn resolve_targets(requested: Option<&[Target]>, host: Option<Os>) -> Vec<Target> {
  Target::ALL
    .into_iter()
    .filter(|t| requested.is_none_or(|r| r.contains(t)))
    .filter(|t| {
      let available = t.is_available_on(host);
      if !available {
        tracing::debug!(platform = %t, "platform not available on this host, skipping");
      }
      available
    })
    .collect()
}
