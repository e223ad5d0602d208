//! Package registry lookups and filesystem probes
//!
//! The orchestrator never queries the process environment directly. It is
//! handed a [`PackageLookup`] and a [`FileProbe`], so tests can substitute a
//! fake prefix tree or an in-memory registry.

use crate::error::{LaunchError, Result};
use std::path::{Path, PathBuf};

/// Distributions searched when neither `AMENT_PREFIX_PATH` nor `ROS_DISTRO` is set
const KNOWN_DISTROS: &[&str] = &["jazzy", "iron", "humble", "galactic", "foxy"];

/// Resolves installed package share directories
pub trait PackageLookup {
    /// Returns `<prefix>/share/<package>` or [`LaunchError::PackageNotFound`].
    fn share_directory(&self, package: &str) -> Result<PathBuf>;
}

/// Answers file-existence questions
pub trait FileProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Result of probing for an optional package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available(PathBuf),
    Unavailable,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }
}

/// Probe an optional package. Only a missing package maps to
/// [`Availability::Unavailable`]; any other lookup error is propagated.
pub fn probe(lookup: &dyn PackageLookup, package: &str) -> Result<Availability> {
    match lookup.share_directory(package) {
        Ok(path) => Ok(Availability::Available(path)),
        Err(LaunchError::PackageNotFound(name)) => {
            log::debug!("Optional package '{}' is not installed", name);
            Ok(Availability::Unavailable)
        }
        Err(e) => Err(e),
    }
}

/// Package lookup backed by the ament resource index of a list of prefixes.
///
/// Earlier prefixes take priority, matching `AMENT_PREFIX_PATH` overlay order.
#[derive(Debug, Clone)]
pub struct AmentIndex {
    prefixes: Vec<PathBuf>,
}

impl AmentIndex {
    /// Build from `AMENT_PREFIX_PATH`, falling back to `/opt/ros/<distro>`.
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var("AMENT_PREFIX_PATH") {
            let index = Self::from_path(&path);
            if !index.prefixes.is_empty() {
                return index;
            }
        }

        log::debug!("AMENT_PREFIX_PATH is not set, searching /opt/ros installs");

        let mut prefixes = Vec::new();
        if let Ok(distro) = std::env::var("ROS_DISTRO") {
            prefixes.push(PathBuf::from("/opt/ros").join(distro));
        }
        for distro in KNOWN_DISTROS {
            let prefix = PathBuf::from("/opt/ros").join(distro);
            if prefix.is_dir() && !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }
        Self { prefixes }
    }

    /// Build from a colon-separated prefix path string.
    pub fn from_path(path: &str) -> Self {
        let prefixes = path
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        Self { prefixes }
    }

    pub fn with_prefixes(prefixes: Vec<PathBuf>) -> Self {
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    /// Returns the ament prefix that registers `package`, if any.
    ///
    /// A package is registered by a marker file named after it in the
    /// prefix's resource index.
    pub fn package_prefix(&self, package: &str) -> Option<&Path> {
        if package.is_empty() {
            return None;
        }
        self.prefixes
            .iter()
            .find(|prefix| {
                prefix
                    .join("share")
                    .join("ament_index")
                    .join("resource_index")
                    .join("packages")
                    .join(package)
                    .is_file()
            })
            .map(PathBuf::as_path)
    }
}

impl PackageLookup for AmentIndex {
    fn share_directory(&self, package: &str) -> Result<PathBuf> {
        let prefix = self
            .package_prefix(package)
            .ok_or_else(|| LaunchError::PackageNotFound(package.to_string()))?;
        Ok(prefix.join("share").join(package))
    }
}

/// File probe against the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileProbe for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
