//! Ordering of published package versions.

use std::fmt;

use thiserror::Error;

/// Totally ordered key for a package version.
///
/// Fields are compared in declaration order, so the epoch dominates and the
/// numeric components break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VersionKey {
    pub epoch: u64,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// A version component that could not be turned into a `u64`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("component `{component}` in version `{version}` {reason}")]
pub struct VersionParseError {
    pub version: String,
    pub component: String,
    pub reason: ComponentError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentError {
    NotAnInteger,
    /// Numeric, but larger than `u64::MAX`.
    TooLarge,
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentError::NotAnInteger => write!(f, "is not a non-negative integer"),
            ComponentError::TooLarge => write!(f, "exceeds {}", u64::MAX),
        }
    }
}

impl VersionKey {
    /// Parses `version` (`major[.minor[.patch]]`) with an optional epoch.
    ///
    /// Missing components default to 0 and anything past the third component
    /// is ignored. Every considered component must be a non-negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pkgindex_registry::VersionKey;
    ///
    /// let key = VersionKey::parse("2.5", None).unwrap();
    /// assert_eq!((key.epoch, key.major, key.minor, key.patch), (0, 2, 5, 0));
    /// assert!(VersionKey::parse("1.0", Some(1)).unwrap() > VersionKey::parse("9.9.9", None).unwrap());
    /// ```
    pub fn parse(version: &str, epoch: Option<u64>) -> Result<Self, VersionParseError> {
        let mut parts = [0u64; 3];
        for (slot, component) in parts.iter_mut().zip(version.split('.')) {
            *slot = parse_component(component).map_err(|reason| {
                VersionParseError {
                    version: version.to_string(),
                    component: component.to_string(),
                    reason,
                }
            })?;
        }

        let [major, minor, patch] = parts;
        Ok(VersionKey {
            epoch: epoch.unwrap_or(0),
            major,
            minor,
            patch,
        })
    }
}

fn parse_component(component: &str) -> Result<u64, ComponentError> {
    let component = component.trim();
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ComponentError::NotAnInteger);
    }
    component.parse().map_err(|_| ComponentError::TooLarge)
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}.{}.{}",
            self.epoch, self.major, self.minor, self.patch
        )
    }
}
