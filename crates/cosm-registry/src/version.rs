//! Version tags of the form `vX.Y[.Z]`.
//!
//! Wraps the `semver` crate for ordering but parses leniently: the leading
//! `v` is optional, the patch component defaults to 0, and anything after
//! the third component is ignored.

use crate::error::{RegistryError, Result};

/// A parsed semantic version.
pub type Version = semver::Version;

/// Which component of a version to increment on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

/// Parse a version string like "v1.2.3" or "1.2".
pub fn parse_version(s: &str) -> Result<Version> {
    let trimmed = s.strip_prefix('v').unwrap_or(s);
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() < 2 {
        return Err(RegistryError::InvalidVersion {
            version: s.to_string(),
            detail: "must be vX.Y.Z or vX.Y".to_string(),
        });
    }
    let component = |idx: usize, label: &str| -> Result<u64> {
        parts[idx]
            .parse::<u64>()
            .map_err(|e| RegistryError::InvalidVersion {
                version: s.to_string(),
                detail: format!("invalid {label} version: {e}"),
            })
    };
    let major = component(0, "major")?;
    let minor = component(1, "minor")?;
    let patch = if parts.len() > 2 {
        component(2, "patch")?
    } else {
        0
    };
    Ok(Version::new(major, minor, patch))
}

/// Render a version as a tag ("v1.2.3").
pub fn format_tag(version: &Version) -> String {
    format!("v{}.{}.{}", version.major, version.minor, version.patch)
}

/// Return whichever of `a` and `b` is the higher version.
///
/// Ties go to `a`. The original string is returned, not a re-rendering.
pub fn max_version<'a>(a: &'a str, b: &'a str) -> Result<&'a str> {
    let va = parse_version(a)?;
    let vb = parse_version(b)?;
    if va >= vb {
        Ok(a)
    } else {
        Ok(b)
    }
}

/// Extract the major version as a tag prefix ("v1" from "v1.2.0").
pub fn major_version(s: &str) -> Result<String> {
    let v = parse_version(s)?;
    Ok(format!("v{}", v.major))
}

/// True if `candidate` is strictly greater than `current`.
pub fn is_newer(candidate: &str, current: &str) -> Result<bool> {
    Ok(parse_version(candidate)? > parse_version(current)?)
}

/// Whether a Git tag looks like a version tag.
///
/// Deliberately permissive: any `v`-prefixed tag with at least two
/// dot-separated parts is accepted, including `v1.2.3.4` and `v1.2.0-rc1`.
pub fn is_version_tag(tag: &str) -> bool {
    tag.starts_with('v') && tag.split('.').count() >= 2
}

/// Compute the next version for a release.
pub fn bump(current: &Version, kind: Bump) -> Version {
    match kind {
        Bump::Patch => Version::new(current.major, current.minor, current.patch + 1),
        Bump::Minor => Version::new(current.major, current.minor + 1, 0),
        Bump::Major => Version::new(current.major + 1, 0, 0),
    }
}

/// Check whether `version` falls under a partial constraint.
///
/// `v1` matches any 1.x.y, `v1.2` any 1.2.y, `v1.2.3` only itself.
pub fn matches_constraint(version: &str, constraint: &str) -> Result<bool> {
    let v = parse_version(version)?;
    let trimmed = constraint.strip_prefix('v').unwrap_or(constraint);
    let parts: Vec<&str> = trimmed.split('.').collect();
    let mut wanted = Vec::with_capacity(parts.len());
    for part in &parts {
        let n = part
            .parse::<u64>()
            .map_err(|e| RegistryError::InvalidVersion {
                version: constraint.to_string(),
                detail: e.to_string(),
            })?;
        wanted.push(n);
    }
    let actual = [v.major, v.minor, v.patch];
    if wanted.is_empty() || wanted.len() > actual.len() {
        return Err(RegistryError::InvalidVersion {
            version: constraint.to_string(),
            detail: "expected vX, vX.Y or vX.Y.Z".to_string(),
        });
    }
    Ok(wanted.iter().zip(actual.iter()).all(|(w, a)| w == a))
}
