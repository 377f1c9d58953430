//! Lenient version parsing.
//!
//! Release tags are rarely strict semver: `v1.2`, `2`, `1.2.3.4` and
//! `1.0.0rc1` all show up in the wild. [`parse`] accepts an optional leading
//! `v`, any number of numeric segments, and a pre-release either after a `-`
//! or glued on when it starts with a letter. Missing segments compare as zero.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease};

/// A parsed release version.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    pre: Prerelease,
    build: BuildMetadata,
}

impl Version {
    /// Numeric segments as written (`1.2` has two).
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Pre-release part, empty for a release.
    pub fn pre(&self) -> &str {
        self.pre.as_str()
    }

    /// Build metadata, ignored by [`compare`].
    pub fn build(&self) -> &str {
        self.build.as_str()
    }
}

/// Parses a release version, or returns `None` when it is not version-like.
pub fn parse(s: &str) -> Option<Version> {
    let s = s.trim();
    let s = s.strip_prefix(|c: char| c == 'v' || c == 'V').unwrap_or(s);

    let (rest, build) = match s.split_once('+') {
        Some((rest, build)) => (rest, BuildMetadata::new(build).ok()?),
        None => (s, BuildMetadata::EMPTY),
    };

    let split = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (core, tail) = rest.split_at(split);

    let pre = if tail.is_empty() {
        Prerelease::EMPTY
    } else if let Some(pre) = tail.strip_prefix('-') {
        if pre.is_empty() {
            return None;
        }
        Prerelease::new(pre).ok()?
    } else if tail.starts_with(|c: char| c.is_ascii_alphabetic()) {
        Prerelease::new(tail).ok()?
    } else {
        return None;
    };

    let segments = core
        .split('.')
        .map(|seg| {
            if seg.is_empty() {
                None
            } else {
                seg.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<_>>>()?;

    Some(Version {
        segments,
        pre,
        build,
    })
}

/// Orders two parsed versions: segments zero-padded, then a release above
/// its pre-releases. Build metadata is ignored.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    let len = a.segments.len().max(b.segments.len());
    for i in 0..len {
        let x = a.segments.get(i).copied().unwrap_or(0);
        let y = b.segments.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    match (a.pre.is_empty(), b.pre.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.pre.cmp(&b.pre),
    }
}

/// Whether `a` is strictly newer than `b`. `None` when either does not parse.
pub fn is_newer(a: &str, b: &str) -> Option<bool> {
    Some(compare(&parse(a)?, &parse(b)?) == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_forms() {
        assert_eq!(parse("1.2.3").unwrap().segments(), &[1, 2, 3]);
        assert_eq!(parse("v1.2").unwrap().segments(), &[1, 2]);
        assert_eq!(parse("7").unwrap().segments(), &[7]);
        assert_eq!(parse("1.02.0").unwrap().segments(), &[1, 2, 0]);
        assert_eq!(parse("1.2.3.4").unwrap().segments(), &[1, 2, 3, 4]);
        assert_eq!(parse("v2.0.0-rc.1").unwrap().pre(), "rc.1");
        assert_eq!(parse("1.0.0rc1").unwrap().pre(), "rc1");
        assert_eq!(parse("1.0.0+linux").unwrap().build(), "linux");
    }

    #[test]
    fn test_parse_rejects_tags() {
        for tag in ["", "latest", "nightly-2024", "1..2", "release-1.0", "1.2.", "1.0-", "1.0_1"] {
            assert!(parse(tag).is_none(), "{tag} should not parse");
        }
    }

    #[test]
    fn test_ordering() {
        assert_eq!(is_newer("1.10.0", "1.9.9"), Some(true));
        assert_eq!(is_newer("1.2.3.4", "1.2.3"), Some(true));
        assert_eq!(is_newer("1.2", "1.2.0.0"), Some(false));
        assert_eq!(is_newer("1.2.0.0", "1.2"), Some(false));
        assert_eq!(is_newer("1.0.0-rc.1", "1.0.0"), Some(false));
        assert_eq!(is_newer("1.0.0", "1.0.0rc1"), Some(true));
        assert_eq!(is_newer("1.0.0+a", "1.0.0+b"), Some(false));
        assert_eq!(is_newer("1.0.0", "nightly"), None);
    }
}
