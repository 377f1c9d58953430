//! Version-aware edits of an item's revision list.
//!
//! The list is kept newest-first for versions that parse (see
//! [`crate::version::parse`]). Non-version tags such as `nightly` collect at
//! the front in edit order.

use std::cmp::Ordering;

use tracing::debug;

use crate::item::Item;
use crate::revision::Revision;
use crate::version;

/// How [`Item::add_or_update_revision`] treats the latest pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviseMode {
    /// Insert in version order; become latest when newer than every entry.
    #[default]
    Natural,
    /// Always become latest; new entries go to the front.
    Latest,
    /// Insert in version order without moving the latest pointer.
    Old,
}

impl Item {
    /// Adds `rev`, or replaces the entry with the same version in place.
    ///
    /// A replacement only moves the latest pointer in [`ReviseMode::Latest`].
    pub fn add_or_update_revision(&mut self, rev: Revision, mode: ReviseMode) {
        let version = rev.version.clone();

        if let Some(slot) = self.versions.iter_mut().find(|r| r.version == version) {
            debug!(version = %version, "replacing revision");
            *slot = rev;
            if mode == ReviseMode::Latest {
                self.latest.version = version;
            }
            return;
        }

        match mode {
            ReviseMode::Latest => {
                self.versions.insert(0, rev);
                self.latest.version = version;
            }
            ReviseMode::Natural | ReviseMode::Old => self.insert_ordered(rev, mode),
        }
    }

    fn insert_ordered(&mut self, rev: Revision, mode: ReviseMode) {
        let version = rev.version.clone();

        let Some(parsed) = version::parse(&version) else {
            let at = self
                .versions
                .iter()
                .position(|r| version::parse(&r.version).is_none());
            match at {
                Some(at) => {
                    debug!(version = %version, index = at, "inserting non-semver revision");
                    self.versions.insert(at, rev);
                    // The front entry is the latest, in every mode.
                    if at == 0 {
                        self.latest.version = version;
                    }
                }
                None => {
                    debug!(version = %version, "appending non-semver revision");
                    self.versions.push(rev);
                }
            }
            return;
        };

        let newer = self.versions.iter().rposition(|r| {
            version::parse(&r.version)
                .is_some_and(|v| version::compare(&v, &parsed) == Ordering::Greater)
        });
        match newer {
            Some(at) => {
                debug!(version = %version, index = at + 1, "inserting revision");
                self.versions.insert(at + 1, rev);
            }
            None => {
                debug!(version = %version, "inserting revision at front");
                self.versions.insert(0, rev);
                if mode == ReviseMode::Natural {
                    self.latest.version = version;
                }
            }
        }
    }

    /// Removes the revision for `version`.
    ///
    /// When `version` is the latest pointer, the pointer moves to the new
    /// first entry, or is cleared when none remain. Returns whether anything
    /// was removed or repointed.
    pub fn delete_revision(&mut self, version: &str) -> bool {
        let was_latest = !version.is_empty() && self.latest.version == version;

        let removed = match self.versions.iter().position(|r| r.version == version) {
            Some(at) => {
                self.versions.remove(at);
                true
            }
            None => false,
        };

        if was_latest {
            self.latest.version = self
                .versions
                .first()
                .map(|r| r.version.clone())
                .unwrap_or_default();
        }
        removed || was_latest
    }
}
