// file: src/provision/tiers.rs
// version: 1.0.0
// guid: f528ea05-00dc-44b8-aa7f-53bb25a67f35

//! Fallback tiers for getting a package onto the host

use super::catalog::PackageSpec;
use crate::config::Architecture;
use std::fmt;

/// One way of installing a package; tried in [`DEFAULT_TIERS`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// `apt-get install`
    PackageManager,
    /// Known-good URL for the detected architecture
    DirectUrl,
    /// Index filename looked up locally, tried against each mirror
    MirrorSearch,
    /// Pinned URL in the snapshot archive
    Snapshot,
}

pub const DEFAULT_TIERS: [Tier; 4] = [
    Tier::PackageManager,
    Tier::DirectUrl,
    Tier::MirrorSearch,
    Tier::Snapshot,
];

impl Tier {
    /// Whether this tier downloads a file instead of asking the package manager
    pub fn downloads(&self) -> bool {
        !matches!(self, Tier::PackageManager)
    }

    /// Candidate URLs for this tier, in the order they are tried.
    ///
    /// `index_filename` is only consulted by [`Tier::MirrorSearch`].
    pub fn candidate_urls<'a>(
        &self,
        spec: &PackageSpec,
        arch: &Architecture,
        index_filename: Option<&str>,
        mirrors: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        match self {
            Tier::PackageManager => Vec::new(),
            Tier::DirectUrl => spec.direct_urls(arch).iter().map(|u| u.to_string()).collect(),
            Tier::MirrorSearch => match index_filename {
                Some(filename) => {
                    let filename = filename.trim_start_matches('/');
                    mirrors
                        .into_iter()
                        .map(|mirror| {
                            if mirror.ends_with('/') {
                                format!("{}{}", mirror, filename)
                            } else {
                                format!("{}/{}", mirror, filename)
                            }
                        })
                        .collect()
                }
                None => Vec::new(),
            },
            Tier::Snapshot => spec.snapshot_urls(arch).iter().map(|u| u.to_string()).collect(),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::PackageManager => "package manager",
            Tier::DirectUrl => "direct download",
            Tier::MirrorSearch => "mirror search",
            Tier::Snapshot => "snapshot archive",
        };
        f.write_str(label)
    }
}
