// file: src/provision/catalog.rs
// version: 1.0.0
// guid: 435431e8-ee1e-41ab-8b1e-e139e5b3cf25

//! Packages the bridge needs and where to fetch them when apt cannot

use crate::config::Architecture;

/// Known-good download locations for one architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchUrls {
    pub arch: &'static str,
    /// Tried first, straight from the primary mirror pool
    pub direct: &'static [&'static str],
    /// Last resort, pinned in the Debian snapshot archive
    pub snapshot: &'static [&'static str],
}

/// One required OS package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: &'static str,
    /// The operator is asked whether to continue when this one fails
    pub critical: bool,
    pub urls: &'static [ArchUrls],
}

impl PackageSpec {
    fn for_arch(&self, arch: &Architecture) -> Option<&ArchUrls> {
        self.urls.iter().find(|urls| urls.arch == arch.as_str())
    }

    pub fn direct_urls(&self, arch: &Architecture) -> &'static [&'static str] {
        self.for_arch(arch).map(|urls| urls.direct).unwrap_or(&[])
    }

    pub fn snapshot_urls(&self, arch: &Architecture) -> &'static [&'static str] {
        self.for_arch(arch).map(|urls| urls.snapshot).unwrap_or(&[])
    }
}

pub const BRIDGE_UTILS: PackageSpec = PackageSpec {
    name: "bridge-utils",
    critical: false,
    urls: &[
        ArchUrls {
            arch: "armhf",
            direct: &["http://ftp.debian.org/debian/pool/main/b/bridge-utils/bridge-utils_1.7.1-1_armhf.deb"],
            snapshot: &[],
        },
        ArchUrls {
            arch: "arm64",
            direct: &["http://ftp.debian.org/debian/pool/main/b/bridge-utils/bridge-utils_1.7.1-1_arm64.deb"],
            snapshot: &[],
        },
    ],
};

pub const IFUPDOWN: PackageSpec = PackageSpec {
    name: "ifupdown",
    critical: true,
    urls: &[
        ArchUrls {
            arch: "armhf",
            direct: &["http://ftp.debian.org/debian/pool/main/i/ifupdown/ifupdown_0.8.41_armhf.deb"],
            snapshot: &["http://snapshot.debian.org/archive/debian/20231201T084046Z/pool/main/i/ifupdown/ifupdown_0.8.41_armhf.deb"],
        },
        ArchUrls {
            arch: "arm64",
            direct: &["http://ftp.debian.org/debian/pool/main/i/ifupdown/ifupdown_0.8.41_arm64.deb"],
            snapshot: &["http://snapshot.debian.org/archive/debian/20231201T084046Z/pool/main/i/ifupdown/ifupdown_0.8.41_arm64.deb"],
        },
    ],
};

/// Packages installed by the provisioner, in order
pub fn required_packages() -> Vec<PackageSpec> {
    vec![BRIDGE_UTILS, IFUPDOWN]
}
