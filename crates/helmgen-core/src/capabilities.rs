//! Cluster capabilities used to parameterize rendering
//!
//! The Kubernetes version comes from the `KUBE_VERSION` environment variable
//! when it is set, otherwise from the live cluster. When neither yields a
//! usable version the defaults apply and renderers are left to pick their own.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable overriding the Kubernetes version
pub const KUBE_VERSION_ENV: &str = "KUBE_VERSION";

/// Asks a live cluster which Kubernetes version it runs
pub trait ServerVersionDiscovery {
    /// Raw server version, e.g. `v1.29.3-gke.100`
    fn server_version(&self) -> Result<String>;
}

impl<T: ServerVersionDiscovery + ?Sized> ServerVersionDiscovery for &T {
    fn server_version(&self) -> Result<String> {
        (**self).server_version()
    }
}

/// Where the Kubernetes version came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionSource {
    /// Nothing was detected, the built-in default applies
    #[default]
    Default,
    /// `KUBE_VERSION`
    Environment,
    /// The cluster's server version
    Cluster,
}

/// Cluster capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Kubernetes version
    pub kube_version: KubeVersion,

    #[serde(skip)]
    pub source: VersionSource,
}

/// Kubernetes version info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeVersion {
    pub version: String,
    pub major: String,
    pub minor: String,
}

impl Default for KubeVersion {
    fn default() -> Self {
        Self {
            version: "v1.28.0".to_string(),
            major: "1".to_string(),
            minor: "28".to_string(),
        }
    }
}

impl KubeVersion {
    /// Parse `1.29`, `v1.29.3`, `v1.29.3-gke.100` or `v1.29.3+k3s1`
    ///
    /// A missing patch defaults to 0. Pre-release and build metadata must be
    /// valid semver and are kept in the normalized version.
    pub fn parse(version: &str) -> Option<Self> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let parsed = match semver::Version::parse(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => semver::Version::parse(&pad_patch(trimmed)?).ok()?,
        };

        Some(Self {
            version: format!("v{}", parsed),
            major: parsed.major.to_string(),
            minor: parsed.minor.to_string(),
        })
    }
}

/// `1.29` -> `1.29.0`, `1.29-rc.1` -> `1.29.0-rc.1`
fn pad_patch(version: &str) -> Option<String> {
    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);

    if core.matches('.').count() != 1 {
        return None;
    }
    Some(format!("{}.0{}", core, suffix))
}

impl Capabilities {
    fn detected(kube_version: KubeVersion, source: VersionSource) -> Self {
        Self {
            kube_version,
            source,
        }
    }

    /// Capabilities for the given version override, or the defaults
    pub fn with_override(version: Option<&str>) -> Self {
        let Some(raw) = version else {
            return Self::default();
        };

        match KubeVersion::parse(raw) {
            Some(kube_version) => Self::detected(kube_version, VersionSource::Environment),
            None => {
                tracing::warn!(
                    value = raw,
                    "failed to parse {}, using default capabilities",
                    KUBE_VERSION_ENV
                );
                Self::default()
            }
        }
    }

    /// Resolve capabilities from an override, then the cluster, then the defaults
    ///
    /// The cluster is only queried when no override is given. A set but
    /// unparseable override does not fall through to the cluster.
    pub fn resolve<D: ServerVersionDiscovery + ?Sized>(
        version_override: Option<&str>,
        discovery: &D,
    ) -> Self {
        if version_override.is_some() {
            return Self::with_override(version_override);
        }

        let raw = match discovery.server_version() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to query cluster version, using default capabilities");
                return Self::default();
            }
        };

        match KubeVersion::parse(&raw) {
            Some(kube_version) => {
                tracing::debug!(version = %kube_version.version, "detected cluster version");
                Self::detected(kube_version, VersionSource::Cluster)
            }
            None => {
                tracing::warn!(value = %raw, "unrecognized cluster version, using default capabilities");
                Self::default()
            }
        }
    }

    /// Read `KUBE_VERSION` from the environment, querying the cluster when unset
    pub fn from_env<D: ServerVersionDiscovery + ?Sized>(discovery: &D) -> Self {
        let value = std::env::var(KUBE_VERSION_ENV).ok();
        Self::resolve(value.as_deref(), discovery)
    }

    /// The Kubernetes version, unless it is only the built-in default
    pub fn known_kube_version(&self) -> Option<&str> {
        match self.source {
            VersionSource::Default => None,
            VersionSource::Environment | VersionSource::Cluster => {
                Some(&self.kube_version.version)
            }
        }
    }
}
