//! helmgen core - the manifest aggregation pipeline behind `helm-generate`
//!
//! This crate provides:
//! - `BaseConfig` / `RenderRequest`: run-wide defaults merged with per-directory overrides
//! - `Values`: values documents with `--set` assignments applied
//! - `Aggregator`: walks a tree and renders every directory holding a values file
//! - `namespace`: Namespace synthesis and `metadata.namespace` injection
//! - `dedup` / `fingerprint`: structural deduplication of the aggregate output
//!
//! Rendering itself goes through the `ChartRenderer` and `PostRenderer` traits.

pub mod aggregate;
pub mod capabilities;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod namespace;
pub mod release;
pub mod render;
pub mod values;

pub use aggregate::Aggregator;
pub use capabilities::{Capabilities, KubeVersion, ServerVersionDiscovery, VersionSource};
pub use config::{BaseConfig, OverrideDocument, RenderRequest};
pub use dedup::{dedup, emit_stream, walk_dedup, Deduplicator};
pub use error::{CoreError, ErrorKind, Result};
pub use fingerprint::Fingerprint;
pub use manifest::{decode_manifests, encode_manifests, Manifest};
pub use namespace::{create_namespace, inject_namespace, NamespaceSpec};
pub use release::ReleaseInfo;
pub use render::{ChartRenderer, PostRenderer};
pub use values::{KeyValueAssignments, Values};
