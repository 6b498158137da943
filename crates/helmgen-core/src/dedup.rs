//! Structural deduplication and emission of the aggregate manifest list

use std::collections::HashSet;

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::manifest::{encode_manifests, Manifest};

/// Tracks fingerprints of manifests already emitted
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<Fingerprint>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a manifest; returns `true` the first time its content is seen
    pub fn insert(&mut self, manifest: &Manifest) -> bool {
        self.seen.insert(manifest.fingerprint())
    }
}

/// Call `emit` once for each structurally distinct manifest, in first-occurrence order
pub fn walk_dedup<'a, I, F>(manifests: I, mut emit: F)
where
    I: IntoIterator<Item = &'a Manifest>,
    F: FnMut(&'a Manifest),
{
    let mut dedup = Deduplicator::new();
    for manifest in manifests {
        if dedup.insert(manifest) {
            emit(manifest);
        }
    }
}

/// Drop every later occurrence of a structurally equal manifest
pub fn dedup(manifests: Vec<Manifest>) -> Vec<Manifest> {
    let mut seen = Deduplicator::new();
    manifests
        .into_iter()
        .filter(|manifest| seen.insert(manifest))
        .collect()
}

/// Deduplicate and serialize into the final multi-document stream
pub fn emit_stream(manifests: &[Manifest]) -> Result<String> {
    let mut unique = Vec::with_capacity(manifests.len());
    walk_dedup(manifests, |manifest| unique.push(manifest));

    tracing::debug!(
        total = manifests.len(),
        emitted = unique.len(),
        "deduplicated manifests"
    );

    encode_manifests(unique)
}
