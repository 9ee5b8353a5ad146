//! Snapshot change detection.
//!
//! The feed republishes the full book on every tick whether or not
//! anything moved. [`Deduplicator`] keeps the last accepted snapshot as a
//! baseline and rejects candidates that are structurally identical to it.
//!
//! Comparison is exact: no numeric tolerance, and metadata counts as much
//! as the rows. A CRC32 fingerprint of the canonical encoding is checked
//! first; only when fingerprints match is the full structural comparison
//! run, so a fingerprint collision can never hide a change.

use std::sync::Arc;

use crate::models::book::ClientSnapshot;

/// Outcome of checking a candidate snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate differs from the baseline and is now the baseline.
    Accept(Arc<ClientSnapshot>),
    /// The candidate equals the baseline; nothing changed.
    Unchanged,
}

#[derive(Debug)]
struct Baseline {
    fingerprint: u32,
    snapshot: Arc<ClientSnapshot>,
}

/// Tracks the dedup baseline.
#[derive(Debug, Default)]
pub struct Deduplicator {
    baseline: Option<Baseline>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `candidate` is a meaningful change.
    ///
    /// On [`Verdict::Accept`] the candidate replaces the baseline. On
    /// [`Verdict::Unchanged`] nothing is mutated.
    pub fn check(&mut self, candidate: ClientSnapshot) -> Verdict {
        let fingerprint = fingerprint(&candidate);

        if let Some(baseline) = &self.baseline
            && baseline.fingerprint == fingerprint
            && *baseline.snapshot == candidate
        {
            return Verdict::Unchanged;
        }

        let snapshot = Arc::new(candidate);
        self.baseline = Some(Baseline {
            fingerprint,
            snapshot: Arc::clone(&snapshot),
        });
        Verdict::Accept(snapshot)
    }

    /// The last accepted snapshot, if any.
    pub fn baseline(&self) -> Option<&Arc<ClientSnapshot>> {
        self.baseline.as_ref().map(|b| &b.snapshot)
    }
}

/// CRC32 of the snapshot's canonical encoding.
pub fn fingerprint(snapshot: &ClientSnapshot) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    snapshot.write_canonical(&mut hasher);
    hasher.finalize()
}
