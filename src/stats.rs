//! Fragment-processing statistics.
//!
//! Counters are atomic because fragments may be processed on rasterizer worker threads; relaxed
//! ordering is enough for counting. All counters reset at the start of each present cycle.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected during fragment processing.
#[derive(Debug, Default)]
pub struct FragmentStats {
    /// Fragments entering the fragment stage.
    pub count: AtomicU64,

    /// Fragments dropped by the scissor test.
    pub discard_scissor: AtomicU64,

    /// Fragments discarded by the fragment shader.
    pub discard_shader: AtomicU64,

    /// Fragments rejected by the depth test.
    pub discard_depth: AtomicU64,
}

impl FragmentStats {
    pub fn new() -> FragmentStats {
        FragmentStats::default()
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
        self.discard_scissor.store(0, Ordering::Relaxed);
        self.discard_shader.store(0, Ordering::Relaxed);
        self.discard_depth.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Snapshot of the counters as plain numbers: `(count, scissor, shader, depth)`.
    pub fn snapshot(&self) -> (u64, u64, u64, u64) {
        (
            self.count.load(Ordering::Relaxed),
            self.discard_scissor.load(Ordering::Relaxed),
            self.discard_shader.load(Ordering::Relaxed),
            self.discard_depth.load(Ordering::Relaxed),
        )
    }
}
