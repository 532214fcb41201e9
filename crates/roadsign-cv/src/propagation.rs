//! Connected-component labeling by iterative minimum-label propagation.
//!
//! Every foreground pixel starts with a unique label. Each pass replaces a
//! pixel's label with the smallest nonzero label in its neighborhood, so
//! labels shrink monotonically towards one representative per component.
//! The loop stops at the first pass that changes nothing. Convergence takes
//! on the order of the longest in-component path, so by default no pass
//! limit is imposed; [`ConvergencePolicy`] adds an optional cap and timeout.

use crate::error::{ComputeError, ComputeResult};
use crate::traits::ComputeBackend;
use log::debug;
use roadsign_core::{Connectivity, LabelGrid, PixelMask};
use std::time::{Duration, Instant};

/// Bounds on the propagation loop. Both unset means "run until converged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvergencePolicy {
    pub max_passes: Option<usize>,
    pub timeout: Option<Duration>,
}

impl ConvergencePolicy {
    pub const UNBOUNDED: Self = Self {
        max_passes: None,
        timeout: None,
    };

    fn exhausted(&self, passes: usize, started: Instant) -> bool {
        self.max_passes.is_some_and(|max| passes >= max)
            || self.timeout.is_some_and(|limit| started.elapsed() >= limit)
    }
}

/// Converged labeling together with the number of passes it took.
#[derive(Debug, Clone)]
pub struct Propagation {
    pub labels: LabelGrid,
    /// Passes run, including the final one that changed nothing
    pub passes: usize,
}

/// Drives propagation passes on a backend until the labeling is stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelPropagator {
    connectivity: Connectivity,
    policy: ConvergencePolicy,
}

impl LabelPropagator {
    pub fn new(connectivity: Connectivity, policy: ConvergencePolicy) -> Self {
        Self {
            connectivity,
            policy,
        }
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Label the mask's foreground into connected components.
    pub fn propagate<B: ComputeBackend + ?Sized>(
        &self,
        backend: &B,
        mask: &PixelMask,
    ) -> ComputeResult<LabelGrid> {
        self.run(backend, mask).map(|outcome| outcome.labels)
    }

    /// Like [`propagate`](Self::propagate), also reporting the pass count.
    ///
    /// A backend failure or an exhausted policy aborts with no partial result.
    pub fn run<B: ComputeBackend + ?Sized>(
        &self,
        backend: &B,
        mask: &PixelMask,
    ) -> ComputeResult<Propagation> {
        let started = Instant::now();
        let mut labels = LabelGrid::seeded(mask);
        let mut passes = 0;

        loop {
            if self.policy.exhausted(passes, started) {
                return Err(ComputeError::NotConverged { passes });
            }

            let next = backend.propagate_pass(&labels, self.connectivity)?;
            passes += 1;
            if next == labels {
                break;
            }
            labels = next;
        }

        debug!(
            "labels converged after {} passes on {} ({:?} connectivity, {:.1?})",
            passes,
            backend.name(),
            self.connectivity,
            started.elapsed()
        );

        Ok(Propagation { labels, passes })
    }
}
