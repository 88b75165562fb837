use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Source of the simulated network delay a worker waits before replicating.
///
/// Delays are drawn in launch order, so a fixed seed (or a script) gives the
/// same delay to the same (request, follower) pair on every run.
pub struct DelayModel {
    kind: DelayKind,
}

enum DelayKind {
    Uniform {
        min: Duration,
        max: Duration,
        rng: Mutex<StdRng>,
    },
    Scripted(Mutex<VecDeque<Duration>>),
}

impl DelayModel {
    pub fn uniform(min: Duration, max: Duration, seed: Option<u64>) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            kind: DelayKind::Uniform {
                min,
                max,
                rng: Mutex::new(rng),
            },
        }
    }

    pub fn none() -> Self {
        Self::scripted(Vec::new())
    }

    /// Hands out the given delays in order, then zero once exhausted.
    pub fn scripted(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            kind: DelayKind::Scripted(Mutex::new(delays.into_iter().collect())),
        }
    }

    pub fn sample(&self) -> Duration {
        match &self.kind {
            DelayKind::Uniform { min, max, rng } => {
                if min == max {
                    return *min;
                }
                let lo = min.as_micros() as u64;
                let hi = max.as_micros() as u64;
                let micros = rng
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .gen_range(lo..=hi);
                Duration::from_micros(micros)
            }
            DelayKind::Scripted(queue) => queue
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or(Duration::ZERO),
        }
    }
}
