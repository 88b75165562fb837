use crate::replicator::OutcomeStream;
use crate::types::*;
use std::time::Duration;
use tracing::{debug, warn};

/// Running ack count for one write.
///
/// Once `record` has returned a result the tally is decided and further
/// outcomes are ignored.
#[derive(Debug, Clone)]
pub struct QuorumTally {
    required: usize,
    total: usize,
    acks: usize,
    seen: usize,
    decided: Option<QuorumResult>,
}

impl QuorumTally {
    pub fn new(required: usize, total: usize) -> Self {
        let mut tally = Self {
            required,
            total,
            acks: 0,
            seen: 0,
            decided: None,
        };
        tally.decided = tally.evaluate();
        tally
    }

    pub fn record(&mut self, outcome: &AttemptOutcome) -> Option<QuorumResult> {
        if self.decided.is_some() {
            return self.decided;
        }
        self.seen += 1;
        if outcome.is_ack() {
            self.acks += 1;
        }
        self.decided = self.evaluate();
        self.decided
    }

    pub fn result(&self) -> Option<QuorumResult> {
        self.decided
    }

    pub fn acks(&self) -> usize {
        self.acks
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Settles an undecided tally as a failure, e.g. when time ran out.
    pub fn fail(&mut self) -> QuorumResult {
        *self.decided.get_or_insert(QuorumResult::Failure)
    }

    pub fn to_decision(&self, deadline_expired: bool) -> QuorumDecision {
        QuorumDecision {
            result: self.decided.unwrap_or(QuorumResult::Failure),
            required: self.required,
            total: self.total,
            acks: self.acks,
            seen: self.seen,
            deadline_expired,
        }
    }

    fn evaluate(&self) -> Option<QuorumResult> {
        if self.acks >= self.required {
            Some(QuorumResult::Success)
        } else if self.seen >= self.total {
            Some(QuorumResult::Failure)
        } else {
            None
        }
    }
}

/// Decides a write as soon as the outcome stream allows it.
#[derive(Debug, Clone)]
pub struct QuorumGate {
    required: usize,
    deadline: Option<Duration>,
}

impl QuorumGate {
    pub fn new(required: usize) -> Self {
        Self {
            required,
            deadline: None,
        }
    }

    /// Bounds the failure path so one unreachable follower cannot hold the response.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub async fn decide(&self, outcomes: &mut OutcomeStream) -> QuorumDecision {
        let mut tally = QuorumTally::new(self.required, outcomes.total());
        if tally.result().is_some() {
            return tally.to_decision(false);
        }

        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);

        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, outcomes.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tally.fail();
                        warn!(
                            "Write deadline expired with {}/{} acks ({} of {} reported)",
                            tally.acks(),
                            self.required,
                            tally.seen(),
                            outcomes.total()
                        );
                        return tally.to_decision(true);
                    }
                },
                None => outcomes.next().await,
            };

            let Some(attempt) = next else {
                // Every sender is gone without a full report; a worker task died.
                warn!(
                    "Outcome stream closed after {} of {} attempts",
                    tally.seen(),
                    outcomes.total()
                );
                tally.fail();
                return tally.to_decision(false);
            };

            debug!(
                "Attempt for {} at {} finished: {:?}",
                attempt.request_id, attempt.follower, attempt.outcome
            );

            if tally.record(&attempt.outcome).is_some() {
                return tally.to_decision(false);
            }
        }
    }
}
