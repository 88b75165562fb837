use quorumkv::replicator::*;
use quorumkv::*;
use std::time::Duration;
use tokio::sync::mpsc;

fn attempt(n: usize, outcome: AttemptOutcome) -> ReplicationAttempt {
    ReplicationAttempt {
        request_id: "req-1".to_string(),
        follower: FollowerTarget::parse(&format!("follower-{}:80", n)).unwrap(),
        delay: Duration::ZERO,
        elapsed: Duration::ZERO,
        outcome,
    }
}

fn error() -> AttemptOutcome {
    AttemptOutcome::FailureError("connection refused".to_string())
}

#[test]
fn test_tally_succeeds_at_quorum() {
    let mut tally = QuorumTally::new(2, 3);
    assert_eq!(tally.result(), None);

    assert_eq!(tally.record(&AttemptOutcome::Success), None);
    assert_eq!(tally.record(&AttemptOutcome::Success), Some(QuorumResult::Success));

    let decision = tally.to_decision(false);
    assert!(decision.is_success());
    assert_eq!(decision.acks, 2);
    assert_eq!(decision.seen, 2);
    assert_eq!(decision.total, 3);
}

#[test]
fn test_tally_fails_only_after_all_reported() {
    let mut tally = QuorumTally::new(2, 3);

    assert_eq!(tally.record(&AttemptOutcome::FailureTimeout), None);
    assert_eq!(tally.record(&AttemptOutcome::Success), None);
    assert_eq!(tally.record(&error()), Some(QuorumResult::Failure));

    let decision = tally.to_decision(false);
    assert_eq!(decision.result, QuorumResult::Failure);
    assert_eq!(decision.acks, 1);
    assert_eq!(decision.seen, 3);
}

#[test]
fn test_tally_decision_is_sticky() {
    let mut tally = QuorumTally::new(1, 3);
    assert_eq!(tally.record(&AttemptOutcome::Success), Some(QuorumResult::Success));

    assert_eq!(tally.record(&error()), Some(QuorumResult::Success));
    assert_eq!(tally.record(&error()), Some(QuorumResult::Success));
    assert_eq!(tally.seen(), 1);

    let mut failed = QuorumTally::new(1, 1);
    assert_eq!(failed.record(&error()), Some(QuorumResult::Failure));
    assert_eq!(failed.record(&AttemptOutcome::Success), Some(QuorumResult::Failure));
    assert_eq!(failed.acks(), 0);
}

#[test]
fn test_tally_zero_quorum_is_immediate_success() {
    let tally = QuorumTally::new(0, 3);
    assert_eq!(tally.result(), Some(QuorumResult::Success));
    assert_eq!(tally.seen(), 0);
}

#[test]
fn test_tally_fail_does_not_override_success() {
    let mut tally = QuorumTally::new(1, 2);
    tally.record(&AttemptOutcome::Success);
    assert_eq!(tally.fail(), QuorumResult::Success);

    let mut pending = QuorumTally::new(2, 2);
    pending.record(&AttemptOutcome::Success);
    assert_eq!(pending.fail(), QuorumResult::Failure);
}

#[tokio::test]
async fn test_gate_returns_before_remaining_outcomes() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = OutcomeStream::new(rx, 3);

    tx.send(attempt(1, AttemptOutcome::Success)).unwrap();
    tx.send(attempt(2, AttemptOutcome::Success)).unwrap();

    // The third sender is still open: the gate must not wait for it.
    let decision = QuorumGate::new(2).decide(&mut stream).await;
    assert!(decision.is_success());
    assert_eq!(decision.seen, 2);

    tx.send(attempt(3, error())).unwrap();
}

#[tokio::test]
async fn test_gate_counts_in_arrival_order() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = OutcomeStream::new(rx, 3);

    tx.send(attempt(3, error())).unwrap();
    tx.send(attempt(1, AttemptOutcome::FailureTimeout)).unwrap();
    tx.send(attempt(2, AttemptOutcome::Success)).unwrap();
    drop(tx);

    let decision = QuorumGate::new(2).decide(&mut stream).await;
    assert_eq!(decision.result, QuorumResult::Failure);
    assert_eq!(decision.acks, 1);
    assert_eq!(decision.seen, 3);
    assert!(!decision.deadline_expired);
}

#[tokio::test]
async fn test_gate_zero_quorum_consumes_nothing() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = OutcomeStream::new(rx, 2);

    let decision = QuorumGate::new(0).decide(&mut stream).await;
    assert!(decision.is_success());
    assert_eq!(decision.seen, 0);

    tx.send(attempt(1, AttemptOutcome::Success)).unwrap();
    assert!(stream.next().await.is_some());
}

#[tokio::test]
async fn test_gate_fails_when_stream_closes_early() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = OutcomeStream::new(rx, 3);

    tx.send(attempt(1, AttemptOutcome::Success)).unwrap();
    drop(tx);

    let decision = QuorumGate::new(2).decide(&mut stream).await;
    assert_eq!(decision.result, QuorumResult::Failure);
    assert_eq!(decision.seen, 1);
}

#[tokio::test(start_paused = true)]
async fn test_gate_deadline_bounds_failure_path() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut stream = OutcomeStream::new(rx, 3);
    tx.send(attempt(1, AttemptOutcome::Success)).unwrap();

    let start = tokio::time::Instant::now();
    let decision = QuorumGate::new(2)
        .with_deadline(Some(Duration::from_millis(250)))
        .decide(&mut stream)
        .await;

    assert_eq!(decision.result, QuorumResult::Failure);
    assert!(decision.deadline_expired);
    assert_eq!(decision.acks, 1);
    assert!(start.elapsed() >= Duration::from_millis(250));
    assert!(start.elapsed() < Duration::from_millis(300));
    drop(tx);
}

#[test]
fn test_seeded_delays_are_reproducible() {
    let a = DelayModel::uniform(Duration::from_millis(1), Duration::from_millis(500), Some(42));
    let b = DelayModel::uniform(Duration::from_millis(1), Duration::from_millis(500), Some(42));

    let first: Vec<_> = (0..32).map(|_| a.sample()).collect();
    let second: Vec<_> = (0..32).map(|_| b.sample()).collect();
    assert_eq!(first, second);

    for delay in first {
        assert!(delay >= Duration::from_millis(1));
        assert!(delay <= Duration::from_millis(500));
    }
}

#[test]
fn test_fixed_delay_range() {
    let model = DelayModel::uniform(Duration::from_millis(7), Duration::from_millis(7), None);
    assert_eq!(model.sample(), Duration::from_millis(7));
}

#[test]
fn test_scripted_delays_then_zero() {
    let model = DelayModel::scripted([Duration::from_millis(10), Duration::from_millis(3)]);
    assert_eq!(model.sample(), Duration::from_millis(10));
    assert_eq!(model.sample(), Duration::from_millis(3));
    assert_eq!(model.sample(), Duration::ZERO);
    assert_eq!(DelayModel::none().sample(), Duration::ZERO);
}
