//! Integration tests for the session lifecycle
//!
//! Scenario walkthroughs, concurrent races, and randomized submit/lock schedules

use adjudicator::core::{Adjudicator, EngineConfig, Judge};
use adjudicator::types::{
    ArgumentId, CaseFile, JudgeError, SessionId, SessionStatus, User, UserId,
};
use async_trait::async_trait;
use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts calls and takes a moment to answer, so concurrent requests overlap
struct CountingJudge {
    calls: AtomicUsize,
}

#[async_trait]
impl Judge for CountingJudge {
    async fn adjudicate(&self, case: &CaseFile) -> Result<String, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(format!("Having read {} arguments, {} wins.", case.arguments.len(), case.creator))
    }
}

fn alice() -> User {
    User::new(1, "alice")
}

fn bob() -> User {
    User::new(2, "bob")
}

fn engine() -> (Arc<Adjudicator>, Arc<CountingJudge>) {
    let judge = Arc::new(CountingJudge { calls: AtomicUsize::new(0) });
    let engine = Arc::new(Adjudicator::new(EngineConfig::default(), judge.clone()));
    (engine, judge)
}

fn status(engine: &Adjudicator, id: SessionId) -> SessionStatus {
    engine.session(id, UserId(1)).unwrap().status
}

fn active_session(engine: &Adjudicator) -> SessionId {
    let created = engine.create_session("Pets: cats vs dogs", &alice()).unwrap();
    engine.join_session(created.join_link.as_deref().unwrap(), &bob()).unwrap();
    created.id
}

#[tokio::test]
async fn test_cats_vs_dogs_scenario() {
    let (engine, judge) = engine();

    let created = engine.create_session("Pets: cats vs dogs", &alice()).unwrap();
    assert_eq!(created.status, SessionStatus::AwaitingOpponent);
    let token = created.join_link.clone().unwrap();

    let joined = engine.join_session(&token, &bob()).unwrap();
    assert_eq!(joined.status, SessionStatus::Active);

    let a = engine.submit_argument(created.id, &alice(), "cats are cleaner").unwrap();
    engine.lock_argument(a.id, UserId(1)).unwrap();
    assert_eq!(status(&engine, created.id), SessionStatus::Active);

    let b = engine.submit_argument(created.id, &bob(), "dogs are loyal").unwrap();
    engine.lock_argument(b.id, UserId(2)).unwrap();
    assert_eq!(status(&engine, created.id), SessionStatus::AwaitingJudgment);

    let verdict = engine.request_judgment(created.id, UserId(1)).await.unwrap();
    assert!(!verdict.trim().is_empty());
    assert_eq!(status(&engine, created.id), SessionStatus::Judged);

    let err = engine.request_judgment(created.id, UserId(2)).await.unwrap_err();
    assert_eq!(err.kind(), "conflict");
    assert_eq!(judge.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_outsider_cannot_read_session() {
    let (engine, _) = engine();
    let id = active_session(&engine);
    let err = engine.session(id, UserId(3)).unwrap_err();
    assert_eq!(err.kind(), "forbidden");
}

#[tokio::test]
async fn test_creator_cannot_join_own_token() {
    let (engine, _) = engine();
    let created = engine.create_session("t", &alice()).unwrap();
    let err = engine
        .join_session(created.join_link.as_deref().unwrap(), &alice())
        .unwrap_err();
    assert!(matches!(err.kind(), "invalid_input" | "conflict"));
    assert_eq!(status(&engine, created.id), SessionStatus::AwaitingOpponent);
}

#[tokio::test]
async fn test_no_submissions_after_judgment() {
    let (engine, _) = engine();
    let id = active_session(&engine);
    let a = engine.submit_argument(id, &alice(), "a").unwrap();
    engine.lock_argument(a.id, UserId(1)).unwrap();
    let b = engine.submit_argument(id, &bob(), "b").unwrap();
    engine.lock_argument(b.id, UserId(2)).unwrap();
    engine.request_judgment(id, UserId(1)).await.unwrap();

    assert_eq!(engine.submit_argument(id, &bob(), "late").unwrap_err().kind(), "conflict");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_admit_exactly_one() {
    let (engine, _) = engine();

    for round in 0..20 {
        let created = engine.create_session(&format!("round {}", round), &alice()).unwrap();
        let token = created.join_link.clone().unwrap();

        let joins = (0..8u64).map(|i| {
            let engine = Arc::clone(&engine);
            let token = token.clone();
            tokio::spawn(async move {
                let user = User::new(100 + i, format!("user{}", i));
                engine.join_session(&token, &user).map(|_| user.id)
            })
        });
        let results: Vec<_> = join_all(joins).await.into_iter().map(|r| r.unwrap()).collect();

        let winners: Vec<UserId> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
        assert_eq!(winners.len(), 1, "round {}", round);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(err.kind(), "conflict" | "not_found"), "{}", err);
        }

        // The single winner stayed the opponent
        let view = engine.session(created.id, winners[0]).unwrap();
        assert_eq!(view.status, SessionStatus::Active);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_final_locks_settle() {
    let (engine, _) = engine();

    for _ in 0..50 {
        let id = active_session(&engine);
        let a = engine.submit_argument(id, &alice(), "a").unwrap();
        let b = engine.submit_argument(id, &bob(), "b").unwrap();

        let lock_a = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.lock_argument(a.id, UserId(1)) })
        };
        let lock_b = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.lock_argument(b.id, UserId(2)) })
        };
        lock_a.await.unwrap().unwrap();
        lock_b.await.unwrap().unwrap();

        assert_eq!(status(&engine, id), SessionStatus::AwaitingJudgment);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_locks() {
    let (engine, _) = engine();
    let id = active_session(&engine);
    let a = engine.submit_argument(id, &alice(), "only once").unwrap();

    let locks = (0..6).map(|_| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.lock_argument(a.id, UserId(1)) })
    });
    let results: Vec<_> = join_all(locks).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), "conflict");
    }
    let listed = engine.arguments(id, UserId(1)).unwrap();
    assert_eq!(listed.arguments[0].content, "only once");
    assert_eq!(listed.arguments[0].submitted_at, a.submitted_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_judgment_requests_call_judge_once() {
    let (engine, judge) = engine();
    let id = active_session(&engine);
    let a = engine.submit_argument(id, &alice(), "a").unwrap();
    engine.lock_argument(a.id, UserId(1)).unwrap();
    let b = engine.submit_argument(id, &bob(), "b").unwrap();
    engine.lock_argument(b.id, UserId(2)).unwrap();

    let requests = (0..10u64).map(|i| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.request_judgment(id, UserId(1 + i % 2)).await })
    });
    let results: Vec<_> = join_all(requests).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), "conflict");
    }
    assert_eq!(judge.calls.load(Ordering::SeqCst), 1);
    assert_eq!(status(&engine, id), SessionStatus::Judged);
}

/// Random submit/lock schedules from both sides: the session reaches
/// `awaiting_judgment` exactly when both sides hold a locked argument, and
/// its status never moves backwards.
#[test]
fn test_random_interleavings_settle_iff_both_locked() {
    let mut rng = StdRng::seed_from_u64(0x5eed_ad1u64);

    for _ in 0..300 {
        let (engine, _) = engine();
        let id = active_session(&engine);
        let users = [alice(), bob()];
        let mut own: [Vec<ArgumentId>; 2] = [Vec::new(), Vec::new()];
        let mut locked = [false, false];
        let mut last = status(&engine, id);

        for _ in 0..rng.gen_range(1..16) {
            let side = rng.gen_range(0..2);
            let user = &users[side];

            if own[side].is_empty() || rng.gen_bool(0.5) {
                let result = engine.submit_argument(id, user, "point");
                match result {
                    Ok(view) => {
                        assert!(!locked[side]);
                        own[side].push(view.id);
                    }
                    Err(err) => {
                        assert_eq!(err.kind(), "conflict");
                        assert!(locked[side] || last != SessionStatus::Active);
                    }
                }
            } else {
                let pick = own[side][rng.gen_range(0..own[side].len())];
                if engine.lock_argument(pick, user.id).is_ok() {
                    locked[side] = true;
                }
            }

            let now = status(&engine, id);
            assert!(now >= last, "status moved backwards: {} -> {}", last, now);
            assert_eq!(
                now == SessionStatus::AwaitingJudgment,
                locked[0] && locked[1],
                "status {} with locks {:?}",
                now,
                locked
            );
            last = now;
        }
    }
}
