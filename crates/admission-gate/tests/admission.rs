use admission_gate::{AdmissionError, AdmissionGate, RateLimiter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn start() -> Instant {
    Instant::now() + Duration::from_secs(3600)
}

#[test]
fn two_per_minute_window() {
    let gate = AdmissionGate::new(
        RateLimiter::new(2, Duration::from_secs(60)),
        Vec::new(),
        "boss",
    );
    let t0 = start();

    assert!(gate.validate_message_at(1, 1, "/ping", t0).is_ok());
    assert!(gate.validate_message_at(1, 1, "/ping", t0).is_ok());
    assert_eq!(
        gate.validate_message_at(1, 1, "/ping", t0 + Duration::from_secs(10)),
        Err(AdmissionError::RateLimited { requester_id: 1 })
    );
    assert!(gate
        .validate_message_at(1, 1, "/ping", t0 + Duration::from_secs(61))
        .is_ok());
}

#[test]
fn exactly_n_admitted_in_any_trailing_window() {
    let limiter = RateLimiter::new(5, Duration::from_secs(10));
    let t0 = start();

    let mut admitted = Vec::new();
    for ms in (0..30_000).step_by(250) {
        let now = t0 + Duration::from_millis(ms);
        if limiter.check_at(9, now) {
            admitted.push(now);
        }
    }

    for (i, first) in admitted.iter().enumerate() {
        let in_window = admitted[i..]
            .iter()
            .take_while(|t| **t < *first + Duration::from_secs(10))
            .count();
        assert!(in_window <= 5);
    }
    assert_eq!(admitted.len(), 15);
}

#[test]
fn concurrent_requests_never_exceed_limit() {
    const LIMIT: u32 = 10;
    const THREADS: usize = 32;

    let gate = Arc::new(AdmissionGate::new(
        RateLimiter::new(LIMIT, Duration::from_secs(60)),
        Vec::new(),
        "boss",
    ));
    let barrier = Arc::new(Barrier::new(THREADS));
    let admitted = Arc::new(AtomicUsize::new(0));
    let now = start();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let barrier = Arc::clone(&barrier);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..4 {
                    if gate.validate_message_at(42, 1, "/listroles", now).is_ok() {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(admitted.load(Ordering::SeqCst), LIMIT as usize);
}

#[test]
fn different_requesters_each_get_their_quota() {
    let gate = Arc::new(AdmissionGate::new(
        RateLimiter::new(3, Duration::from_secs(60)),
        Vec::new(),
        "boss",
    ));
    let now = start();

    let handles: Vec<_> = (0..8i64)
        .map(|requester| {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                (0..5)
                    .filter(|_| gate.validate_message_at(requester, 1, "hi", now).is_ok())
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
}
