// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ManagerResultExt;
use strand_core::{FakeClock, FnFactory, WorkerError};
use proptest::prelude::*;
use std::sync::{mpsc, OnceLock};
use strand_workers::{HookCall, ScriptedWorker};
use yare::parameterized;

const POLL: Duration = Duration::from_millis(5);

fn manager(max_threads: usize) -> ThreadManager {
    ThreadManager::with_config(ManagerConfig::new(max_threads).with_poll_interval(POLL))
}

fn scripted_factory(
    build: fn() -> ScriptedWorker,
) -> FnFactory<impl Fn() -> Result<Box<dyn Worker>, WorkerError> + Send + Sync> {
    FnFactory::new("scripted", move || Ok(Box::new(build()) as Box<dyn Worker>))
}

/// Poll until `cond` holds, failing the test after a generous deadline
fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

// =============================================================================
// Factories
// =============================================================================

#[test]
fn duplicate_factory_is_refused_and_first_stays() {
    let manager = manager(0);
    manager
        .add_factory(scripted_factory(|| ScriptedWorker::bounded(0).with_type_name("First")), "job")
        .unwrap();

    let err = manager
        .add_factory(scripted_factory(|| ScriptedWorker::bounded(0).with_type_name("Second")), "job")
        .unwrap_err();
    assert!(matches!(err, ManagerError::FactoryExists(ref name) if name == "job"));

    let id = manager.create_thread("job", None).unwrap();
    assert_eq!(manager.snapshot(id).unwrap().type_name, "First");
    manager.wait_for_all();
}

#[test]
fn factory_types_are_sorted() {
    let manager = manager(0);
    manager.add_factory(scripted_factory(ScriptedWorker::looping), "zeta").unwrap();
    manager.add_factory(scripted_factory(ScriptedWorker::looping), "alpha").unwrap();
    assert_eq!(manager.factory_types(), vec!["alpha", "zeta"]);
}

#[test]
fn unknown_type_returns_sentinel_and_leaves_registry_empty() {
    let manager = manager(0);

    let result = manager.create_thread("missing", None);

    assert!(matches!(result, Err(ManagerError::UnknownType(ref t)) if t == "missing"));
    assert_eq!(manager.create_thread("missing", None).or_sentinel(), ThreadId::INVALID);
    assert_eq!(manager.total_thread_count(), 0);
}

#[test]
fn construction_failure_is_reported() {
    let manager = manager(0);
    manager
        .add_factory(
            FnFactory::new("broken", || Err(WorkerError::Construction("no config".into()))),
            "broken",
        )
        .unwrap();

    let err = manager.create_thread("broken", None).unwrap_err();

    assert!(matches!(err, ManagerError::Construction { ref type_name, .. } if type_name == "broken"));
    assert_eq!(manager.total_thread_count(), 0);
}

#[test]
fn factory_threads_are_named_after_registered_type() {
    let manager = manager(0);
    manager.add_factory(scripted_factory(ScriptedWorker::looping), "poller").unwrap();

    let first = manager.create_thread("poller", None).unwrap();
    let second = manager.create_thread("poller", Some("custom")).unwrap();

    assert_eq!(manager.snapshot(first).unwrap().name, format!("poller_{first}"));
    assert_eq!(manager.snapshot(second).unwrap().name, "custom");
}

#[test]
fn config_routing_uses_first_accepting_factory_in_name_order() {
    let manager = manager(0);
    manager
        .add_factory(
            scripted_factory(|| ScriptedWorker::bounded(0).with_type_name("Alpha"))
                .with_config_filter(|config| config.starts_with("a:")),
            "alpha",
        )
        .unwrap();
    manager
        .add_factory(
            scripted_factory(|| ScriptedWorker::bounded(0).with_type_name("Beta"))
                .with_config_filter(|config| config.contains(':')),
            "beta",
        )
        .unwrap();

    let a = manager.create_thread_for_config("a:1", None).unwrap();
    let b = manager.create_thread_for_config("b:1", None).unwrap();
    let none = manager.create_thread_for_config("plain", None);

    assert_eq!(manager.snapshot(a).unwrap().type_name, "Alpha");
    assert_eq!(manager.snapshot(a).unwrap().name, format!("alpha_{a}"));
    assert_eq!(manager.snapshot(b).unwrap().type_name, "Beta");
    assert!(matches!(none, Err(ManagerError::NoFactoryForConfig(ref c)) if c == "plain"));
    manager.wait_for_all();
}

// =============================================================================
// Creation
// =============================================================================

#[test]
fn ids_are_monotonic_and_never_reused() {
    let manager = manager(0);
    let first = manager.create_thread_with_worker(ScriptedWorker::bounded(0), None).unwrap();
    manager.wait_for_all();
    let second = manager.create_thread_with_worker(ScriptedWorker::bounded(0), None).unwrap();

    assert_eq!(first, ThreadId::from(1));
    assert_eq!(second, ThreadId::from(2));
    manager.wait_for_all();
}

#[test]
fn worker_threads_are_named_after_worker_type() {
    let manager = manager(0);
    let id = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
    assert_eq!(manager.snapshot(id).unwrap().name, "ScriptedWorker_1");
}

#[test]
fn initialize_and_start_hooks_run_in_order() {
    let manager = manager(0);
    let worker = ScriptedWorker::looping();
    let recorder = worker.recorder();

    let id = manager.create_thread_with_worker(worker, None).unwrap();
    wait_until("on_start", || recorder.count(&HookCall::Start) == 1);
    manager.stop_thread(id).unwrap();

    assert_eq!(
        recorder.calls(),
        vec![HookCall::Initialize, HookCall::Start, HookCall::Stop]
    );
}

#[test]
fn ceiling_refuses_extra_threads_until_cleanup() {
    let manager = manager(1);
    let id = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();

    let refused = manager.create_thread_with_worker(ScriptedWorker::looping(), None);
    assert!(matches!(refused, Err(ManagerError::AtCapacity { max: 1 })));
    assert_eq!(manager.total_thread_count(), 1);

    manager.stop_thread(id).unwrap();
    assert_eq!(manager.total_thread_count(), 1);
    assert_eq!(manager.cleanup_finished_threads(), 1);

    assert!(manager.create_thread_with_worker(ScriptedWorker::looping(), None).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn ceiling_admits_exactly_max(max in 1usize..5, attempts in 0usize..8) {
        let manager = manager(max);
        let admitted = (0..attempts)
            .map(|_| manager.create_thread_with_worker(ScriptedWorker::bounded(0), None))
            .filter(Result::is_ok)
            .count();

        prop_assert_eq!(admitted, attempts.min(max));
        prop_assert_eq!(manager.total_thread_count(), attempts.min(max));
        manager.wait_for_all();
    }
}

#[test]
fn lowering_ceiling_keeps_running_threads() {
    let manager = manager(0);
    for _ in 0..3 {
        manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
    }

    manager.set_max_threads(1);

    assert_eq!(manager.max_threads(), 1);
    assert_eq!(manager.active_thread_count(), 3);
    assert!(manager.create_thread_with_worker(ScriptedWorker::looping(), None).is_err());
}

#[test]
fn same_worker_cannot_be_started_twice() {
    let manager = manager(0);
    let worker = Arc::new(ScriptedWorker::looping());
    manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap();

    let err = manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap_err();

    assert!(matches!(err, ManagerError::AlreadyStarted(WorkerState::Running)));
    assert_eq!(manager.total_thread_count(), 1);
}

#[test]
fn worker_moved_to_running_elsewhere_is_refused() {
    let manager = manager(0);
    let worker = ScriptedWorker::looping();
    let recorder = worker.recorder();
    worker.control().mark_running();

    let err = manager.create_thread_with_worker(worker, None).unwrap_err();

    assert!(matches!(err, ManagerError::AlreadyStarted(WorkerState::Running)));
    assert!(recorder.calls().is_empty());
    assert_eq!(manager.total_thread_count(), 0);
}

/// A worker whose `on_initialize` blocks until the returned sender fires,
/// plus a receiver that signals once the initializer has been entered
fn gated_initializer() -> (ScriptedWorker, mpsc::Receiver<()>, mpsc::Sender<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let release_rx = Mutex::new(release_rx);
    let worker = ScriptedWorker::looping().with_initializer(move || {
        let _ = entered_tx.lock().unwrap().send(());
        let _ = release_rx.lock().unwrap().recv();
    });
    (worker, entered_rx, release_tx)
}

#[test]
fn slow_initializer_does_not_hold_the_registry() {
    let manager = manager(0);
    let busy = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
    let (worker, entered, release) = gated_initializer();

    thread::scope(|scope| {
        let manager = &manager;
        let creating = scope.spawn(move || manager.create_thread_with_worker(worker, None));
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        // Status queries and another thread's exit both need the registry
        assert_eq!(manager.total_thread_count(), 1);
        manager.stop_thread(busy).unwrap();
        assert_eq!(manager.snapshot(busy).unwrap().state, WorkerState::Finished);

        release.send(()).unwrap();
        let id = creating.join().unwrap().unwrap();
        assert_eq!(manager.snapshot(id).unwrap().state, WorkerState::Running);
    });
}

#[test]
fn ceiling_is_rechecked_after_initialize() {
    let manager = manager(1);
    let (worker, entered, release) = gated_initializer();
    let recorder = worker.recorder();

    thread::scope(|scope| {
        let manager = &manager;
        let creating = scope.spawn(move || manager.create_thread_with_worker(worker, None));
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
        release.send(()).unwrap();

        let refused = creating.join().unwrap();
        assert!(matches!(refused, Err(ManagerError::AtCapacity { max: 1 })));
    });
    assert_eq!(recorder.count(&HookCall::Initialize), 1);
    assert_eq!(recorder.count(&HookCall::Start), 0);
    assert_eq!(manager.total_thread_count(), 1);
}

#[test]
fn configured_poll_interval_is_applied() {
    let manager = manager(0);
    let worker = Arc::new(ScriptedWorker::looping());
    manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap();
    assert_eq!(worker.control().poll_interval(), POLL);
}

// =============================================================================
// Stop / pause / resume
// =============================================================================

#[test]
fn stop_joins_and_finishes_the_worker() {
    let manager = manager(0);
    let worker = Arc::new(ScriptedWorker::looping());
    let id = manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap();

    manager.stop_thread(id).unwrap();

    assert!(worker.is_finished());
    assert_eq!(manager.active_thread_count(), 0);
    assert_eq!(manager.thread_status(id), format!("ScriptedWorker_{id} [ScriptedWorker]: FINISHED"));
}

#[test]
fn concurrent_stops_both_return_after_exit() {
    let manager = Arc::new(manager(0));
    let worker = Arc::new(ScriptedWorker::looping());
    let id = manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap();

    let stoppers: Vec<_> = (0..2)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.stop_thread(id))
        })
        .collect();
    for stopper in stoppers {
        stopper.join().unwrap().unwrap();
        assert!(worker.is_finished());
    }
}

#[test]
fn stop_from_own_thread_requests_without_joining() {
    let manager = Arc::new(manager(0));
    let own_id = Arc::new(OnceLock::new());
    let stop_ok = Arc::new(AtomicBool::new(false));

    let weak = Arc::downgrade(&manager);
    let id_slot = Arc::clone(&own_id);
    let stop_flag = Arc::clone(&stop_ok);
    let worker = ScriptedWorker::with_body(move |control, _| {
        let id = loop {
            if let Some(id) = id_slot.get() {
                break *id;
            }
            thread::sleep(Duration::from_millis(1));
        };
        if let Some(manager) = weak.upgrade() {
            stop_flag.store(manager.stop_thread(id).is_ok(), Ordering::SeqCst);
        }
        while control.should_continue() {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    });
    let recorder = worker.recorder();
    let id = manager.create_thread_with_worker(worker, None).unwrap();
    own_id.set(id).unwrap();

    assert!(manager.wait_for_all_timeout(Duration::from_secs(5)));
    assert!(stop_ok.load(Ordering::SeqCst));
    assert_eq!(recorder.count(&HookCall::Stop), 1);
    assert_eq!(manager.total_thread_count(), 0);
}

#[parameterized(
    stop = { "stop" },
    pause = { "pause" },
    resume = { "resume" },
)]
fn unknown_id_is_not_found(op: &str) {
    let manager = manager(0);
    let id = ThreadId::from(99);
    let result = match op {
        "stop" => manager.stop_thread(id),
        "pause" => manager.pause_thread(id),
        _ => manager.resume_thread(id),
    };
    assert!(matches!(result, Err(ManagerError::ThreadNotFound(found)) if found == id));
}

#[test]
fn pause_and_resume_round_trip_preserves_progress() {
    let manager = manager(0);
    let worker = ScriptedWorker::looping();
    let recorder = worker.recorder();
    let id = manager.create_thread_with_worker(worker, None).unwrap();
    wait_until("first iteration", || recorder.iterations() > 0);

    manager.pause_thread(id).unwrap();
    wait_until("paused", || {
        manager.snapshot(id).unwrap().state == WorkerState::Paused
    });
    let frozen = recorder.iterations();
    thread::sleep(POLL * 4);
    assert_eq!(recorder.iterations(), frozen);
    assert_eq!(manager.active_thread_count(), 1);

    manager.resume_thread(id).unwrap();
    wait_until("running", || {
        manager.snapshot(id).unwrap().state == WorkerState::Running
    });
    wait_until("progress", || recorder.iterations() > frozen);

    assert_eq!(recorder.count(&HookCall::Pause), 1);
    assert_eq!(recorder.count(&HookCall::Resume), 1);
}

#[test]
fn resume_before_pause_is_observed_is_accepted() {
    let manager = manager(0);
    // Parks inside its body so it cannot reach a continuation check
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let worker = ScriptedWorker::with_body(move |control, _| {
        let _ = release_rx.lock().unwrap().recv();
        while control.should_continue() {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    });
    let id = manager.create_thread_with_worker(worker, None).unwrap();

    manager.pause_thread(id).unwrap();
    manager.resume_thread(id).unwrap();
    release_tx.send(()).unwrap();

    assert_eq!(manager.snapshot(id).unwrap().state, WorkerState::Running);
    manager.stop_thread(id).unwrap();
}

#[test]
fn resume_of_running_worker_is_invalid_state() {
    let manager = manager(0);
    let id = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();

    let err = manager.resume_thread(id).unwrap_err();

    assert!(matches!(
        err,
        ManagerError::InvalidState {
            expected: WorkerState::Paused,
            actual: WorkerState::Running,
            ..
        }
    ));
}

#[test]
fn pause_of_finished_worker_is_invalid_state() {
    let manager = manager(0);
    let id = manager.create_thread_with_worker(ScriptedWorker::bounded(1), None).unwrap();
    wait_until("finished", || {
        manager.snapshot(id).unwrap().state == WorkerState::Finished
    });

    let err = manager.pause_thread(id).unwrap_err();

    assert!(matches!(
        err,
        ManagerError::InvalidState {
            expected: WorkerState::Running,
            actual: WorkerState::Finished,
            ..
        }
    ));
}

#[test]
fn stop_releases_a_paused_worker() {
    let manager = manager(0);
    let worker = Arc::new(ScriptedWorker::looping());
    let id = manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap();
    manager.pause_thread(id).unwrap();
    wait_until("paused", || worker.is_paused());

    manager.stop_thread(id).unwrap();

    assert!(worker.is_finished());
}

// =============================================================================
// Failures inside run
// =============================================================================

#[test]
fn run_error_reaches_on_error_and_finishes() {
    let manager = manager(0);
    let worker = ScriptedWorker::failing("upstream gone");
    let recorder = worker.recorder();
    manager.create_thread_with_worker(worker, None).unwrap();

    manager.wait_for_all();

    assert_eq!(recorder.errors(), vec!["upstream gone".to_string()]);
    assert_eq!(manager.total_thread_count(), 0);
}

#[test]
fn panicking_worker_does_not_take_down_the_manager() {
    let manager = manager(0);
    let worker = ScriptedWorker::panicking("kaboom");
    let recorder = worker.recorder();
    manager.create_thread_with_worker(worker, None).unwrap();
    let healthy = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();

    wait_until("panic reported", || !recorder.errors().is_empty());

    assert_eq!(recorder.errors(), vec!["worker panicked: kaboom".to_string()]);
    assert!(manager.stop_thread(healthy).is_ok());
}

// =============================================================================
// Waiting and cleanup
// =============================================================================

#[test]
fn wait_for_all_with_nothing_registered_returns() {
    let manager = manager(0);
    manager.wait_for_all();
    assert!(manager.wait_for_all_timeout(Duration::ZERO));
}

#[test]
fn wait_for_all_returns_after_every_worker_finishes() {
    let manager = manager(0);
    let workers: Vec<_> = (0..4).map(|_| Arc::new(ScriptedWorker::bounded(50))).collect();
    for worker in &workers {
        manager.create_thread_with_worker(Arc::clone(worker), None).unwrap();
    }

    manager.wait_for_all();

    assert!(workers.iter().all(|w| w.is_finished()));
    assert_eq!(manager.total_thread_count(), 0);
}

#[test]
fn wait_timeout_reports_stragglers() {
    let manager = manager(0);
    manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();

    assert!(!manager.wait_for_all_timeout(Duration::from_millis(20)));
    assert_eq!(manager.total_thread_count(), 1);

    manager.stop_all();
    assert!(manager.wait_for_all_timeout(Duration::from_secs(5)));
    assert_eq!(manager.total_thread_count(), 0);
}

#[test]
fn cleanup_skips_live_threads() {
    let manager = manager(0);
    let live = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
    let done = manager.create_thread_with_worker(ScriptedWorker::bounded(1), None).unwrap();
    wait_until("bounded worker done", || {
        manager.snapshot(done).unwrap().state == WorkerState::Finished
    });
    // Its entry clears the running flag just after the state flips
    wait_until("reapable", || manager.cleanup_finished_threads() == 1);

    assert!(manager.snapshot(live).is_some());
    assert!(manager.snapshot(done).is_none());
    assert_eq!(manager.thread_status(done), "");
}

#[test]
fn stop_all_does_not_block() {
    let manager = manager(0);
    let recorders: Vec<_> = (0..3)
        .map(|_| {
            let worker = ScriptedWorker::looping();
            let recorder = worker.recorder();
            manager.create_thread_with_worker(worker, None).unwrap();
            recorder
        })
        .collect();

    manager.stop_all();
    manager.wait_for_all();

    assert!(recorders.iter().all(|r| r.count(&HookCall::Stop) == 1));
}

#[test]
fn drop_stops_and_joins_everything() {
    let worker = Arc::new(ScriptedWorker::looping());
    {
        let manager = manager(0);
        manager.create_thread_with_worker(Arc::clone(&worker), None).unwrap();
    }
    assert!(worker.is_finished());
    assert_eq!(Arc::strong_count(&worker), 1);
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn status_lines_are_ordered_by_id() {
    let manager = manager(0);
    manager.create_thread_with_worker(ScriptedWorker::looping(), Some("b")).unwrap();
    manager.create_thread_with_worker(ScriptedWorker::looping(), Some("a")).unwrap();

    assert_eq!(
        manager.all_thread_status(),
        vec![
            "b [ScriptedWorker]: RUNNING".to_string(),
            "a [ScriptedWorker]: RUNNING".to_string(),
        ]
    );
}

#[test]
fn snapshot_uptime_follows_injected_clock() {
    let clock = FakeClock::new();
    let manager = ThreadManager::with_clock(ManagerConfig::new(0), clock.clone());
    let id = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();

    clock.advance(Duration::from_secs(90));

    assert_eq!(manager.snapshot(id).unwrap().uptime, Duration::from_secs(90));
    assert_eq!(manager.snapshots().len(), 1);
}

#[test]
fn counts_track_active_and_total() {
    let manager = manager(0);
    let live = manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
    manager.create_thread_with_worker(ScriptedWorker::looping(), None).unwrap();
    assert_eq!(manager.active_thread_count(), 2);

    manager.stop_thread(live).unwrap();

    assert_eq!(manager.active_thread_count(), 1);
    assert_eq!(manager.total_thread_count(), 2);
}
