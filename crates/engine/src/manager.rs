// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread manager: factory map, registry and lifecycle protocol

use crate::error::ManagerError;
use crate::host::{self, HostContext};
use crate::registry::{Registry, RegistryEntry, ThreadId, ThreadSnapshot};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use strand_core::{Clock, ManagerConfig, SystemClock, Worker, WorkerFactory, WorkerState};

type FactoryMap = BTreeMap<String, Box<dyn WorkerFactory>>;

/// Owns a set of workers, each on its own dedicated thread.
///
/// All operations take `&self`; share the manager behind an `Arc` to drive it
/// from several threads. Dropping the manager stops every worker and waits
/// for all of them, so no thread outlives it.
///
/// Lock order is factories before registry. Neither lock is held across a
/// join or a worker hook: `on_initialize` runs before the registry lock is
/// taken, and the stop/pause/resume hooks run after it is released.
pub struct ThreadManager<C: Clock = SystemClock> {
    factories: Mutex<FactoryMap>,
    registry: Arc<Registry>,
    next_id: AtomicU64,
    max_threads: AtomicUsize,
    poll_interval: Option<Duration>,
    clock: C,
}

impl ThreadManager<SystemClock> {
    /// Create a manager with the given ceiling (0 = unbounded)
    pub fn new(max_threads: usize) -> Self {
        Self::with_config(ManagerConfig::new(max_threads))
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for ThreadManager<SystemClock> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<C: Clock> ThreadManager<C> {
    pub fn with_clock(config: ManagerConfig, clock: C) -> Self {
        Self {
            factories: Mutex::new(BTreeMap::new()),
            registry: Arc::new(Registry::default()),
            next_id: AtomicU64::new(1),
            max_threads: AtomicUsize::new(config.max_threads),
            poll_interval: config.poll_interval,
            clock,
        }
    }

    /// Register `factory` under `type_name`.
    ///
    /// A second registration under the same name is refused and the first
    /// factory stays in effect.
    pub fn add_factory<F>(&self, factory: F, type_name: &str) -> Result<(), ManagerError>
    where
        F: WorkerFactory + 'static,
    {
        let mut factories = self.lock_factories();
        if factories.contains_key(type_name) {
            tracing::debug!(worker_type = type_name, "factory already registered");
            return Err(ManagerError::FactoryExists(type_name.to_string()));
        }
        factories.insert(type_name.to_string(), Box::new(factory));
        tracing::debug!(worker_type = type_name, "factory registered");
        Ok(())
    }

    /// Registered factory names, in order
    pub fn factory_types(&self) -> Vec<String> {
        self.lock_factories().keys().cloned().collect()
    }

    /// Construct a worker through the factory registered as `type_name` and
    /// start it. Without a `name` the thread is called `<type_name>_<id>`.
    pub fn create_thread(
        &self,
        type_name: &str,
        name: Option<&str>,
    ) -> Result<ThreadId, ManagerError> {
        let worker = {
            let factories = self.lock_factories();
            let factory = factories
                .get(type_name)
                .ok_or_else(|| ManagerError::UnknownType(type_name.to_string()))?;
            self.check_capacity()?;
            construct(type_name, factory.as_ref())?
        };
        self.start(Arc::from(worker), type_name, name)
    }

    /// Start the first factory, in name order, that accepts `config`
    pub fn create_thread_for_config(
        &self,
        config: &str,
        name: Option<&str>,
    ) -> Result<ThreadId, ManagerError> {
        let (type_name, worker) = {
            let factories = self.lock_factories();
            let (type_name, factory) = factories
                .iter()
                .find(|(_, factory)| factory.supports_config(config))
                .ok_or_else(|| ManagerError::NoFactoryForConfig(config.to_string()))?;
            self.check_capacity()?;
            (type_name.clone(), construct(type_name, factory.as_ref())?)
        };
        self.start(Arc::from(worker), &type_name, name)
    }

    /// Take ownership of an already-built worker and start it.
    ///
    /// Pass an `Arc<W>` clone to keep a handle for reading worker-specific
    /// progress while the manager runs it. A worker can only be started once.
    pub fn create_thread_with_worker<W>(
        &self,
        worker: W,
        name: Option<&str>,
    ) -> Result<ThreadId, ManagerError>
    where
        W: Worker + 'static,
    {
        let type_name = worker.type_name().to_string();
        self.start(Arc::new(worker), &type_name, name)
    }

    fn start(
        &self,
        worker: Arc<dyn Worker>,
        type_name: &str,
        name: Option<&str>,
    ) -> Result<ThreadId, ManagerError> {
        let state = worker.state();
        if state != WorkerState::Stopped {
            return Err(ManagerError::AlreadyStarted(state));
        }
        self.check_capacity()?;

        if let Some(interval) = self.poll_interval {
            worker.control().set_poll_interval(interval);
        }
        worker.on_initialize();

        // Re-checked: other creations may have run during on_initialize
        let mut entries = self.registry.lock();
        let max = self.max_threads();
        if max != 0 && entries.len() >= max {
            tracing::warn!(max, worker_type = type_name, "thread limit reached");
            return Err(ManagerError::AtCapacity { max });
        }
        if !worker.control().mark_running() {
            return Err(ManagerError::AlreadyStarted(worker.state()));
        }

        let id = ThreadId::from(self.next_id.fetch_add(1, Ordering::SeqCst));
        let name = name.map_or_else(|| format!("{type_name}_{id}"), str::to_string);

        let running = Arc::new(AtomicBool::new(true));
        let context = HostContext {
            id,
            name: name.clone(),
            worker: Arc::clone(&worker),
            registry: Arc::clone(&self.registry),
            running: Arc::clone(&running),
        };
        let spawned = thread::Builder::new()
            .name(name.replace('\0', ""))
            .spawn(move || host::host(context));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                worker.control().mark_finished();
                tracing::error!(thread_id = %id, name = %name, error = %e, "failed to spawn thread");
                return Err(ManagerError::Spawn(e));
            }
        };

        entries.insert(
            id,
            RegistryEntry {
                id,
                name: name.clone(),
                thread: handle.thread().clone(),
                worker,
                handle: Some(handle),
                running,
                start_time: self.clock.now(),
            },
        );
        drop(entries);

        tracing::info!(thread_id = %id, name = %name, worker_type = type_name, "thread created");
        Ok(id)
    }

    /// Request a stop and block until the thread has exited.
    ///
    /// Called from the target's own thread, only the request is made.
    pub fn stop_thread(&self, id: ThreadId) -> Result<(), ManagerError> {
        let (worker, handle, own_thread) = {
            let mut entries = self.registry.lock();
            let entry = entries
                .get_mut(&id)
                .ok_or(ManagerError::ThreadNotFound(id))?;
            let own_thread = entry.is_current_thread();
            let handle = if own_thread { None } else { entry.handle.take() };
            (Arc::clone(&entry.worker), handle, own_thread)
        };

        worker.control().request_stop();
        worker.on_stop();
        tracing::debug!(thread_id = %id, "stop requested");

        if own_thread {
            return Ok(());
        }
        match handle {
            Some(handle) => join(id, handle),
            // Another caller holds the handle; wait for the exit signal instead
            None => self.wait_for_exit(id),
        }
        tracing::info!(thread_id = %id, "thread stopped");
        Ok(())
    }

    /// Ask a `Running` worker to pause at its next continuation check
    pub fn pause_thread(&self, id: ThreadId) -> Result<(), ManagerError> {
        let worker = self.worker_where(id, WorkerState::Running, |state, _| {
            state == WorkerState::Running
        })?;
        worker.control().request_pause();
        worker.on_pause();
        tracing::debug!(thread_id = %id, "pause requested");
        Ok(())
    }

    /// Lift a pause.
    ///
    /// Accepts a `Paused` worker, or a `Running` one whose pause request has
    /// not been observed yet.
    pub fn resume_thread(&self, id: ThreadId) -> Result<(), ManagerError> {
        let worker = self.worker_where(id, WorkerState::Paused, |state, worker| {
            state == WorkerState::Paused
                || (state == WorkerState::Running && worker.control().is_pause_requested())
        })?;
        worker.control().request_resume();
        worker.on_resume();
        tracing::debug!(thread_id = %id, "resume requested");
        Ok(())
    }

    /// Request a stop on every worker without waiting
    pub fn stop_all(&self) {
        let workers: Vec<(ThreadId, Arc<dyn Worker>)> = self
            .registry
            .lock()
            .values()
            .map(|entry| (entry.id, Arc::clone(&entry.worker)))
            .collect();
        for (id, worker) in &workers {
            worker.control().request_stop();
            worker.on_stop();
            tracing::debug!(thread_id = %id, "stop requested");
        }
        if !workers.is_empty() {
            tracing::info!(count = workers.len(), "stop requested on all threads");
        }
    }

    /// Block until no registered thread is active, then reap them.
    ///
    /// Returns immediately when nothing is registered. Must not be called
    /// from a managed thread.
    pub fn wait_for_all(&self) {
        {
            let entries = self.registry.lock();
            let _entries = self
                .registry
                .exited
                .wait_while(entries, |entries| {
                    entries.values().any(RegistryEntry::is_running)
                })
                .unwrap_or_else(|e| e.into_inner());
        }
        self.cleanup_finished_threads();
    }

    /// Like [`wait_for_all`](Self::wait_for_all) with a deadline.
    ///
    /// Returns whether every thread exited in time; cleanup runs only then.
    pub fn wait_for_all_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let finished = {
            let mut entries = self.registry.lock();
            loop {
                if !entries.values().any(RegistryEntry::is_running) {
                    break true;
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break false;
                }
                entries = self
                    .registry
                    .exited
                    .wait_timeout(entries, remaining)
                    .unwrap_or_else(|e| e.into_inner())
                    .0;
            }
        };
        if finished {
            self.cleanup_finished_threads();
        }
        finished
    }

    /// Workers currently `Running` or `Paused`
    pub fn active_thread_count(&self) -> usize {
        self.registry
            .lock()
            .values()
            .filter(|entry| entry.worker.state().is_active())
            .count()
    }

    /// Registered entries, including finished ones not yet reaped
    pub fn total_thread_count(&self) -> usize {
        self.registry.lock().len()
    }

    /// `"<name> [<type>]: <STATE>"`, or an empty string for an unknown id
    pub fn thread_status(&self, id: ThreadId) -> String {
        self.snapshot(id)
            .map(|snapshot| snapshot.to_string())
            .unwrap_or_default()
    }

    /// Status line of every registered thread, ordered by id
    pub fn all_thread_status(&self) -> Vec<String> {
        self.snapshots()
            .iter()
            .map(ThreadSnapshot::to_string)
            .collect()
    }

    pub fn snapshot(&self, id: ThreadId) -> Option<ThreadSnapshot> {
        self.registry
            .lock()
            .get(&id)
            .map(|entry| entry.snapshot(&self.clock))
    }

    pub fn snapshots(&self) -> Vec<ThreadSnapshot> {
        self.registry
            .lock()
            .values()
            .map(|entry| entry.snapshot(&self.clock))
            .collect()
    }

    /// Remove entries whose thread has exited and whose worker is
    /// `Finished`, joining each one. Returns how many were removed.
    pub fn cleanup_finished_threads(&self) -> usize {
        let reaped: Vec<RegistryEntry> = {
            let mut entries = self.registry.lock();
            let ids: Vec<ThreadId> = entries
                .values()
                .filter(|entry| entry.is_reapable())
                .map(|entry| entry.id)
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };

        let count = reaped.len();
        for mut entry in reaped {
            if let Some(handle) = entry.handle.take() {
                join(entry.id, handle);
            }
            tracing::info!(thread_id = %entry.id, name = %entry.name, "thread reaped");
        }
        count
    }

    /// Change the ceiling; existing threads are never stopped by this
    pub fn set_max_threads(&self, max_threads: usize) {
        self.max_threads.store(max_threads, Ordering::SeqCst);
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads.load(Ordering::SeqCst)
    }

    fn lock_factories(&self) -> MutexGuard<'_, FactoryMap> {
        self.factories.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_capacity(&self) -> Result<(), ManagerError> {
        let max = self.max_threads();
        if max != 0 && self.registry.lock().len() >= max {
            return Err(ManagerError::AtCapacity { max });
        }
        Ok(())
    }

    /// Look up `id` and hand back its worker if `accept` holds for its state
    fn worker_where(
        &self,
        id: ThreadId,
        expected: WorkerState,
        accept: impl Fn(WorkerState, &dyn Worker) -> bool,
    ) -> Result<Arc<dyn Worker>, ManagerError> {
        let entries = self.registry.lock();
        let entry = entries.get(&id).ok_or(ManagerError::ThreadNotFound(id))?;
        let actual = entry.worker.state();
        if !accept(actual, entry.worker.as_ref()) {
            return Err(ManagerError::InvalidState {
                id,
                expected,
                actual,
            });
        }
        Ok(Arc::clone(&entry.worker))
    }

    fn wait_for_exit(&self, id: ThreadId) {
        let entries = self.registry.lock();
        let _entries = self
            .registry
            .exited
            .wait_while(entries, |entries| {
                entries.get(&id).is_some_and(RegistryEntry::is_running)
            })
            .unwrap_or_else(|e| e.into_inner());
    }
}

impl<C: Clock> Drop for ThreadManager<C> {
    fn drop(&mut self) {
        self.stop_all();
        self.wait_for_all();
    }
}

fn construct(
    type_name: &str,
    factory: &dyn WorkerFactory,
) -> Result<Box<dyn Worker>, ManagerError> {
    factory.create_worker().map_err(|source| {
        tracing::warn!(worker_type = type_name, error = %source, "worker construction failed");
        ManagerError::Construction {
            type_name: type_name.to_string(),
            source,
        }
    })
}

fn join(id: ThreadId, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        tracing::error!(thread_id = %id, "thread terminated abnormally");
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
