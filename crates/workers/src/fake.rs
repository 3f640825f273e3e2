// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted worker for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use strand_core::{Worker, WorkerControl, WorkerError};

/// Recorded hook call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Initialize,
    Start,
    Stop,
    Pause,
    Resume,
    Error(String),
}

/// Shared view of what a [`ScriptedWorker`] has seen.
///
/// Clone it before handing the worker to a manager.
#[derive(Clone, Default)]
pub struct HookRecorder {
    calls: Arc<Mutex<Vec<HookCall>>>,
    iterations: Arc<AtomicU64>,
}

impl HookRecorder {
    /// Get all recorded calls
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, call: &HookCall) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    /// Errors passed to `on_error`, in order
    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HookCall::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Iterations completed by a looping body
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::SeqCst)
    }

    pub fn tick(&self) {
        self.iterations.fetch_add(1, Ordering::SeqCst);
    }

    fn record(&self, call: HookCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

type Body = Box<dyn Fn(&WorkerControl, &HookRecorder) -> Result<(), WorkerError> + Send + Sync>;

/// Worker whose run body is supplied by the test and whose hooks are recorded
pub struct ScriptedWorker {
    control: WorkerControl,
    type_name: String,
    recorder: HookRecorder,
    body: Body,
    initializer: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ScriptedWorker {
    pub fn with_body(
        body: impl Fn(&WorkerControl, &HookRecorder) -> Result<(), WorkerError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            control: WorkerControl::new(),
            type_name: "ScriptedWorker".to_string(),
            recorder: HookRecorder::default(),
            body: Box::new(body),
            initializer: None,
        }
    }

    /// Ticks once per millisecond until stopped
    pub fn looping() -> Self {
        Self::with_body(|control, recorder| {
            while control.should_continue() {
                recorder.tick();
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        })
    }

    /// Ticks `n` times, honouring pause and stop between ticks
    pub fn bounded(n: u64) -> Self {
        Self::with_body(move |control, recorder| {
            for _ in 0..n {
                if !control.should_continue() {
                    break;
                }
                recorder.tick();
            }
            Ok(())
        })
    }

    /// Returns `Err` straight away
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::with_body(move |_, _| Err(WorkerError::failed(message.clone())))
    }

    /// Panics straight away
    #[allow(clippy::panic)]
    pub fn panicking(message: &str) -> Self {
        let message = message.to_string();
        Self::with_body(move |_, _| panic!("{message}"))
    }

    pub fn with_type_name(mut self, type_name: &str) -> Self {
        self.type_name = type_name.to_string();
        self
    }

    /// Extra work done in `on_initialize`, after the call is recorded
    pub fn with_initializer(mut self, initializer: impl Fn() + Send + Sync + 'static) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    pub fn recorder(&self) -> HookRecorder {
        self.recorder.clone()
    }
}

impl Worker for ScriptedWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        (self.body)(&self.control, &self.recorder)
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn on_initialize(&self) {
        self.recorder.record(HookCall::Initialize);
        if let Some(initializer) = &self.initializer {
            initializer();
        }
    }

    fn on_start(&self) {
        self.recorder.record(HookCall::Start);
    }

    fn on_stop(&self) {
        self.recorder.record(HookCall::Stop);
    }

    fn on_pause(&self) {
        self.recorder.record(HookCall::Pause);
    }

    fn on_resume(&self) {
        self.recorder.record(HookCall::Resume);
    }

    fn on_error(&self, error: &str) {
        self.recorder.record(HookCall::Error(error.to_string()));
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
