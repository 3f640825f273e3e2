// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Body of every managed thread

use crate::registry::{Registry, ThreadId};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strand_core::Worker;

/// Everything a hosting thread needs, moved in at spawn
pub(crate) struct HostContext {
    pub(crate) id: ThreadId,
    pub(crate) name: String,
    pub(crate) worker: Arc<dyn Worker>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) running: Arc<AtomicBool>,
}

/// Run the worker to completion on the current thread.
///
/// The worker is already `Running` when this starts. Whatever happens inside
/// `on_start` or `run` (including a panic), the worker ends `Finished`, the
/// entry is marked inactive and waiters are woken.
pub(crate) fn host(ctx: HostContext) {
    let span = tracing::info_span!("thread", thread_id = %ctx.id, name = %ctx.name);
    let _guard = span.enter();
    let _exit = ExitGuard {
        worker: &ctx.worker,
        registry: &ctx.registry,
        running: &ctx.running,
    };

    let worker = &ctx.worker;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        worker.on_start();
        worker.run()
    }));

    match outcome {
        Ok(Ok(())) => tracing::debug!("run completed"),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "run failed");
            report(worker.as_ref(), &e.to_string());
        }
        Err(payload) => {
            let message = format!("worker panicked: {}", panic_message(payload.as_ref()));
            tracing::error!(error = %message, "run panicked");
            report(worker.as_ref(), &message);
        }
    }
}

/// Forward a failure to `on_error`, containing a panic from the hook itself
fn report(worker: &dyn Worker, message: &str) {
    if panic::catch_unwind(AssertUnwindSafe(|| worker.on_error(message))).is_err() {
        tracing::error!("on_error hook panicked");
    }
}

struct ExitGuard<'a> {
    worker: &'a Arc<dyn Worker>,
    registry: &'a Registry,
    running: &'a AtomicBool,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.worker.control().mark_finished();
        // Flip under the lock so a waiter can't miss the notification
        let _entries = self.registry.lock();
        self.running.store(false, Ordering::SeqCst);
        self.registry.exited.notify_all();
        tracing::debug!("thread exited");
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
