// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic reachability checks over a set of endpoints

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use strand_core::{Worker, WorkerControl, WorkerError};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Decides whether one endpoint is reachable
pub trait Probe: Send + Sync {
    fn check(&self, endpoint: &str) -> bool;
}

impl<F> Probe for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn check(&self, endpoint: &str) -> bool {
        self(endpoint)
    }
}

/// TCP connect probe for `host:port` endpoints
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl Probe for TcpProbe {
    fn check(&self, endpoint: &str) -> bool {
        let addrs = match endpoint.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "cannot resolve endpoint");
                return false;
            }
        };
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        false
    }
}

/// Probes every endpoint once per round and tallies the outcomes
pub struct NetworkCheckerWorker {
    control: WorkerControl,
    endpoints: Vec<String>,
    interval: Duration,
    probe: Box<dyn Probe>,
    successes: AtomicU32,
    failures: AtomicU32,
}

impl NetworkCheckerWorker {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            control: WorkerControl::new(),
            endpoints,
            interval: DEFAULT_INTERVAL,
            probe: Box::new(TcpProbe::default()),
            successes: AtomicU32::new(0),
            failures: AtomicU32::new(0),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn success_count(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn fail_count(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// One pass over the endpoints; returns false if a stop cut it short
    fn check_endpoints(&self) -> bool {
        for endpoint in &self.endpoints {
            if self.control.is_stop_requested() {
                return false;
            }
            if self.probe.check(endpoint) {
                self.successes.fetch_add(1, Ordering::SeqCst);
                tracing::info!(endpoint = %endpoint, "endpoint reachable");
            } else {
                self.failures.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(endpoint = %endpoint, "endpoint unreachable");
            }
        }
        tracing::info!(
            successes = self.success_count(),
            failures = self.fail_count(),
            "check round complete"
        );
        true
    }
}

impl Worker for NetworkCheckerWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        tracing::info!(endpoints = self.endpoints.len(), "starting network checks");
        while self.should_continue() {
            if !self.check_endpoints() || !self.control.sleep(self.interval) {
                break;
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &str {
        "NetworkCheckerWorker"
    }

    fn description(&self) -> String {
        format!("Network checker for {} endpoints", self.endpoints.len())
    }

    fn on_stop(&self) {
        tracing::info!(
            successes = self.success_count(),
            failures = self.fail_count(),
            "network checks stopped"
        );
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
