// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named, deferred worker construction

use super::contract::Worker;
use crate::error::WorkerError;

/// Builds workers on demand for a registered type name
pub trait WorkerFactory: Send + Sync {
    /// Construct a fresh worker; ownership passes to the caller
    fn create_worker(&self) -> Result<Box<dyn Worker>, WorkerError>;

    /// Name the factory is registered under
    fn factory_type(&self) -> &str;

    /// Whether this factory accepts `config`.
    ///
    /// A `false` here is a routing answer, not an error: the manager moves on
    /// to another factory.
    fn supports_config(&self, _config: &str) -> bool {
        true
    }
}

type ConfigFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Factory backed by a closure
pub struct FnFactory<F> {
    factory_type: String,
    build: F,
    accepts: Option<ConfigFilter>,
}

impl<F> FnFactory<F>
where
    F: Fn() -> Result<Box<dyn Worker>, WorkerError> + Send + Sync,
{
    pub fn new(factory_type: impl Into<String>, build: F) -> Self {
        Self {
            factory_type: factory_type.into(),
            build,
            accepts: None,
        }
    }

    /// Restrict which configuration strings this factory accepts
    pub fn with_config_filter(
        mut self,
        accepts: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.accepts = Some(Box::new(accepts));
        self
    }
}

impl<F> WorkerFactory for FnFactory<F>
where
    F: Fn() -> Result<Box<dyn Worker>, WorkerError> + Send + Sync,
{
    fn create_worker(&self) -> Result<Box<dyn Worker>, WorkerError> {
        (self.build)()
    }

    fn factory_type(&self) -> &str {
        &self.factory_type
    }

    fn supports_config(&self, config: &str) -> bool {
        self.accepts.as_ref().map_or(true, |accepts| accepts(config))
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
