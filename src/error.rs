//! Error taxonomy and the joined cleanup report.
//!
//! The registry distinguishes three failures: a resolve against an
//! unregistered key, a failing setup (or middleware) function, and a failing
//! release function during cleanup. The first two abort the current resolve;
//! the third is collected and draining continues. Every failure is also
//! appended to the registry's permanent log, which [`Registry::cleanup`]
//! returns as a [`CleanupReport`].
//!
//! [`Registry::cleanup`]: crate::Registry::cleanup

use std::fmt;

use thiserror::Error;

use crate::key::SlotKey;

/// Boxed error currency for caller-supplied setup, middleware and release
/// functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure raised by [`Registry::resolve`](crate::Registry::resolve) or
/// collected during [`Registry::cleanup`](crate::Registry::cleanup).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The resolved key has no registered slot. Fatal to the resolve call.
    #[error("dependency not found: {0}")]
    NotFound(SlotKey),

    /// The slot's setup (or a middleware layer) returned an error. Fatal to
    /// the resolve call; the slot keeps its state and may be retried.
    #[error("setup dependency {key}: {source}")]
    Setup {
        key: SlotKey,
        #[source]
        source: BoxError,
    },

    /// A release function failed while the cleanup stack was draining.
    /// Non-fatal: draining continues. Displays as the release function's own
    /// message, unwrapped.
    #[error(transparent)]
    Cleanup(BoxError),
}

/// Every error the registry collected over its life, joined for reporting.
///
/// Messages appear one per line in the order collected: fatal resolve
/// failures first (in occurrence order), then cleanup failures in
/// stack-drain order.
#[derive(Debug, Clone)]
pub struct CleanupReport(Vec<String>);

impl CleanupReport {
    pub(crate) fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    /// The collected messages, in order.
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

impl std::error::Error for CleanupReport {}
