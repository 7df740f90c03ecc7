//! The per-isolate execution state: call-depth tracking and symbol allocation.
//!
//! An [`Isolate`] is the single-threaded context every fundamental operation
//! runs in.  It owns the call-depth counter that bounds recursion through
//! proxies whose handler or prototype chains loop back on themselves.

use std::cell::Cell;

use tracing::warn;

use crate::config::IsolateConfig;
use crate::error::{UmbraError, UmbraResult};

/// A single-threaded engine instance.
///
/// Not `Sync`: the counters are plain [`Cell`]s.
#[derive(Debug)]
pub struct Isolate {
    config: IsolateConfig,
    call_depth: Cell<usize>,
    next_symbol: Cell<u64>,
}

impl Isolate {
    /// Creates an isolate with the default [`IsolateConfig`].
    pub fn new() -> Self {
        Self::with_config(IsolateConfig::default())
    }

    /// Creates an isolate with an explicit configuration.
    pub fn with_config(config: IsolateConfig) -> Self {
        Self {
            config: IsolateConfig::with_max_call_depth(config.max_call_depth),
            call_depth: Cell::new(0),
            next_symbol: Cell::new(1),
        }
    }

    /// Returns the isolate's configuration.
    pub fn config(&self) -> &IsolateConfig {
        &self.config
    }

    /// Returns the number of currently active [`CallDepthGuard`]s.
    pub fn call_depth(&self) -> usize {
        self.call_depth.get()
    }

    /// Enters one level of nesting.
    ///
    /// Fails with [`UmbraError::StackOverflow`] if the new depth would exceed
    /// `max_call_depth`; the counter is left unchanged in that case.
    pub fn enter(&self) -> UmbraResult<CallDepthGuard<'_>> {
        let depth = self.call_depth.get();
        if depth >= self.config.max_call_depth {
            warn!(
                domain = "isolate",
                kind = "call_depth_exceeded",
                depth,
                max_call_depth = self.config.max_call_depth,
                "call stack size limit exceeded"
            );
            return Err(UmbraError::StackOverflow);
        }
        self.call_depth.set(depth + 1);
        Ok(CallDepthGuard { isolate: self })
    }

    /// Allocates a fresh symbol descriptor.
    pub fn new_symbol(&self) -> u64 {
        let id = self.next_symbol.get();
        self.next_symbol.set(id + 1);
        id
    }
}

impl Default for Isolate {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token for one level of call depth; decrements the counter on drop.
#[must_use = "the depth is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CallDepthGuard<'a> {
    isolate: &'a Isolate,
}

impl Drop for CallDepthGuard<'_> {
    fn drop(&mut self) {
        let depth = self.isolate.call_depth.get();
        self.isolate.call_depth.set(depth.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_release() {
        let isolate = Isolate::new();
        {
            let _outer = isolate.enter().unwrap();
            let _inner = isolate.enter().unwrap();
            assert_eq!(isolate.call_depth(), 2);
        }
        assert_eq!(isolate.call_depth(), 0);
    }

    #[test]
    fn test_enter_fails_at_ceiling() {
        let isolate = Isolate::with_config(IsolateConfig::with_max_call_depth(2));
        let _a = isolate.enter().unwrap();
        let _b = isolate.enter().unwrap();
        assert!(matches!(isolate.enter(), Err(UmbraError::StackOverflow)));
        assert_eq!(isolate.call_depth(), 2);
    }

    #[test]
    fn test_guard_released_on_error_path() {
        fn recurse(isolate: &Isolate) -> UmbraResult<()> {
            let _guard = isolate.enter()?;
            recurse(isolate)
        }
        let isolate = Isolate::with_config(IsolateConfig::with_max_call_depth(16));
        assert!(matches!(recurse(&isolate), Err(UmbraError::StackOverflow)));
        assert_eq!(isolate.call_depth(), 0);
    }

    #[test]
    fn test_symbols_are_unique() {
        let isolate = Isolate::new();
        let a = isolate.new_symbol();
        let b = isolate.new_symbol();
        assert_ne!(a, b);
    }
}
