//! Isolate configuration.

use tracing::warn;

/// Environment variable that overrides [`IsolateConfig::max_call_depth`].
pub const MAX_CALL_DEPTH_ENV: &str = "UMBRA_MAX_CALL_DEPTH";

/// Default ceiling for nested proxy operations and function calls.
///
/// Every level of proxy recursion costs several native stack frames, so the
/// ceiling must trip well before the host thread's stack does.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Tunables for an [`Isolate`][crate::isolate::Isolate].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolateConfig {
    /// Maximum nesting of proxy fundamental operations and function calls
    /// before `StackOverflow` is raised.  Always at least 1.
    pub max_call_depth: usize,
}

impl Default for IsolateConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl IsolateConfig {
    /// Returns a config with the given call-depth ceiling; `0` is raised to 1.
    pub fn with_max_call_depth(max_call_depth: usize) -> Self {
        Self {
            max_call_depth: max_call_depth.max(1),
        }
    }

    /// Reads the config from the process environment.
    ///
    /// Unset variables keep their default.  Unparsable or zero values are
    /// reported with `warn!` and also fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_CALL_DEPTH_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => config.max_call_depth = depth,
                _ => warn!(
                    domain = "config",
                    kind = "invalid_value",
                    variable = MAX_CALL_DEPTH_ENV,
                    value = %raw,
                    default = DEFAULT_MAX_CALL_DEPTH,
                    "ignoring invalid call-depth ceiling"
                ),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth() {
        assert_eq!(IsolateConfig::default().max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn test_zero_depth_is_raised_to_one() {
        assert_eq!(IsolateConfig::with_max_call_depth(0).max_call_depth, 1);
    }

    #[test]
    fn test_lookup_overrides_default() {
        let config = IsolateConfig::from_lookup(|_| Some("64".to_string()));
        assert_eq!(config.max_call_depth, 64);
    }

    #[test]
    fn test_lookup_rejects_garbage_and_zero() {
        let config = IsolateConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(config, IsolateConfig::default());
        let config = IsolateConfig::from_lookup(|_| Some("0".to_string()));
        assert_eq!(config, IsolateConfig::default());
    }

    #[test]
    fn test_lookup_unset_keeps_default() {
        assert_eq!(IsolateConfig::from_lookup(|_| None), IsolateConfig::default());
    }
}
