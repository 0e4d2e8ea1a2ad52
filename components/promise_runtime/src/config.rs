//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// Configuration shared by an event loop and every promise created on its
/// microtask queue.
///
/// # Examples
///
/// ```
/// use promise_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig {
///     microtask_limit: None,
///     ..RuntimeConfig::default()
/// };
/// assert_eq!(config.max_adoption_depth, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of nested thenable adoptions before a promise is
    /// rejected with a `RangeError`
    pub max_adoption_depth: usize,
    /// Maximum microtasks drained in one checkpoint (`None` = unlimited)
    pub microtask_limit: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_adoption_depth: 256,
            microtask_limit: Some(1_000_000),
        }
    }
}
