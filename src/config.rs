//! Pool configuration options

use std::time::Duration;

/// Container name used when none is configured.
pub const DEFAULT_CONTAINER_NAME: &str = "Addressable Object Pool";

/// How `ensure_capacity` requests issued while the prefab is still loading
/// are resolved once the load completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeferredCapacity {
    /// Coalesce all pending requests into a single top-up to the largest
    /// requested capacity.
    #[default]
    TopUpToMax,

    /// Schedule one top-up per request. Each continuation runs in
    /// registration order against the free list as it is at that moment,
    /// so objects checked out between continuations are replaced again.
    PerRequest,
}

/// Configuration for prefab pool behavior
///
/// # Examples
///
/// ```
/// use addressable_pool::{DeferredCapacity, PoolConfiguration};
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_initial_capacity(8)
///     .with_max_pool_size(64)
///     .with_deferred_capacity(DeferredCapacity::PerRequest)
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.initial_capacity, 8);
/// assert_eq!(config.max_pool_size, Some(64));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfiguration {
    /// Objects to pre-instantiate when the pool is created
    pub initial_capacity: usize,

    /// Resolution of capacity requests made before the load completes
    pub deferred_capacity: DeferredCapacity,

    /// Upper bound on the free list for returned objects. Returns beyond it
    /// destroy the object; `ensure_capacity` is not capped.
    pub max_pool_size: Option<usize>,

    /// Timeout for async operations
    pub operation_timeout: Option<Duration>,

    /// Name given to the pool's container node
    pub container_name: String,

    /// Whether the container survives scene transitions
    pub persist_across_scenes: bool,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            deferred_capacity: DeferredCapacity::default(),
            max_pool_size: None,
            operation_timeout: Some(Duration::from_secs(30)),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            persist_across_scenes: true,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of objects pre-instantiated on creation
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set how capacity requests made while loading are resolved
    pub fn with_deferred_capacity(mut self, mode: DeferredCapacity) -> Self {
        self.deferred_capacity = mode;
        self
    }

    /// Bound the free list size
    ///
    /// # Examples
    ///
    /// ```
    /// use addressable_pool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_max_pool_size(50);
    ///
    /// assert_eq!(config.max_pool_size, Some(50));
    /// ```
    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set operation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Wait for loads without a deadline in async operations
    pub fn without_timeout(mut self) -> Self {
        self.operation_timeout = None;
        self
    }

    /// Set the container node name
    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    /// Set whether the container survives scene transitions
    pub fn with_persist_across_scenes(mut self, persist: bool) -> Self {
        self.persist_across_scenes = persist;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfiguration::default();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.deferred_capacity, DeferredCapacity::TopUpToMax);
        assert_eq!(config.max_pool_size, None);
        assert_eq!(config.container_name, DEFAULT_CONTAINER_NAME);
        assert!(config.persist_across_scenes);
    }

    #[test]
    fn test_without_timeout() {
        let config = PoolConfiguration::new()
            .with_timeout(Duration::from_millis(5))
            .without_timeout();
        assert!(config.operation_timeout.is_none());
    }
}
