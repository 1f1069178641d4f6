//! Metrics collection and export for prefab pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use addressable_pool::memory::{AssetRef, MemoryAssets, MemoryScene, Prefab};
/// use addressable_pool::{PoolConfiguration, PoolRegistry};
/// use std::sync::Arc;
///
/// let assets = Arc::new(MemoryAssets::new().with_auto_complete(true));
/// assets.insert("enemy", Prefab::new("Enemy"));
/// let registry = PoolRegistry::new(
///     assets,
///     Arc::new(MemoryScene::new()),
///     PoolConfiguration::default(),
/// );
///
/// let pool = registry.create_pool(&AssetRef::new("enemy")).unwrap();
/// let obj = pool.get_object(None).unwrap();
/// pool.return_object(obj);
///
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_instantiated, 1);
/// assert_eq!(metrics.total_returned, 1);
/// assert_eq!(metrics.available_objects, 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Objects handed out from the free list
    pub total_retrieved: usize,

    /// Objects freshly instantiated, for gets or capacity top-ups
    pub total_instantiated: usize,

    /// Objects returned to the free list
    pub total_returned: usize,

    /// Objects destroyed by the pool
    pub total_destroyed: usize,

    /// Capacity top-ups deferred until the prefab finished loading
    pub deferred_top_ups: usize,

    /// Current free list size
    pub available_objects: usize,

    /// Share of gets served from the free list (0.0 to 1.0)
    pub reuse_ratio: f64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_retrieved".to_string(), self.total_retrieved.to_string());
        metrics.insert("total_instantiated".to_string(), self.total_instantiated.to_string());
        metrics.insert("total_returned".to_string(), self.total_returned.to_string());
        metrics.insert("total_destroyed".to_string(), self.total_destroyed.to_string());
        metrics.insert("deferred_top_ups".to_string(), self.deferred_top_ups.to_string());
        metrics.insert("available_objects".to_string(), self.available_objects.to_string());
        metrics.insert("reuse_ratio".to_string(), format!("{:.2}", self.reuse_ratio));
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        // Gauge metrics
        Self::write_metric(
            &mut output,
            "prefabpool_objects_available",
            "gauge",
            "Objects in the free list",
            &labels,
            metrics.available_objects,
        );

        output.push_str("# HELP prefabpool_reuse_ratio Share of gets served from the free list\n");
        output.push_str("# TYPE prefabpool_reuse_ratio gauge\n");
        output.push_str(&format!(
            "prefabpool_reuse_ratio{{{}}} {:.2}\n",
            labels, metrics.reuse_ratio
        ));

        // Counter metrics
        Self::write_metric(
            &mut output,
            "prefabpool_objects_retrieved_total",
            "counter",
            "Objects retrieved from the free list",
            &labels,
            metrics.total_retrieved,
        );
        Self::write_metric(
            &mut output,
            "prefabpool_objects_instantiated_total",
            "counter",
            "Objects instantiated from the prefab",
            &labels,
            metrics.total_instantiated,
        );
        Self::write_metric(
            &mut output,
            "prefabpool_objects_returned_total",
            "counter",
            "Objects returned to the pool",
            &labels,
            metrics.total_returned,
        );
        Self::write_metric(
            &mut output,
            "prefabpool_objects_destroyed_total",
            "counter",
            "Objects destroyed by the pool",
            &labels,
            metrics.total_destroyed,
        );
        Self::write_metric(
            &mut output,
            "prefabpool_deferred_top_ups_total",
            "counter",
            "Capacity top-ups deferred until load completion",
            &labels,
            metrics.deferred_top_ups,
        );

        output
    }

    fn write_metric(
        output: &mut String,
        name: &str,
        kind: &str,
        help: &str,
        labels: &str,
        value: usize,
    ) {
        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} {}\n", name, kind));
        output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut keys: Vec<_> = tags.keys().collect();
            keys.sort();
            for key in keys {
                labels.push(format!("{}=\"{}\"", key, tags[key]));
            }
        }

        labels.join(",")
    }
}

/// Internal metrics tracker
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub total_retrieved: AtomicUsize,
    pub total_instantiated: AtomicUsize,
    pub total_returned: AtomicUsize,
    pub total_destroyed: AtomicUsize,
    pub deferred_top_ups: AtomicUsize,
    gets_instantiated: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_retrieved(&self) {
        self.total_retrieved.fetch_add(1, Ordering::Relaxed);
    }

    /// An object was instantiated; `for_get` is false for capacity top-ups.
    pub fn record_instantiated(&self, for_get: bool) {
        self.total_instantiated.fetch_add(1, Ordering::Relaxed);
        if for_get {
            self.gets_instantiated.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_returned(&self) {
        self.total_returned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_destroyed(&self, count: usize) {
        self.total_destroyed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_deferred(&self) {
        self.deferred_top_ups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, available: usize) -> PoolMetrics {
        let retrieved = self.total_retrieved.load(Ordering::Relaxed);
        let fresh = self.gets_instantiated.load(Ordering::Relaxed);
        let gets = retrieved + fresh;
        let reuse_ratio = if gets > 0 {
            retrieved as f64 / gets as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_retrieved: retrieved,
            total_instantiated: self.total_instantiated.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            total_destroyed: self.total_destroyed.load(Ordering::Relaxed),
            deferred_top_ups: self.deferred_top_ups.load(Ordering::Relaxed),
            available_objects: available,
            reuse_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuse_ratio() {
        let tracker = MetricsTracker::new();
        tracker.record_instantiated(false);
        tracker.record_instantiated(true);
        tracker.record_retrieved();
        tracker.record_retrieved();
        tracker.record_retrieved();

        let metrics = tracker.get_metrics(0);
        assert_eq!(metrics.total_instantiated, 2);
        assert!((metrics.reuse_ratio - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prometheus_labels_are_sorted() {
        let metrics = MetricsTracker::new().get_metrics(4);
        let mut tags = HashMap::new();
        tags.insert("scene".to_string(), "arena".to_string());
        tags.insert("kind".to_string(), "enemy".to_string());

        let output = MetricsExporter::export_prometheus(&metrics, "enemies", Some(&tags));
        assert!(output.contains(
            "prefabpool_objects_available{pool=\"enemies\",kind=\"enemy\",scene=\"arena\"} 4"
        ));
        assert!(output.contains("# TYPE prefabpool_objects_returned_total counter"));
    }
}
