//! Observability: runtime counters and the sink abstraction feeding them.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventState, RelationCounters};
pub use sink::{
    GlobalMetricsSink, LookupOutcome, MetricsEvent, MetricsSink, NoopMetricsSink, metrics_report,
    metrics_reset_all,
};
