//! Metrics sink boundary.
//!
//! Resolution and creation logic never touches `obs::metrics` directly;
//! every counter update flows through a `MetricsEvent` handed to a
//! `MetricsSink`.

use crate::{obs::metrics, types::RelationId};

///
/// LookupOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookupOutcome {
    Found,
    Gap,
    OutOfBounds,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Lookup {
        relation: RelationId,
        outcome: LookupOutcome,
    },
    CreateRaceLost {
        relation: RelationId,
    },
    CreateFailed {
        relation: RelationId,
    },
    PartitionsCreated {
        relation: RelationId,
        count: u64,
    },
    CacheLoad {
        relation: RelationId,
    },
    CacheInvalidate {
        relation: RelationId,
    },
    HashRoute {
        relation: RelationId,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default process-wide sink that writes into the global metrics state.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::Lookup { relation, outcome } => {
                metrics::with_state_mut(|m| {
                    match outcome {
                        LookupOutcome::Found => {
                            m.ops.lookups_found = m.ops.lookups_found.saturating_add(1);
                        }
                        LookupOutcome::Gap => {
                            m.ops.lookups_gap = m.ops.lookups_gap.saturating_add(1);
                        }
                        LookupOutcome::OutOfBounds => {
                            m.ops.lookups_out_of_bounds =
                                m.ops.lookups_out_of_bounds.saturating_add(1);
                        }
                    }

                    let entry = m.relations.entry(relation).or_default();
                    entry.lookups = entry.lookups.saturating_add(1);
                });
            }

            MetricsEvent::CreateRaceLost { relation } => {
                metrics::with_state_mut(|m| {
                    m.ops.create_races_lost = m.ops.create_races_lost.saturating_add(1);
                    let entry = m.relations.entry(relation).or_default();
                    entry.create_races_lost = entry.create_races_lost.saturating_add(1);
                });
            }

            MetricsEvent::CreateFailed { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.create_failures = m.ops.create_failures.saturating_add(1);
                });
            }

            MetricsEvent::PartitionsCreated { relation, count } => {
                metrics::with_state_mut(|m| {
                    m.ops.partitions_created = m.ops.partitions_created.saturating_add(count);
                    let entry = m.relations.entry(relation).or_default();
                    entry.partitions_created = entry.partitions_created.saturating_add(count);
                });
            }

            MetricsEvent::CacheLoad { relation } => {
                metrics::with_state_mut(|m| {
                    m.ops.cache_loads = m.ops.cache_loads.saturating_add(1);
                    let entry = m.relations.entry(relation).or_default();
                    entry.cache_loads = entry.cache_loads.saturating_add(1);
                });
            }

            MetricsEvent::CacheInvalidate { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.cache_invalidations = m.ops.cache_invalidations.saturating_add(1);
                });
            }

            MetricsEvent::HashRoute { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.hash_routes = m.ops.hash_routes.saturating_add(1);
                });
            }
        }
    }
}

///
/// NoopMetricsSink
/// Discards every event; installed when metrics are disabled.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _: MetricsEvent) {}
}

/// Snapshot the current global metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventState {
    metrics::report()
}

/// Reset all global metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}
