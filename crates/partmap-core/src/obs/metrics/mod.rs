use crate::types::RelationId;
use parking_lot::{Mutex, const_mutex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// EventState
/// Ephemeral, in-memory counters for partition resolution and creation.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub relations: BTreeMap<RelationId, RelationCounters>,
}

impl EventState {
    const fn new() -> Self {
        Self {
            ops: EventOps::new(),
            relations: BTreeMap::new(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Lookups by outcome
    pub lookups_found: u64,
    pub lookups_gap: u64,
    pub lookups_out_of_bounds: u64,

    // Creation protocol
    pub create_races_lost: u64,
    pub create_failures: u64,
    pub partitions_created: u64,

    // Relation cache
    pub cache_loads: u64,
    pub cache_invalidations: u64,

    // Hash routing
    pub hash_routes: u64,
}

impl EventOps {
    const fn new() -> Self {
        Self {
            lookups_found: 0,
            lookups_gap: 0,
            lookups_out_of_bounds: 0,
            create_races_lost: 0,
            create_failures: 0,
            partitions_created: 0,
            cache_loads: 0,
            cache_invalidations: 0,
            hash_routes: 0,
        }
    }
}

///
/// RelationCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RelationCounters {
    pub lookups: u64,
    pub partitions_created: u64,
    pub create_races_lost: u64,
    pub cache_loads: u64,
}

static EVENT_STATE: Mutex<EventState> = const_mutex(EventState::new());

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    f(&EVENT_STATE.lock())
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Reset all counters (useful in tests).
pub fn reset_all() {
    with_state_mut(|m| *m = EventState::new());
}

/// Point-in-time copy of every counter.
#[must_use]
pub fn report() -> EventState {
    with_state(Clone::clone)
}
