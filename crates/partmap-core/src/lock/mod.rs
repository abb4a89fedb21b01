//! Named per-relation locks guarding directory edits.
//!
//! Every relation owns two exclusive locks: `Metadata` and `StructuralEdit`.
//! They are always taken in that order, and the only way to take them is
//! `LockManager::lock_for_edit`, so no call site can invert the order.


use crate::types::RelationId;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::{collections::HashMap, fmt, sync::Arc};

///
/// LockKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LockKind {
    Metadata,
    StructuralEdit,
}

type NamedLock = Arc<Mutex<()>>;

///
/// LockManager
///
/// Lazily allocates one mutex per `(relation, kind)` and hands out scoped
/// edit guards.
///

#[derive(Debug, Default)]
pub struct LockManager {
    locks: Mutex<HashMap<(RelationId, LockKind), NamedLock>>,
}

impl LockManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until both edit locks of `relation` are held.
    ///
    /// Acquisition order is metadata, then structural-edit. Dropping the
    /// guard releases both, on every exit path including unwinding.
    #[must_use]
    pub fn lock_for_edit(&self, relation: RelationId) -> EditGuard {
        let metadata = self.named(relation, LockKind::Metadata).lock_arc();
        let edit = self.named(relation, LockKind::StructuralEdit).lock_arc();

        EditGuard {
            relation,
            _edit: edit,
            _metadata: metadata,
        }
    }

    /// Whether `(relation, kind)` is currently held by anyone.
    #[must_use]
    pub fn is_locked(&self, relation: RelationId, kind: LockKind) -> bool {
        self.locks
            .lock()
            .get(&(relation, kind))
            .is_some_and(|lock| lock.is_locked())
    }

    /// Drop idle lock slots for `relation`. Slots that are held or waited
    /// on stay registered, so later callers still contend on them.
    pub fn forget(&self, relation: RelationId) {
        self.locks
            .lock()
            .retain(|(rel, _), lock| *rel != relation || Arc::strong_count(lock) > 1);
    }

    fn named(&self, relation: RelationId, kind: LockKind) -> NamedLock {
        Arc::clone(self.locks.lock().entry((relation, kind)).or_default())
    }
}

///
/// EditGuard
///
/// Proof that the caller holds both edit locks of one relation.
/// Fields drop in declaration order, so the structural-edit lock is
/// released before the metadata lock.
///

pub struct EditGuard {
    relation: RelationId,
    _edit: ArcMutexGuard<RawMutex, ()>,
    _metadata: ArcMutexGuard<RawMutex, ()>,
}

impl EditGuard {
    #[must_use]
    pub const fn relation(&self) -> RelationId {
        self.relation
    }
}

impl fmt::Debug for EditGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditGuard")
            .field("relation", &self.relation)
            .finish_non_exhaustive()
    }
}
