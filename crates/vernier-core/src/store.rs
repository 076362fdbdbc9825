//! Concurrency-safe create-or-fetch meter store
//!
//! One writer section guards the meter map, the insertion-order index, and
//! the synthetic-group index together, so multi-meter removal is
//! all-or-nothing for observers. Backend factories run outside the lock;
//! the losing side of an insert race discards its instance and adopts the
//! winner's.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{MeterError, MetricsResult};
use crate::id::{Id, MeterType};
use crate::instrument::Meter;

#[derive(Default)]
pub(crate) struct MeterStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    meters: HashMap<Id, Meter>,
    order: Vec<Id>,
    groups: HashMap<Id, Vec<Id>>,
}

impl StoreInner {
    fn remove_meter(&mut self, id: &Id) -> Option<Meter> {
        let removed = self.meters.remove(id)?;
        self.order.retain(|stored| stored != id);
        Some(removed)
    }
}

impl MeterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-path lookup under the final id. `Ok(None)` when absent; an
    /// error when the id is bound to a different kind.
    pub fn fetch(&self, id: &Id, requested: MeterType) -> MetricsResult<Option<Meter>> {
        let inner = self.inner.read();
        match inner.meters.get(id) {
            Some(meter) if meter.kind() == requested => Ok(Some(meter.clone())),
            Some(meter) => Err(MeterError::conflict(id.name(), meter.kind(), requested)),
            None => Ok(None),
        }
    }

    /// Check-and-insert under the final id. Returns the stored meter and
    /// whether this call stored it; a racer's instance wins over `meter`.
    pub fn insert_if_absent(&self, meter: Meter, requested: MeterType) -> MetricsResult<(Meter, bool)> {
        let mut inner = self.inner.write();
        let id = meter.id().clone();
        if let Some(existing) = inner.meters.get(&id) {
            if existing.kind() != requested {
                return Err(MeterError::conflict(id.name(), existing.kind(), requested));
            }
            return Ok((existing.clone(), false));
        }
        inner.meters.insert(id.clone(), meter.clone());
        inner.order.push(id);
        Ok((meter, true))
    }

    /// Record a synthetic parent -> children relation. If the parent was
    /// removed while its children were being composed, the children are
    /// removed instead of leaking.
    pub fn record_group(&self, parent: Id, children: Vec<Id>) {
        if children.is_empty() {
            return;
        }
        let mut inner = self.inner.write();
        if inner.meters.contains_key(&parent) {
            inner.groups.insert(parent, children);
        } else {
            for child in &children {
                inner.remove_meter(child);
            }
        }
    }

    /// Remove the meter stored under `id` along with any synthetic
    /// children, in one writer section.
    pub fn remove(&self, id: &Id) -> Option<Meter> {
        let mut inner = self.inner.write();
        let removed = inner.remove_meter(id)?;
        if let Some(children) = inner.groups.remove(id) {
            for child in &children {
                inner.remove_meter(child);
            }
        }
        Some(removed)
    }

    /// Snapshot of all meters in registration order
    pub fn meters(&self) -> Vec<Meter> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.meters.get(id).cloned())
            .collect()
    }

    /// Snapshot of meters whose id matches `predicate`, in registration
    /// order
    pub fn find_matching(&self, predicate: impl Fn(&Id) -> bool) -> Vec<Meter> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter(|id| predicate(id))
            .filter_map(|id| inner.meters.get(id).cloned())
            .collect()
    }

    /// Remove every meter and synthetic group; lifecycle state is not
    /// touched.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.meters.clear();
        inner.order.clear();
        inner.groups.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().meters.len()
    }
}
