//! Per-key serialization for the generator's check-then-insert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::period::YearMonth;

/// Identifies one template's instance slot for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodKey {
    /// Template id
    pub template_id: i64,
    /// Calendar month
    pub period: YearMonth,
}

impl PeriodKey {
    /// Key for `template_id` in `period`.
    #[must_use]
    pub const fn new(template_id: i64, period: YearMonth) -> Self {
        Self {
            template_id,
            period,
        }
    }
}

/// A set of async locks keyed by [`PeriodKey`].
///
/// Holding the guard for a key means no other generation attempt for the same
/// template and month can run its duplicate check until the guard drops.
#[derive(Debug, Default)]
pub struct PeriodLocks {
    slots: Mutex<HashMap<PeriodKey, Arc<AsyncMutex<()>>>>,
}

impl PeriodLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub async fn acquire(&self, key: PeriodKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only referenced by the map are idle.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no keys are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
