use common::error::{AppError, Res};
use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Checkout { price_id: String },
    Portal,
}

/// Billing requests in flight, at most one per user. Views read it to render
/// loading states; flows hold a `PendingGuard` for the duration of a request.
#[derive(Debug, Default)]
pub struct PendingActions {
    inner: DashMap<Uuid, PendingAction>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `action` as in flight, refusing a second one for the same user.
    pub fn begin(&self, user_id: Uuid, action: PendingAction) -> Res<PendingGuard<'_>> {
        match self.inner.entry(user_id) {
            Entry::Occupied(_) => Err(AppError::Conflict(
                "Another billing request is already in progress".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(action);
                Ok(PendingGuard {
                    pending: self,
                    user_id,
                })
            }
        }
    }

    pub fn current(&self, user_id: Uuid) -> Option<PendingAction> {
        self.inner.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Price whose checkout is being prepared for the user.
    pub fn pending_price(&self, user_id: Uuid) -> Option<String> {
        match self.current(user_id) {
            Some(PendingAction::Checkout { price_id }) => Some(price_id),
            _ => None,
        }
    }

    pub fn is_portal_pending(&self, user_id: Uuid) -> bool {
        self.current(user_id) == Some(PendingAction::Portal)
    }
}

/// Clears the pending entry when dropped, whatever way the request ended.
pub struct PendingGuard<'a> {
    pending: &'a PendingActions,
    user_id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.inner.remove(&self.user_id);
    }
}
