use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::milestone::Milestone;

/// Every mutation of the record store produces an Event.
/// List views subscribe to re-pull their rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    MilestoneInserted { milestone: Milestone },
    MilestoneUpdated { milestone: Milestone },
    MilestoneDeleted { id: String },
    SettingChanged { key: String, value: bool },
    /// Another connection committed to the database file.
    ExternalChange,
}

impl StoreEvent {
    /// Id of the milestone this event is about, if any.
    pub fn milestone_id(&self) -> Option<&str> {
        match self {
            StoreEvent::MilestoneInserted { milestone } | StoreEvent::MilestoneUpdated { milestone } => {
                Some(&milestone.id)
            }
            StoreEvent::MilestoneDeleted { id } => Some(id),
            StoreEvent::SettingChanged { .. } | StoreEvent::ExternalChange => None,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<RefCell<dyn FnMut(&StoreEvent)>>;

/// Single-threaded list of change callbacks.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Callback)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: Callback = Rc::new(RefCell::new(callback));
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Call every subscriber in registration order.
    ///
    /// Callbacks may write to the store or change subscriptions. A callback
    /// that is already running does not see the events it causes, and one
    /// unsubscribed mid-notify is not called afterwards.
    pub fn notify(&self, event: &StoreEvent) {
        let snapshot: Vec<(SubscriptionId, Callback)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();
        for (id, callback) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(event),
                Err(_) => debug!(?id, "skipping re-entrant notification"),
            }
        }
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow().iter().any(|(sid, _)| *sid == id)
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
