use crate::domain::entities::{EntitlementStatus, Notice, UsageStatus};
use tokio::sync::broadcast;

/// Which of the three status lookups a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Saved,
    Bought,
    Used,
}

impl Lookup {
    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::Saved => "saved",
            Lookup::Bought => "bought",
            Lookup::Used => "used",
        }
    }
}

/// Events emitted while a template view is mounted
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    StatusResolved {
        slug: String,
        entitlement: EntitlementStatus,
        usage: UsageStatus,
        failed_lookups: Vec<Lookup>,
        timestamp: String, // ISO 8601
    },
    EntitlementChanged {
        slug: String,
        old: Option<EntitlementStatus>,
        new: EntitlementStatus,
        timestamp: String, // ISO 8601
    },
    UsageChanged {
        slug: String,
        old: UsageStatus,
        new: UsageStatus,
        timestamp: String, // ISO 8601
    },
    NoticeRaised {
        slug: String,
        notice: Notice,
        timestamp: String, // ISO 8601
    },
    SessionExpired {
        slug: String,
        timestamp: String, // ISO 8601
    },
    PaymentUiOpened {
        slug: String,
        timestamp: String, // ISO 8601
    },
    PaymentUiClosed {
        slug: String,
        completed: bool,
        timestamp: String, // ISO 8601
    },
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Event bus for publishing and subscribing to tracker events
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<TrackerEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget)
    pub fn publish(&self, event: TrackerEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("Event dropped, no subscribers: {:?}", e.0);
        }
    }

    pub fn notice(&self, slug: &str, notice: Notice) {
        self.publish(TrackerEvent::NoticeRaised {
            slug: slug.to_string(),
            notice,
            timestamp: now(),
        });
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
