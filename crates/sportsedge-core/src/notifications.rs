//! In-app notification dispatch.
//!
//! The [`NotificationCenter`] owns the list of active messages and the
//! listeners interested in it. It is created by the host and passed to
//! whatever needs to raise a toast; nothing here is process-global.
//!
//! There are no timers: expiry happens when the caller invokes
//! [`NotificationCenter::tick`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::Event;
use crate::storage::NotificationsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A message currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl Notification {
    /// `None` when the duration runs past the representable range; such a
    /// notification never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.duration_ms).ok()?;
        let duration = Duration::try_milliseconds(millis)?;
        self.created_at.checked_add_signed(duration)
    }

    /// User-facing toast for an event, if the event warrants one.
    pub fn from_event(event: &Event, duration_ms: u64) -> Option<Self> {
        let (kind, title, message) = match event {
            Event::MilestoneUnlocked { milestone, .. } => (
                NotificationKind::Success,
                "Reward unlocked".to_string(),
                format!(
                    "{} referrals: {}",
                    milestone.count,
                    milestone.reward.describe()
                ),
            ),
            Event::PremiumFallback { .. } => (
                NotificationKind::Warning,
                "Subscription check failed".to_string(),
                "Premium picks are hidden until your subscription can be verified.".to_string(),
            ),
            Event::RewardFallback { .. } => (
                NotificationKind::Info,
                "Rewards".to_string(),
                "Showing the standard reward schedule.".to_string(),
            ),
            Event::AccessEvaluated { .. } if event.is_locked_out() => (
                NotificationKind::Info,
                "Daily limit reached".to_string(),
                "Upgrade to premium for unlimited picks.".to_string(),
            ),
            _ => return None,
        };

        Some(Self {
            id: Uuid::new_v4(),
            kind,
            title,
            message,
            created_at: event.at(),
            duration_ms,
        })
    }
}

/// Handle returned by [`NotificationCenter::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&[Notification]) + Send + Sync>;

/// Owns active notifications and fans changes out to listeners.
pub struct NotificationCenter {
    settings: NotificationsConfig,
    active: Vec<Notification>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("settings", &self.settings)
            .field("active", &self.active)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NotificationCenter {
    pub fn new(settings: NotificationsConfig) -> Self {
        Self {
            settings,
            active: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Register a listener. It is called with the full active list after
    /// every change.
    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&[Notification]) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the listener was already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    /// Show a message with the default duration.
    pub fn show(&mut self, kind: NotificationKind, title: &str, message: &str) -> Uuid {
        self.push(Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
            duration_ms: self.settings.default_duration_ms,
        })
    }

    /// Show the toast for an event, if any.
    pub fn notify_event(&mut self, event: &Event) -> Option<Uuid> {
        let notification = Notification::from_event(event, self.settings.default_duration_ms)?;
        Some(self.push(notification))
    }

    /// Add a notification, evicting the oldest beyond `max_active`.
    pub fn push(&mut self, notification: Notification) -> Uuid {
        let id = notification.id;
        self.active.push(notification);
        let max = self.settings.max_active.max(1);
        if self.active.len() > max {
            let overflow = self.active.len() - max;
            self.active.drain(..overflow);
        }
        self.emit();
        id
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        let removed = self.active.len() != before;
        if removed {
            self.emit();
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.active.is_empty() {
            self.active.clear();
            self.emit();
        }
    }

    /// Drop expired notifications. Returns how many were removed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.active.len();
        self.active
            .retain(|n| n.expires_at().map_or(true, |expires| expires > now));
        let removed = before - self.active.len();
        if removed > 0 {
            self.emit();
        }
        removed
    }

    fn emit(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::{ReferralMilestone, Reward};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn center(max_active: usize) -> NotificationCenter {
        NotificationCenter::new(NotificationsConfig {
            default_duration_ms: 3000,
            max_active,
        })
    }

    #[test]
    fn listeners_receive_active_list() {
        let mut center = center(3);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        center.add_listener(move |active| {
            sink.lock().unwrap().push(active.len());
        });

        let id = center.show(NotificationKind::Info, "Hi", "there");
        center.dismiss(id);

        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let mut center = center(3);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = center.add_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        center.show(NotificationKind::Info, "a", "b");
        assert!(center.remove_listener(id));
        assert!(!center.remove_listener(id));
        center.show(NotificationKind::Info, "c", "d");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(center.listener_count(), 0);
    }

    #[test]
    fn evicts_oldest_beyond_max_active() {
        let mut center = center(2);
        center.show(NotificationKind::Info, "1", "");
        center.show(NotificationKind::Info, "2", "");
        center.show(NotificationKind::Info, "3", "");
        let titles: Vec<&str> = center.active().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["2", "3"]);
    }

    #[test]
    fn tick_expires_old_messages() {
        let mut center = center(3);
        let id = center.show(NotificationKind::Success, "done", "");
        let created = center.active()[0].created_at;

        assert_eq!(center.tick(created + Duration::milliseconds(2999)), 0);
        assert_eq!(center.tick(created + Duration::milliseconds(3000)), 1);
        assert!(!center.dismiss(id));
    }

    #[test]
    fn out_of_range_duration_never_expires() {
        let mut center = NotificationCenter::new(NotificationsConfig {
            default_duration_ms: 9_000_000_000_000_000,
            max_active: 3,
        });
        center.show(NotificationKind::Info, "sticky", "");
        assert!(center.active()[0].expires_at().is_none());

        assert_eq!(center.tick(Utc::now() + Duration::days(365)), 0);
        assert_eq!(center.active().len(), 1);
    }

    #[test]
    fn milestone_event_becomes_success_toast() {
        let mut center = center(3);
        let event = Event::MilestoneUnlocked {
            milestone: ReferralMilestone::new(5, Reward::PremiumTrial { days: 30 }),
            referrals: 5,
            at: Utc::now(),
        };
        assert!(center.notify_event(&event).is_some());
        let toast = &center.active()[0];
        assert_eq!(toast.kind, NotificationKind::Success);
        assert_eq!(toast.message, "5 referrals: 30-day premium trial");
    }

    #[test]
    fn routine_events_are_silent() {
        let event = Event::FreeUseRecorded {
            user_id: None,
            remaining_uses: 0,
            at: Utc::now(),
        };
        assert!(Notification::from_event(&event, 1000).is_none());
    }
}
