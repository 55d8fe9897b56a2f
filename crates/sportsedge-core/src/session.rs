//! Per-screen sessions tying lookups, gating and rewards together.
//!
//! An [`AccessSession`] belongs to one mounted view. Lookups are async and
//! may resolve after the view is gone; results are only applied while the
//! session is mounted and only for the most recent refresh.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::access::{
    self, AccessLimits, GateInput, Presentation, UserAccessState,
};
use crate::error::ServiceError;
use crate::events::Event;
use crate::rewards::{MilestoneSchedule, ReferralMilestone, RewardProgress};
use crate::services::{
    resolve_premium, resolve_schedule, resolve_view_count, Resolution, RewardStructureProvider,
    SubscriptionLookup, ViewCounter,
};

/// Shared mount flag. Hand a clone to whatever tears the view down.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Identifies one refresh; only the latest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Result of one lookup round, not yet applied.
#[derive(Debug, Clone)]
pub struct AccessLookup {
    pub state: UserAccessState,
    pub events: Vec<Event>,
}

pub struct AccessSession<S, V> {
    subscription: S,
    counter: V,
    limits: AccessLimits,
    user_id: Option<String>,
    /// Counter key for anonymous users (device id), if tracked.
    anonymous_subject: Option<String>,
    state: Option<UserAccessState>,
    generation: u64,
    mounted: MountHandle,
    events: Vec<Event>,
}

impl<S, V> std::fmt::Debug for AccessSession<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessSession")
            .field("user_id", &self.user_id)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("mounted", &self.mounted.is_mounted())
            .finish_non_exhaustive()
    }
}

impl<S: SubscriptionLookup, V: ViewCounter> AccessSession<S, V> {
    pub fn new(subscription: S, counter: V, limits: AccessLimits, user_id: Option<String>) -> Self {
        Self {
            subscription,
            counter,
            limits,
            user_id,
            anonymous_subject: None,
            state: None,
            generation: 0,
            mounted: MountHandle(Arc::new(AtomicBool::new(true))),
            events: Vec::new(),
        }
    }

    /// Track anonymous free uses under `subject` (normally the device id).
    pub fn with_anonymous_subject(mut self, subject: Option<String>) -> Self {
        self.anonymous_subject = subject;
        self
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mounted.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_mounted()
    }

    /// Tear down the session; in-flight lookups will not be applied.
    pub fn close(&self) {
        self.mounted.unmount();
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Last applied state, if any lookup has completed.
    pub fn state(&self) -> Option<&UserAccessState> {
        self.state.as_ref()
    }

    fn subject(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.anonymous_subject.as_deref())
    }

    /// Start a refresh; any earlier ticket becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        RefreshTicket(self.generation)
    }

    /// Run the remote lookups. Never fails; see [`crate::services::resolve`].
    pub async fn lookup(&self) -> AccessLookup {
        let mut events = Vec::new();
        let premium = resolve_premium(&self.subscription, self.user_id.as_deref()).await;
        if let (Resolution::Fallback { reason }, Some(user_id)) = (&premium.resolution, &self.user_id) {
            events.push(Event::PremiumFallback {
                user_id: user_id.clone(),
                reason: reason.clone(),
                at: Utc::now(),
            });
        }

        let state = match (premium.value, self.subject()) {
            (true, _) => UserAccessState::new(self.user_id.clone(), true, 0, self.limits),
            (false, Some(subject)) => {
                let view = resolve_view_count(&self.counter, subject, self.limits).await;
                UserAccessState::from_view_count(self.user_id.clone(), false, &view.value)
            }
            (false, None) => UserAccessState::anonymous(self.limits),
        };

        AccessLookup { state, events }
    }

    /// Apply a lookup. Returns false if the session was unmounted or a newer
    /// refresh has started.
    pub fn apply(&mut self, ticket: RefreshTicket, lookup: AccessLookup) -> bool {
        if !self.is_mounted() || ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "discarding stale access lookup");
            return false;
        }
        self.state = Some(lookup.state);
        self.events.extend(lookup.events);
        true
    }

    /// Look up and apply in one step.
    pub async fn refresh(&mut self) -> Option<&UserAccessState> {
        let ticket = self.begin_refresh();
        let lookup = self.lookup().await;
        if self.apply(ticket, lookup) {
            self.state.as_ref()
        } else {
            None
        }
    }

    /// Current gate input. Before any lookup completes the user is treated
    /// as non-premium.
    pub fn gate_input(&self, ad_viewed: bool) -> GateInput {
        match &self.state {
            Some(state) => GateInput::from_state(state, ad_viewed),
            None => GateInput::from_state(
                &UserAccessState::new(self.user_id.clone(), false, 0, self.limits),
                ad_viewed,
            ),
        }
    }

    /// Presentation for a premium-gated list.
    pub fn present(&mut self, eligible_items: usize) -> Presentation {
        let input = self.gate_input(false);
        let presentation = access::present(eligible_items, &input);
        self.record_evaluation(presentation, input.remaining_uses);
        presentation
    }

    /// Presentation for the free daily pick.
    pub fn present_free_pick(&mut self, eligible_items: usize, ad_viewed: bool) -> Presentation {
        let input = self.gate_input(ad_viewed);
        let presentation = access::present_free_pick(eligible_items, &input);
        self.record_evaluation(presentation, input.remaining_uses);
        presentation
    }

    fn record_evaluation(&mut self, presentation: Presentation, remaining_uses: u32) {
        self.events.push(Event::AccessEvaluated {
            user_id: self.user_id.clone(),
            presentation,
            remaining_uses,
            at: Utc::now(),
        });
    }

    /// Count one free use. Returns remaining uses. Premium users are not
    /// counted.
    pub async fn consume_free_use(&mut self) -> Result<u32, ServiceError> {
        if self.state.as_ref().is_some_and(|s| s.has_premium) {
            return Ok(self.gate_input(false).remaining_uses);
        }

        let updated = match self.subject() {
            Some(subject) => {
                let view = self.counter.record_view(subject).await?;
                UserAccessState::from_view_count(self.user_id.clone(), false, &view)
            }
            None => {
                let mut state = self
                    .state
                    .clone()
                    .unwrap_or_else(|| UserAccessState::anonymous(self.limits));
                state.daily_free_use_count = state.daily_free_use_count.saturating_add(1);
                state
            }
        };

        let remaining = updated.remaining_uses();
        if self.is_mounted() {
            self.state = Some(updated);
            self.events.push(Event::FreeUseRecorded {
                user_id: self.user_id.clone(),
                remaining_uses: remaining,
                at: Utc::now(),
            });
        }
        Ok(remaining)
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// Referral progress for one session. The schedule is fixed once loaded.
#[derive(Debug, Clone)]
pub struct RewardSession {
    schedule: MilestoneSchedule,
    referrals: u32,
    events: Vec<Event>,
}

impl RewardSession {
    pub fn from_schedule(schedule: MilestoneSchedule, referrals: i64) -> Self {
        Self {
            schedule,
            referrals: clamp_referrals(referrals),
            events: Vec::new(),
        }
    }

    /// Load the schedule from `provider`, falling back to the default.
    pub async fn load<P: RewardStructureProvider>(
        provider: &P,
        user_id: Option<&str>,
        referrals: i64,
    ) -> Self {
        let resolved = resolve_schedule(provider, user_id).await;
        let mut session = Self::from_schedule(resolved.value, referrals);
        if let Resolution::Fallback { reason } = resolved.resolution {
            session.events.push(Event::RewardFallback {
                reason,
                at: Utc::now(),
            });
        }
        session
    }

    pub fn schedule(&self) -> &MilestoneSchedule {
        &self.schedule
    }

    pub fn referrals(&self) -> u32 {
        self.referrals
    }

    pub fn progress(&self) -> RewardProgress {
        self.schedule.progress(self.referrals as i64)
    }

    /// Update the referral count, returning milestones unlocked by it.
    pub fn set_referrals(&mut self, referrals: i64) -> Vec<ReferralMilestone> {
        let next = clamp_referrals(referrals);
        let unlocked: Vec<ReferralMilestone> = self
            .schedule
            .newly_unlocked(self.referrals, next)
            .into_iter()
            .cloned()
            .collect();

        let now = Utc::now();
        for milestone in &unlocked {
            tracing::info!(count = milestone.count, referrals = next, "referral milestone unlocked");
            self.events.push(Event::MilestoneUnlocked {
                milestone: milestone.clone(),
                referrals: next,
                at: now,
            });
        }
        self.referrals = next;
        unlocked
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

fn clamp_referrals(referrals: i64) -> u32 {
    referrals.clamp(0, u32::MAX as i64) as u32
}
