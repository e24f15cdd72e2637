use crate::domain::entities::{
    EntitlementStatus, Notice, Session, Transition, UsageStatus,
};
use crate::domain::errors::{ApiError, ApiResult, FailureKind};
use crate::domain::ports::TemplateApi;
use crate::events::{now, EventBus, TrackerEvent};
use crate::services::entitlement_store::{ActionClass, StoreHandle};
use crate::services::payment_bridge::{PaymentBridge, PaymentRequest, PaymentTicket, PaymentUi};
use crate::services::state_machine::{
    validate_transition, validate_usage_transition, TransitionError,
};
use std::future::Future;
use std::sync::Arc;

pub const ALREADY_OWNED_NOTICE: &str = "You already own this template.";
pub const PAYMENT_PENDING_NOTICE: &str = "Payment pending approval.";
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please log in again.";

/// Backend-confirmed status changes a user can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Save,
    Unsave,
    MarkUsed,
    MarkUnused,
}

impl MutationAction {
    pub fn class(self) -> ActionClass {
        match self {
            MutationAction::Save | MutationAction::Unsave => ActionClass::Saving,
            MutationAction::MarkUsed | MutationAction::MarkUnused => ActionClass::Usage,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MutationAction::Save => "save",
            MutationAction::Unsave => "unsave",
            MutationAction::MarkUsed => "mark_used",
            MutationAction::MarkUnused => "mark_unused",
        }
    }

    /// Human name used in rejection notices
    pub fn label(self) -> &'static str {
        match self {
            MutationAction::Save => "save",
            MutationAction::Unsave => "unsave",
            MutationAction::MarkUsed => "mark as used",
            MutationAction::MarkUnused => "mark as unused",
        }
    }

    fn target(self) -> Transition {
        match self {
            MutationAction::Save => Transition::Entitlement(EntitlementStatus::Saved),
            MutationAction::Unsave => Transition::Entitlement(EntitlementStatus::Free),
            MutationAction::MarkUsed => Transition::Usage(UsageStatus::Used),
            MutationAction::MarkUnused => Transition::Usage(UsageStatus::Unused),
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            MutationAction::Save => "Template saved!",
            MutationAction::Unsave => "Template removed from saved.",
            MutationAction::MarkUsed => "Template marked as used!",
            MutationAction::MarkUnused => "Template marked as unused.",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            MutationAction::Save => "Error saving template",
            MutationAction::Unsave => "Error removing template",
            MutationAction::MarkUsed => "Error marking template as used",
            MutationAction::MarkUnused => "Error marking template as unused",
        }
    }

    fn check(
        self,
        entitlement: EntitlementStatus,
        usage: UsageStatus,
    ) -> Result<(), TransitionError> {
        match self.target() {
            Transition::Entitlement(to) => validate_transition(entitlement, to),
            Transition::Usage(to) => validate_usage_transition(entitlement, usage, to),
        }
    }
}

/// Why an action was dropped without touching the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    StillLoading,
    AlreadyInFlight(ActionClass),
    AlreadyOwned,
    AlreadyApplied,
    NotEligible,
    InvalidTransition,
    NotPremium,
    ViewClosed,
}

impl From<TransitionError> for SkipReason {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyOwned => SkipReason::AlreadyOwned,
            TransitionError::NotEligible(_) => SkipReason::NotEligible,
            TransitionError::Unchanged(_) => SkipReason::AlreadyApplied,
            TransitionError::InvalidTransition { .. } => SkipReason::InvalidTransition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend confirmed the optimistic change
    Confirmed,
    /// The payment UI is open; the result arrives through the payment bridge
    AwaitingPayment,
    Skipped(SkipReason),
    /// The change was rolled back (or never applied, or superseded) and a
    /// notice raised
    Failed { kind: FailureKind, notice: Notice },
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MutationOutcome::Confirmed)
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            MutationOutcome::Failed { notice, .. } => Some(notice),
            _ => None,
        }
    }
}

enum Gate {
    Skip(SkipReason),
    NoCredential,
}

/// Executes user actions on one mounted template with optimistic updates.
///
/// Each action class (saving, usage, purchase) admits one request at a time;
/// different classes may overlap.
#[derive(Clone)]
pub struct MutationController {
    store: StoreHandle,
    slug: String,
    session: Session,
    api: Arc<dyn TemplateApi>,
    payment_ui: Arc<dyn PaymentUi>,
    events: EventBus,
}

impl MutationController {
    pub fn new(
        store: StoreHandle,
        slug: impl Into<String>,
        session: Session,
        api: Arc<dyn TemplateApi>,
        payment_ui: Arc<dyn PaymentUi>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            slug: slug.into(),
            session,
            api,
            payment_ui,
            events,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub async fn save(&self) -> MutationOutcome {
        self.optimistic(MutationAction::Save, self.api.save(&self.session, &self.slug))
            .await
    }

    pub async fn unsave(&self) -> MutationOutcome {
        self.optimistic(MutationAction::Unsave, self.api.unsave(&self.session, &self.slug))
            .await
    }

    pub async fn mark_used(&self) -> MutationOutcome {
        self.optimistic(
            MutationAction::MarkUsed,
            self.api.mark_used(&self.session, &self.slug),
        )
        .await
    }

    pub async fn mark_unused(&self) -> MutationOutcome {
        self.optimistic(
            MutationAction::MarkUnused,
            self.api.mark_unused(&self.session, &self.slug),
        )
        .await
    }

    pub async fn toggle_used(&self) -> MutationOutcome {
        match self.store.with(|store| store.usage()) {
            None => MutationOutcome::Skipped(SkipReason::ViewClosed),
            Some(UsageStatus::Used) => self.mark_unused().await,
            Some(UsageStatus::Unused) => self.mark_used().await,
        }
    }

    /// Primary button: purchase premium templates, toggle saving for free ones
    pub async fn get_template(&self) -> MutationOutcome {
        let current = self
            .store
            .with(|store| (store.template().is_premium(), store.entitlement()));

        match current {
            None => MutationOutcome::Skipped(SkipReason::ViewClosed),
            Some((true, _)) => self.purchase_initiated(),
            Some((false, Some(EntitlementStatus::Saved))) => self.unsave().await,
            Some((false, _)) => self.save().await,
        }
    }

    /// Open the payment UI. Never calls the backend; `Bought` is only reached
    /// through the payment bridge.
    pub fn purchase_initiated(&self) -> MutationOutcome {
        let authenticated = self.session.is_authenticated();
        let gate = self.store.with(|store| {
            if !store.template().is_premium() {
                return Err(Gate::Skip(SkipReason::NotPremium));
            }
            let entitlement = match (store.is_loading(), store.entitlement()) {
                (false, Some(entitlement)) => entitlement,
                _ => return Err(Gate::Skip(SkipReason::StillLoading)),
            };
            if entitlement == EntitlementStatus::Bought {
                return Err(Gate::Skip(SkipReason::AlreadyOwned));
            }
            if !authenticated {
                return Err(Gate::NoCredential);
            }
            if !store.try_begin(ActionClass::Purchase) {
                return Err(Gate::Skip(SkipReason::AlreadyInFlight(ActionClass::Purchase)));
            }
            store.set_payment_ui_open(true);
            Ok((store.template().clone(), entitlement))
        });

        let (template, entitlement) = match gate {
            None => return MutationOutcome::Skipped(SkipReason::ViewClosed),
            Some(Err(Gate::NoCredential)) => {
                return self.fail(MutationActionLabel::Purchase, ApiError::MissingCredential)
            }
            Some(Err(Gate::Skip(SkipReason::AlreadyOwned))) => {
                self.events.notice(&self.slug, Notice::info(ALREADY_OWNED_NOTICE));
                return MutationOutcome::Skipped(SkipReason::AlreadyOwned);
            }
            Some(Err(Gate::Skip(reason))) => return self.skipped("purchase", reason),
            Some(Ok(opened)) => opened,
        };

        if entitlement == EntitlementStatus::Pending {
            self.events.notice(&self.slug, Notice::info(PAYMENT_PENDING_NOTICE));
        }

        tracing::info!("Opening payment UI for template {}", self.slug);
        self.events.publish(TrackerEvent::PaymentUiOpened {
            slug: self.slug.clone(),
            timestamp: now(),
        });

        let bridge = PaymentBridge::new(self.store.clone(), self.events.clone(), self.slug.clone());
        self.payment_ui.open(PaymentRequest {
            template,
            ticket: PaymentTicket::new(bridge),
        });

        MutationOutcome::AwaitingPayment
    }

    /// Apply `action`'s transition now, run `request`, keep the change on
    /// success and restore the pre-optimistic value on failure.
    async fn optimistic<F>(&self, action: MutationAction, request: F) -> MutationOutcome
    where
        F: Future<Output = ApiResult<()>>,
    {
        let authenticated = self.session.is_authenticated();
        let forward = action.target();

        let gate = self.store.with(|store| {
            let entitlement = match (store.is_loading(), store.entitlement()) {
                (false, Some(entitlement)) => entitlement,
                _ => return Err(Gate::Skip(SkipReason::StillLoading)),
            };
            action
                .check(entitlement, store.usage())
                .map_err(|e| Gate::Skip(e.into()))?;
            if !authenticated {
                return Err(Gate::NoCredential);
            }
            if !store.try_begin(action.class()) {
                return Err(Gate::Skip(SkipReason::AlreadyInFlight(action.class())));
            }
            Ok(store.transition(forward))
        });

        let reverse = match gate {
            None => return MutationOutcome::Skipped(SkipReason::ViewClosed),
            Some(Err(Gate::NoCredential)) => {
                return self.fail(MutationActionLabel::Action(action), ApiError::MissingCredential)
            }
            Some(Err(Gate::Skip(reason))) => return self.skipped(action.as_str(), reason),
            Some(Ok(reverse)) => reverse,
        };
        self.publish_change(reverse, forward);

        let result = request.await;

        let settled = self.store.with(|store| {
            store.finish(action.class());
            result.is_err() && store.revert(forward, reverse)
        });
        let Some(rolled_back) = settled else {
            tracing::debug!(
                "Discarding {} completion for unmounted template {}",
                action.as_str(),
                self.slug
            );
            return MutationOutcome::Skipped(SkipReason::ViewClosed);
        };

        match result {
            Ok(()) => {
                tracing::info!("Template {}: {} confirmed", self.slug, action.as_str());
                metrics::counter!(
                    "juantap_mutations_total",
                    "action" => action.as_str(),
                    "outcome" => "confirmed"
                )
                .increment(1);
                self.events
                    .notice(&self.slug, Notice::success(action.success_message()));
                MutationOutcome::Confirmed
            }
            Err(e) if rolled_back => {
                tracing::warn!(
                    "Template {}: {} failed, rolled back: {}",
                    self.slug,
                    action.as_str(),
                    e
                );
                self.publish_change(forward, reverse);
                self.fail(MutationActionLabel::Action(action), e)
            }
            Err(e) => {
                tracing::warn!(
                    "Template {}: {} failed after the status changed elsewhere, keeping it: {}",
                    self.slug,
                    action.as_str(),
                    e
                );
                self.fail(MutationActionLabel::Action(action), e)
            }
        }
    }

    fn skipped(&self, action: &str, reason: SkipReason) -> MutationOutcome {
        tracing::debug!("Template {}: {} skipped ({:?})", self.slug, action, reason);
        MutationOutcome::Skipped(reason)
    }

    fn fail(&self, action: MutationActionLabel, err: ApiError) -> MutationOutcome {
        let kind = err.failure_kind();
        let notice = match kind {
            FailureKind::SessionExpired => {
                self.events.publish(TrackerEvent::SessionExpired {
                    slug: self.slug.clone(),
                    timestamp: now(),
                });
                Notice::error(SESSION_EXPIRED_NOTICE)
            }
            FailureKind::Retryable => {
                Notice::retryable(format!("{}; please try again", action.failure_message()))
            }
            FailureKind::NonRetryable => Notice::error(format!(
                "{}: the server rejected the {} request ({})",
                action.failure_message(),
                action.label(),
                err
            )),
        };

        metrics::counter!(
            "juantap_mutations_total",
            "action" => action.as_str(),
            "outcome" => "failed"
        )
        .increment(1);
        self.events.notice(&self.slug, notice.clone());

        MutationOutcome::Failed { kind, notice }
    }

    fn publish_change(&self, from: Transition, to: Transition) {
        let event = match (from, to) {
            (Transition::Entitlement(old), Transition::Entitlement(new)) => {
                TrackerEvent::EntitlementChanged {
                    slug: self.slug.clone(),
                    old: Some(old),
                    new,
                    timestamp: now(),
                }
            }
            (Transition::Usage(old), Transition::Usage(new)) => TrackerEvent::UsageChanged {
                slug: self.slug.clone(),
                old,
                new,
                timestamp: now(),
            },
            _ => return,
        };
        self.events.publish(event);
    }
}

#[derive(Clone, Copy)]
enum MutationActionLabel {
    Action(MutationAction),
    Purchase,
}

impl MutationActionLabel {
    fn as_str(self) -> &'static str {
        match self {
            MutationActionLabel::Action(action) => action.as_str(),
            MutationActionLabel::Purchase => "purchase",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MutationActionLabel::Action(action) => action.label(),
            MutationActionLabel::Purchase => "purchase",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            MutationActionLabel::Action(action) => action.failure_message(),
            MutationActionLabel::Purchase => "Error starting purchase",
        }
    }
}
