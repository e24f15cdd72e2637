use crate::domain::entities::{Notice, Session, Template};
use crate::domain::ports::TemplateApi;
use crate::events::EventBus;
use crate::services::action_panel::{share_url, ActionPanel, SHARE_COPIED_NOTICE};
use crate::services::entitlement_store::{
    EntitlementSnapshot, EntitlementStore, SharedStore, StoreHandle,
};
use crate::services::mutation_controller::{MutationController, MutationOutcome};
use crate::services::payment_bridge::PaymentUi;
use crate::services::status_fetcher::StatusFetcher;
use std::sync::Arc;

/// Collaborators shared by every mounted template view
#[derive(Clone)]
pub struct TrackerDeps {
    pub api: Arc<dyn TemplateApi>,
    pub payment_ui: Arc<dyn PaymentUi>,
    pub events: EventBus,
}

/// One mounted template-detail view.
///
/// Owns the entitlement store; dropping the tracker unmounts the view and any
/// request still in flight discards its result.
pub struct EntitlementTracker {
    store: SharedStore,
    session: Session,
    fetcher: StatusFetcher,
    controller: MutationController,
    events: EventBus,
}

impl EntitlementTracker {
    pub fn mount(template: Template, session: Session, deps: TrackerDeps) -> Self {
        let slug = template.slug.clone();
        let store = SharedStore::new(EntitlementStore::initialize(template));

        let fetcher = StatusFetcher::new(deps.api.clone(), deps.events.clone());
        let controller = MutationController::new(
            store.handle(),
            slug,
            session.clone(),
            deps.api,
            deps.payment_ui,
            deps.events.clone(),
        );

        Self {
            store,
            session,
            fetcher,
            controller,
            events: deps.events,
        }
    }

    /// Resolve the initial status; call once after mounting
    pub async fn load(&self) -> EntitlementSnapshot {
        self.refresh().await
    }

    /// Re-run the status lookups, e.g. to pick up an approved payment
    pub async fn refresh(&self) -> EntitlementSnapshot {
        self.store.update(|store| store.begin_loading());
        let handle = self.store.handle();
        self.fetcher
            .resolve(&self.session, &handle)
            .await
            .unwrap_or_else(|| self.store.snapshot())
    }

    pub fn snapshot(&self) -> EntitlementSnapshot {
        self.store.snapshot()
    }

    pub fn template(&self) -> Template {
        self.store.read(|store| store.template().clone())
    }

    pub fn handle(&self) -> StoreHandle {
        self.store.handle()
    }

    pub fn controller(&self) -> &MutationController {
        &self.controller
    }

    pub fn action_panel(&self) -> ActionPanel {
        self.store
            .read(|store| ActionPanel::build(store.template(), &store.snapshot()))
    }

    pub async fn get_template(&self) -> MutationOutcome {
        self.controller.get_template().await
    }

    pub async fn toggle_used(&self) -> MutationOutcome {
        self.controller.toggle_used().await
    }

    /// Build the public link for this template and confirm it to the user
    pub fn share(&self, public_origin: &str) -> String {
        let url = share_url(public_origin, self.controller.slug());
        self.events
            .notice(self.controller.slug(), Notice::success(SHARE_COPIED_NOTICE));
        url
    }
}
