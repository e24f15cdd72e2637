#![allow(dead_code)]

use async_trait::async_trait;
use juantap::domain::ports::TemplateApi;
use juantap::events::{EventBus, TrackerEvent};
use juantap::models::{BoughtTemplateRecord, SavedTemplateRecord, UsedTemplateRecord};
use juantap::services::{EntitlementTracker, PaymentRequest, PaymentUi, TrackerDeps};
use juantap::{ApiError, ApiResult, EntitlementStatus, Notice, Session, Template};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Semaphore};

pub const PREMIUM_SLUG: &str = "neon-portfolio";
pub const FREE_SLUG: &str = "minimal-card";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetTemplate,
    ListSaved,
    ListBought,
    ListUsed,
    Save,
    Unsave,
    MarkUsed,
    MarkUnused,
}

/// In-memory template backend with per-endpoint failures and hold gates
#[derive(Default)]
pub struct MockTemplateApi {
    templates: Mutex<HashMap<String, Template>>,
    saved: Mutex<Vec<SavedTemplateRecord>>,
    bought: Mutex<Vec<BoughtTemplateRecord>>,
    used: Mutex<Vec<UsedTemplateRecord>>,
    failures: Mutex<HashMap<Endpoint, ApiError>>,
    held: Mutex<HashMap<Endpoint, Arc<Semaphore>>>,
    calls: Mutex<Vec<(Endpoint, Option<String>)>>,
}

impl MockTemplateApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, template: Template) -> Self {
        self.templates
            .lock()
            .insert(template.slug.clone(), template);
        self
    }

    pub fn with_saved(self, slug: &str) -> Self {
        self.add_saved(slug);
        self
    }

    pub fn add_saved(&self, slug: &str) {
        self.saved.lock().push(SavedTemplateRecord::new(slug));
    }

    pub fn with_bought(self, slug: &str, status: EntitlementStatus) -> Self {
        self.add_bought(slug, status);
        self
    }

    pub fn add_bought(&self, slug: &str, status: EntitlementStatus) {
        self.bought
            .lock()
            .push(BoughtTemplateRecord::new(slug, status));
    }

    pub fn with_used(self, slug: &str) -> Self {
        self.used.lock().push(UsedTemplateRecord::new(slug));
        self
    }

    /// Make every call to `endpoint` fail with `error` until cleared
    pub fn fail(&self, endpoint: Endpoint, error: ApiError) {
        self.failures.lock().insert(endpoint, error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Park calls to `endpoint` until `release` is called
    pub fn hold(&self, endpoint: Endpoint) {
        self.held
            .lock()
            .insert(endpoint, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, endpoint: Endpoint) {
        if let Some(gate) = self.held.lock().get(&endpoint) {
            gate.add_permits(1);
        }
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(called, _)| *called == endpoint)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Wait until `endpoint` has been called `count` times
    pub async fn wait_for_calls(&self, endpoint: Endpoint, count: usize) {
        for _ in 0..1000 {
            if self.call_count(endpoint) >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("{:?} was not called {} times", endpoint, count);
    }

    async fn respond(&self, endpoint: Endpoint, session: &Session) -> ApiResult<()> {
        self.calls
            .lock()
            .push((endpoint, session.token().map(str::to_string)));

        let gate = self.held.lock().get(&endpoint).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .expect("mock gate closed")
                .forget();
        }

        if session.token().is_none() {
            return Err(ApiError::MissingCredential);
        }
        match self.failures.lock().get(&endpoint) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TemplateApi for MockTemplateApi {
    async fn get_template(&self, session: &Session, slug: &str) -> ApiResult<Template> {
        self.respond(Endpoint::GetTemplate, session).await?;
        self.templates
            .lock()
            .get(slug)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, "Template not found"))
    }

    async fn list_saved(&self, session: &Session) -> ApiResult<Vec<SavedTemplateRecord>> {
        self.respond(Endpoint::ListSaved, session).await?;
        Ok(self.saved.lock().clone())
    }

    async fn list_bought(&self, session: &Session) -> ApiResult<Vec<BoughtTemplateRecord>> {
        self.respond(Endpoint::ListBought, session).await?;
        Ok(self.bought.lock().clone())
    }

    async fn list_used(&self, session: &Session) -> ApiResult<Vec<UsedTemplateRecord>> {
        self.respond(Endpoint::ListUsed, session).await?;
        Ok(self.used.lock().clone())
    }

    async fn save(&self, session: &Session, _slug: &str) -> ApiResult<()> {
        self.respond(Endpoint::Save, session).await
    }

    async fn unsave(&self, session: &Session, _slug: &str) -> ApiResult<()> {
        self.respond(Endpoint::Unsave, session).await
    }

    async fn mark_used(&self, session: &Session, _slug: &str) -> ApiResult<()> {
        self.respond(Endpoint::MarkUsed, session).await
    }

    async fn mark_unused(&self, session: &Session, _slug: &str) -> ApiResult<()> {
        self.respond(Endpoint::MarkUnused, session).await
    }
}

/// Payment UI that keeps every request for the test to answer
#[derive(Default)]
pub struct RecordingPaymentUi {
    requests: Mutex<Vec<PaymentRequest>>,
    opened: Mutex<usize>,
}

impl RecordingPaymentUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        *self.opened.lock()
    }

    pub fn take_request(&self) -> PaymentRequest {
        self.requests
            .lock()
            .pop()
            .expect("payment UI was not opened")
    }
}

impl PaymentUi for RecordingPaymentUi {
    fn open(&self, request: PaymentRequest) {
        *self.opened.lock() += 1;
        self.requests.lock().push(request);
    }
}

pub fn premium_template() -> Template {
    Template::premium(PREMIUM_SLUG, "Neon Portfolio", 199.0).with_layout("portfolio")
}

pub fn free_template() -> Template {
    Template::free(FREE_SLUG, "Minimal Card").with_layout("card")
}

pub fn session() -> Session {
    Session::bearer("test-token")
}

pub fn deps(api: &Arc<MockTemplateApi>, payment_ui: &Arc<RecordingPaymentUi>) -> TrackerDeps {
    TrackerDeps {
        api: api.clone(),
        payment_ui: payment_ui.clone(),
        events: EventBus::new(64),
    }
}

/// Mount a view for `template` and wait for its status lookup
pub async fn mounted(
    template: Template,
    api: &Arc<MockTemplateApi>,
    payment_ui: &Arc<RecordingPaymentUi>,
) -> (EntitlementTracker, broadcast::Receiver<TrackerEvent>) {
    let deps = deps(api, payment_ui);
    let events = deps.events.subscribe();
    let tracker = EntitlementTracker::mount(template, session(), deps);
    tracker.load().await;
    (tracker, events)
}

pub fn drain(events: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

pub fn notices(events: &[TrackerEvent]) -> Vec<Notice> {
    events
        .iter()
        .filter_map(|event| match event {
            TrackerEvent::NoticeRaised { notice, .. } => Some(notice.clone()),
            _ => None,
        })
        .collect()
}
