use crate::domain::entities::Session;
use crate::domain::errors::ApiResult;
use crate::domain::ports::TemplateApi;
use crate::events::{now, EventBus, Lookup, TrackerEvent};
use crate::services::entitlement_store::{EntitlementSnapshot, FetchResult, StoreHandle};
use std::sync::Arc;

/// Resolves the true entitlement and usage state when a template view mounts
#[derive(Clone)]
pub struct StatusFetcher {
    api: Arc<dyn TemplateApi>,
    events: EventBus,
}

impl StatusFetcher {
    pub fn new(api: Arc<dyn TemplateApi>, events: EventBus) -> Self {
        Self { api, events }
    }

    /// Issue the three lookups together and wait for all of them to settle.
    ///
    /// A failed lookup becomes `None` and never cancels the other two.
    pub async fn lookup(&self, session: &Session) -> FetchResult {
        let (saved, bought, used) = futures::future::join3(
            self.api.list_saved(session),
            self.api.list_bought(session),
            self.api.list_used(session),
        )
        .await;

        FetchResult {
            saved: settle(Lookup::Saved, saved),
            bought: settle(Lookup::Bought, bought),
            used: settle(Lookup::Used, used),
        }
    }

    /// Look up and fold the result into the store behind `handle`.
    ///
    /// Returns `None` when the view was unmounted before the lookups settled.
    pub async fn resolve(
        &self,
        session: &Session,
        handle: &StoreHandle,
    ) -> Option<EntitlementSnapshot> {
        let result = self.lookup(session).await;
        let failed_lookups = result.failed_lookups();

        let applied = handle.with(|store| {
            let previous = store.entitlement();
            let (entitlement, usage) = store.apply_fetch_result(&result);
            (store.slug().to_string(), previous, entitlement, usage, store.snapshot())
        });

        let Some((slug, previous, entitlement, usage, snapshot)) = applied else {
            tracing::debug!("Discarding status lookup for an unmounted template view");
            return None;
        };

        if !failed_lookups.is_empty() {
            tracing::warn!(
                "Status for template {} resolved with degraded lookups: {:?}",
                slug,
                failed_lookups
            );
        }

        tracing::info!(
            "Resolved template {} as {} / {}",
            slug,
            entitlement,
            usage
        );

        if previous != Some(entitlement) {
            self.events.publish(TrackerEvent::EntitlementChanged {
                slug: slug.clone(),
                old: previous,
                new: entitlement,
                timestamp: now(),
            });
        }

        self.events.publish(TrackerEvent::StatusResolved {
            slug,
            entitlement,
            usage,
            failed_lookups,
            timestamp: now(),
        });

        Some(snapshot)
    }
}

fn settle<T>(lookup: Lookup, result: ApiResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Lookup of {} templates failed: {}", lookup.as_str(), e);
            metrics::counter!("juantap_lookup_failures_total", "lookup" => lookup.as_str())
                .increment(1);
            None
        }
    }
}
