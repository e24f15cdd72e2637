use crate::domain::entities::{EntitlementStatus, Template, Transition, UsageStatus};
use crate::events::Lookup;
use crate::models::{BoughtTemplateRecord, SavedTemplateRecord, UsedTemplateRecord};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Groups of actions that share one in-flight slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    /// save / unsave
    Saving,
    /// mark used / mark unused
    Usage,
    /// payment UI open
    Purchase,
}

impl ActionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionClass::Saving => "saving",
            ActionClass::Usage => "usage",
            ActionClass::Purchase => "purchase",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    pub saving: bool,
    pub usage: bool,
    pub purchase: bool,
}

impl InFlight {
    pub fn get(&self, class: ActionClass) -> bool {
        match class {
            ActionClass::Saving => self.saving,
            ActionClass::Usage => self.usage,
            ActionClass::Purchase => self.purchase,
        }
    }

    fn set(&mut self, class: ActionClass, value: bool) {
        match class {
            ActionClass::Saving => self.saving = value,
            ActionClass::Usage => self.usage = value,
            ActionClass::Purchase => self.purchase = value,
        }
    }

    pub fn any(&self) -> bool {
        self.saving || self.usage || self.purchase
    }
}

/// Outcome of the three status lookups; `None` marks a lookup that failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    pub saved: Option<Vec<SavedTemplateRecord>>,
    pub bought: Option<Vec<BoughtTemplateRecord>>,
    pub used: Option<Vec<UsedTemplateRecord>>,
}

impl FetchResult {
    pub fn failed_lookups(&self) -> Vec<Lookup> {
        let mut failed = Vec::new();
        if self.saved.is_none() {
            failed.push(Lookup::Saved);
        }
        if self.bought.is_none() {
            failed.push(Lookup::Bought);
        }
        if self.used.is_none() {
            failed.push(Lookup::Used);
        }
        failed
    }
}

/// Fold the three lookups into one status pair for `slug`.
///
/// Independent of which lookup answered first: every matching record votes and
/// the highest status in `bought > pending > saved > free` wins. Missing lists
/// contribute nothing.
pub fn merge(
    slug: &str,
    saved: Option<&[SavedTemplateRecord]>,
    bought: Option<&[BoughtTemplateRecord]>,
    used: Option<&[UsedTemplateRecord]>,
) -> (EntitlementStatus, UsageStatus) {
    let from_saved = saved
        .unwrap_or_default()
        .iter()
        .filter(|record| record.slug == slug)
        .map(SavedTemplateRecord::entitlement);

    let from_bought = bought
        .unwrap_or_default()
        .iter()
        .filter(|record| record.slug == slug)
        .map(BoughtTemplateRecord::entitlement);

    let entitlement = from_saved
        .chain(from_bought)
        .max()
        .unwrap_or(EntitlementStatus::Free);

    let usage = if used
        .unwrap_or_default()
        .iter()
        .any(|record| record.slug == slug)
    {
        UsageStatus::Used
    } else {
        UsageStatus::Unused
    };

    (entitlement, usage)
}

/// Read-only copy of a store's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementSnapshot {
    /// `None` while a premium template's status is still being resolved
    pub entitlement: Option<EntitlementStatus>,
    pub usage: UsageStatus,
    pub is_loading: bool,
    pub in_flight: InFlight,
    pub payment_ui_open: bool,
}

/// Composite status of one template for one user.
///
/// Pure in-memory state; all I/O lives in the fetcher and the controller.
#[derive(Debug, Clone)]
pub struct EntitlementStore {
    template: Template,
    entitlement: Option<EntitlementStatus>,
    usage: UsageStatus,
    is_loading: bool,
    in_flight: InFlight,
    payment_ui_open: bool,
}

impl EntitlementStore {
    pub fn initialize(template: Template) -> Self {
        let entitlement = if template.is_premium() {
            None
        } else {
            Some(EntitlementStatus::Free)
        };

        Self {
            template,
            entitlement,
            usage: UsageStatus::Unused,
            is_loading: true,
            in_flight: InFlight::default(),
            payment_ui_open: false,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn slug(&self) -> &str {
        &self.template.slug
    }

    pub fn entitlement(&self) -> Option<EntitlementStatus> {
        self.entitlement
    }

    pub fn usage(&self) -> UsageStatus {
        self.usage
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn in_flight(&self, class: ActionClass) -> bool {
        self.in_flight.get(class)
    }

    pub fn payment_ui_open(&self) -> bool {
        self.payment_ui_open
    }

    pub fn snapshot(&self) -> EntitlementSnapshot {
        EntitlementSnapshot {
            entitlement: self.entitlement,
            usage: self.usage,
            is_loading: self.is_loading,
            in_flight: self.in_flight,
            payment_ui_open: self.payment_ui_open,
        }
    }

    /// Mark the store as waiting for a fresh lookup
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    pub fn apply_fetch_result(&mut self, result: &FetchResult) -> (EntitlementStatus, UsageStatus) {
        let (entitlement, usage) = merge(
            &self.template.slug,
            result.saved.as_deref(),
            result.bought.as_deref(),
            result.used.as_deref(),
        );
        self.entitlement = Some(entitlement);
        self.usage = usage;
        self.is_loading = false;
        (entitlement, usage)
    }

    /// Set one field and return its previous value as the reverse transition.
    ///
    /// An unresolved entitlement reverses to `Free`.
    pub fn transition(&mut self, next: Transition) -> Transition {
        match next {
            Transition::Entitlement(status) => {
                let previous = self.entitlement.replace(status);
                Transition::Entitlement(previous.unwrap_or(EntitlementStatus::Free))
            }
            Transition::Usage(status) => {
                let previous = std::mem::replace(&mut self.usage, status);
                Transition::Usage(previous)
            }
        }
    }

    /// Undo the optimistic `applied` change with `reverse`.
    ///
    /// Only writes while the field still holds `applied`; a value set in the
    /// meantime (payment success, a fresh lookup) is kept. Returns whether the
    /// field was restored.
    pub fn revert(&mut self, applied: Transition, reverse: Transition) -> bool {
        let current = match applied {
            Transition::Entitlement(_) => self.entitlement.map(Transition::Entitlement),
            Transition::Usage(_) => Some(Transition::Usage(self.usage)),
        };
        if current != Some(applied) {
            return false;
        }
        self.transition(reverse);
        true
    }

    /// Claim the in-flight slot for `class`; false if it is already taken
    pub fn try_begin(&mut self, class: ActionClass) -> bool {
        if self.in_flight.get(class) {
            return false;
        }
        self.in_flight.set(class, true);
        true
    }

    pub fn finish(&mut self, class: ActionClass) {
        self.in_flight.set(class, false);
    }

    pub fn set_payment_ui_open(&mut self, open: bool) {
        self.payment_ui_open = open;
    }
}

/// Owning reference held by the mounted view
#[derive(Debug)]
pub struct SharedStore(Arc<Mutex<EntitlementStore>>);

impl SharedStore {
    pub fn new(store: EntitlementStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    pub fn handle(&self) -> StoreHandle {
        StoreHandle(Arc::downgrade(&self.0))
    }

    pub fn snapshot(&self) -> EntitlementSnapshot {
        self.0.lock().snapshot()
    }

    pub fn read<R>(&self, f: impl FnOnce(&EntitlementStore) -> R) -> R {
        f(&self.0.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut EntitlementStore) -> R) -> R {
        f(&mut self.0.lock())
    }
}

/// Non-owning reference used by async completions.
///
/// Once the view is dropped every access yields `None` and the completion is
/// discarded.
#[derive(Debug, Clone)]
pub struct StoreHandle(Weak<Mutex<EntitlementStore>>);

impl StoreHandle {
    pub fn with<R>(&self, f: impl FnOnce(&mut EntitlementStore) -> R) -> Option<R> {
        let store = self.0.upgrade()?;
        let mut guard = store.lock();
        Some(f(&mut guard))
    }

    pub fn snapshot(&self) -> Option<EntitlementSnapshot> {
        self.with(|store| store.snapshot())
    }

    pub fn is_mounted(&self) -> bool {
        self.0.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn premium() -> Template {
        Template::premium("modern-resume", "Modern Resume", 199.0)
    }

    #[test]
    fn test_initialize_premium_is_unresolved() {
        let store = EntitlementStore::initialize(premium());
        assert_eq!(store.entitlement(), None);
        assert_eq!(store.usage(), UsageStatus::Unused);
        assert!(store.is_loading());
    }

    #[test]
    fn test_initialize_free_starts_free() {
        let store = EntitlementStore::initialize(Template::free("minimal", "Minimal"));
        assert_eq!(store.entitlement(), Some(EntitlementStatus::Free));
    }

    #[test]
    fn test_bought_wins_over_saved() {
        let saved = vec![SavedTemplateRecord::new("modern-resume")];
        let bought = vec![BoughtTemplateRecord::new(
            "modern-resume",
            EntitlementStatus::Bought,
        )];

        let (entitlement, _) = merge(
            "modern-resume",
            Some(saved.as_slice()),
            Some(bought.as_slice()),
            Some(&[][..]),
        );
        assert_eq!(entitlement, EntitlementStatus::Bought);
    }

    #[test]
    fn test_pending_wins_over_saved() {
        let saved = vec![SavedTemplateRecord::new("neon")];
        let bought = vec![BoughtTemplateRecord::new("neon", EntitlementStatus::Pending)];

        let (entitlement, _) = merge("neon", Some(saved.as_slice()), Some(bought.as_slice()), None);
        assert_eq!(entitlement, EntitlementStatus::Pending);
    }

    #[test]
    fn test_merge_ignores_other_slugs() {
        let bought = vec![BoughtTemplateRecord::new("other", EntitlementStatus::Bought)];
        let used = vec![UsedTemplateRecord::new("other")];

        let merged = merge("neon", None, Some(bought.as_slice()), Some(used.as_slice()));
        assert_eq!(merged, (EntitlementStatus::Free, UsageStatus::Unused));
    }

    #[test]
    fn test_merge_with_everything_missing_defaults() {
        assert_eq!(
            merge("neon", None, None, None),
            (EntitlementStatus::Free, UsageStatus::Unused)
        );
    }

    #[test]
    fn test_merge_used_flag() {
        let used = vec![UsedTemplateRecord::new("neon")];
        let (_, usage) = merge("neon", Some(&[][..]), Some(&[][..]), Some(used.as_slice()));
        assert_eq!(usage, UsageStatus::Used);
    }

    #[test]
    fn test_apply_fetch_result_clears_loading() {
        let mut store = EntitlementStore::initialize(premium());
        let result = FetchResult {
            saved: Some(vec![]),
            bought: None,
            used: Some(vec![]),
        };

        store.apply_fetch_result(&result);
        assert!(!store.is_loading());
        assert_eq!(store.entitlement(), Some(EntitlementStatus::Free));
        assert_eq!(result.failed_lookups(), vec![Lookup::Bought]);
    }

    #[test]
    fn test_transition_returns_previous_value() {
        let mut store = EntitlementStore::initialize(Template::free("minimal", "Minimal"));
        let reverse = store.transition(EntitlementStatus::Saved.into());
        assert_eq!(reverse, Transition::Entitlement(EntitlementStatus::Free));

        let reverse = store.transition(UsageStatus::Used.into());
        assert_eq!(reverse, Transition::Usage(UsageStatus::Unused));

        store.transition(reverse);
        assert_eq!(store.usage(), UsageStatus::Unused);
    }

    #[test]
    fn test_revert_restores_untouched_field() {
        let mut store = EntitlementStore::initialize(Template::free("minimal", "Minimal"));
        let applied = Transition::Entitlement(EntitlementStatus::Saved);
        let reverse = store.transition(applied);

        assert!(store.revert(applied, reverse));
        assert_eq!(store.entitlement(), Some(EntitlementStatus::Free));
    }

    #[test]
    fn test_revert_keeps_value_written_meanwhile() {
        let mut store = EntitlementStore::initialize(premium());
        store.apply_fetch_result(&FetchResult::default());
        let applied = Transition::Entitlement(EntitlementStatus::Saved);
        let reverse = store.transition(applied);
        store.transition(EntitlementStatus::Bought.into());

        assert!(!store.revert(applied, reverse));
        assert_eq!(store.entitlement(), Some(EntitlementStatus::Bought));

        let applied = Transition::Usage(UsageStatus::Used);
        let reverse = store.transition(applied);
        store.transition(UsageStatus::Unused.into());
        assert!(!store.revert(applied, reverse));
        assert_eq!(store.usage(), UsageStatus::Unused);
    }

    #[test]
    fn test_single_flight_per_class() {
        let mut store = EntitlementStore::initialize(premium());
        assert!(store.try_begin(ActionClass::Saving));
        assert!(!store.try_begin(ActionClass::Saving));
        assert!(store.try_begin(ActionClass::Usage));

        store.finish(ActionClass::Saving);
        assert!(store.try_begin(ActionClass::Saving));
    }

    #[test]
    fn test_handle_after_unmount() {
        let shared = SharedStore::new(EntitlementStore::initialize(premium()));
        let handle = shared.handle();
        assert!(handle.is_mounted());

        drop(shared);
        assert!(!handle.is_mounted());
        assert!(handle.with(|store| store.begin_loading()).is_none());
    }
}
