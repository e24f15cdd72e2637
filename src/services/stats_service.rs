use crate::domain::entities::Session;
use crate::domain::errors::ApiResult;
use crate::domain::ports::StatsApi;
use crate::models::TopTemplateStat;
use std::sync::Arc;

pub const TOP_TEMPLATES_PER_PAGE: usize = 7;

/// Headline numbers of the admin dashboard; `None` renders as "N/A"
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardSummary {
    pub total_users: Option<u64>,
    pub total_templates: Option<u64>,
    pub revenue: Option<f64>,
    pub pending_payments: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTemplate {
    pub rank: usize,
    pub stat: TopTemplateStat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopTemplatesPage {
    pub page: usize,
    pub total_pages: usize,
    pub items: Vec<RankedTemplate>,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Templates ordered by unlock count, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopTemplatesBoard {
    templates: Vec<TopTemplateStat>,
}

impl TopTemplatesBoard {
    pub fn new(mut templates: Vec<TopTemplateStat>) -> Self {
        // stable: equal unlock counts keep backend order
        templates.sort_by(|a, b| b.unlocks().cmp(&a.unlocks()));
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn total_pages(&self) -> usize {
        self.templates.len().div_ceil(TOP_TEMPLATES_PER_PAGE)
    }

    /// 1-based page, clamped to the available range
    pub fn page(&self, page: usize) -> TopTemplatesPage {
        let total_pages = self.total_pages();
        let page = page.clamp(1, total_pages.max(1));
        let start = (page - 1) * TOP_TEMPLATES_PER_PAGE;

        let items = self
            .templates
            .iter()
            .enumerate()
            .skip(start)
            .take(TOP_TEMPLATES_PER_PAGE)
            .map(|(index, stat)| RankedTemplate {
                rank: index + 1,
                stat: stat.clone(),
            })
            .collect();

        TopTemplatesPage {
            page,
            total_pages,
            items,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }
}

/// Usage and payment tracking for administrators
#[derive(Clone)]
pub struct StatsService {
    api: Arc<dyn StatsApi>,
}

impl StatsService {
    pub fn new(api: Arc<dyn StatsApi>) -> Self {
        Self { api }
    }

    /// Fetch the four dashboard metrics concurrently; each failure only
    /// blanks its own card.
    pub async fn dashboard_summary(&self, session: &Session) -> DashboardSummary {
        if !session.is_authenticated() {
            return DashboardSummary::default();
        }

        let (users, templates, revenue, pending) = futures::future::join4(
            self.api.users_count(session),
            self.api.templates_count(session),
            self.api.revenue(session),
            self.api.pending_payments(session),
        )
        .await;

        DashboardSummary {
            total_users: metric("users-count", users),
            total_templates: metric("templates-count", templates),
            revenue: metric("revenue", revenue),
            pending_payments: metric("pending-payments", pending),
        }
    }

    pub async fn top_templates(&self, session: &Session) -> TopTemplatesBoard {
        if !session.is_authenticated() {
            return TopTemplatesBoard::default();
        }

        match self.api.top_templates(session).await {
            Ok(templates) => TopTemplatesBoard::new(templates),
            Err(e) => {
                tracing::error!("Failed to fetch top templates: {}", e);
                TopTemplatesBoard::default()
            }
        }
    }
}

fn metric<T>(name: &str, result: ApiResult<T>) -> Option<T> {
    result
        .map_err(|e| tracing::warn!("Dashboard metric {} unavailable: {}", name, e))
        .ok()
}
