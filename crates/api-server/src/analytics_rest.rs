//! Read-only aggregation endpoints for the dashboards.

use crate::envelope::{ApiError, ApiResponse};
use crate::guard::AuthAccount;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use pressflow_campaigns::store::{CampaignCounts, MonthlyStats};
use pressflow_campaigns::Campaign;
use pressflow_core::Role;
use pressflow_platform::require_admin;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn owner_scope(auth: &AuthAccount) -> Option<Uuid> {
    if auth.role.is_admin() {
        None
    } else {
        Some(auth.id)
    }
}

// ─── Dashboard ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub campaigns: CampaignCounts,
    pub emails: EmailSummary,
    pub contacts: DirectoryCounts,
    pub press_contacts: DirectoryCounts,
    pub recent_campaigns: Vec<Campaign>,
}

#[derive(Debug, Serialize)]
pub struct EmailSummary {
    pub total_sent: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    pub open_rate: f64,
    pub click_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DirectoryCounts {
    pub total: usize,
    pub active: usize,
}

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
) -> Result<Json<ApiResponse<DashboardData>>, ApiError> {
    let scope = owner_scope(&auth);

    let totals = state.campaigns.email_totals(scope);
    let (open_rate, click_rate) = if totals.total_sent > 0 {
        let sent = totals.total_sent as f64;
        (
            totals.total_opened as f64 / sent * 100.0,
            totals.total_clicked as f64 / sent * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    let mut recent = state.campaigns.list(scope, None);
    recent.truncate(5);

    Ok(Json(ApiResponse::ok(DashboardData {
        campaigns: state.campaigns.counts(scope),
        emails: EmailSummary {
            total_sent: totals.total_sent,
            total_opened: totals.total_opened,
            total_clicked: totals.total_clicked,
            open_rate,
            click_rate,
        },
        contacts: DirectoryCounts {
            total: state.directory.count_contacts(),
            active: state.directory.count_active_contacts(),
        },
        press_contacts: DirectoryCounts {
            total: state.directory.count_press_contacts(),
            active: state.directory.count_active_press_contacts(),
        },
        recent_campaigns: recent,
    })))
}

// ─── Campaign performance ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CampaignAnalyticsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CampaignAnalyticsData {
    pub monthly_stats: Vec<MonthlyStats>,
    pub top_campaigns: Vec<TopCampaign>,
}

#[derive(Debug, Serialize)]
pub struct TopCampaign {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub total_sent: u64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub sent_at: Option<DateTime<Utc>>,
}

/// GET /api/analytics/campaigns
pub async fn campaign_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Query(query): Query<CampaignAnalyticsQuery>,
) -> Result<Json<ApiResponse<CampaignAnalyticsData>>, ApiError> {
    let scope = owner_scope(&auth);
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };

    let monthly_stats = state.campaigns.monthly_stats(scope, range);
    let top_campaigns = state
        .campaigns
        .top_by_open_rate(scope, 10)
        .into_iter()
        .map(|c| TopCampaign {
            id: c.id,
            name: c.name,
            subject: c.subject,
            total_sent: c.analytics.total_sent,
            open_rate: c.analytics.open_rate,
            click_rate: c.analytics.click_rate,
            sent_at: c.sent_at,
        })
        .collect();

    Ok(Json(ApiResponse::ok(CampaignAnalyticsData {
        monthly_stats,
        top_campaigns,
    })))
}

// ─── Account analytics ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserAnalyticsData {
    pub total_users: usize,
    pub active_users: usize,
    pub inactive_users: usize,
    pub role_stats: Vec<RoleCount>,
    pub user_activity: Vec<UserActivity>,
}

#[derive(Debug, Serialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct UserActivity {
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub campaign_count: usize,
    pub sent_campaigns: usize,
}

/// GET /api/analytics/users — admin only.
pub async fn user_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
) -> Result<Json<ApiResponse<UserAnalyticsData>>, ApiError> {
    require_admin(&auth)?;

    let total_users = state.accounts.count();
    let active_users = state.accounts.count_active();
    let role_stats = state
        .accounts
        .role_distribution()
        .into_iter()
        .map(|(role, count)| RoleCount { role, count })
        .collect();

    let user_activity = state
        .campaigns
        .owner_activity()
        .into_iter()
        .filter_map(|activity| {
            let account = state.accounts.get(activity.account_id)?;
            Some(UserActivity {
                account_id: activity.account_id,
                name: account.name,
                email: account.email,
                campaign_count: activity.campaign_count,
                sent_campaigns: activity.sent_campaigns,
            })
        })
        .collect();

    Ok(Json(ApiResponse::ok(UserAnalyticsData {
        total_users,
        active_users,
        inactive_users: total_users - active_users,
        role_stats,
        user_activity,
    })))
}
