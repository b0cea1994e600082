//! The last-7-days metrics and guardrail report.
//!
//! A read-only aggregation over the audit trail plus a health classification
//! per configured policy. Operators use this to spot automation that is
//! disabled-but-configured, near or at its daily limit, or enabled but idle.

use std::collections::HashMap;

use chrono::Duration;
use serde::Serialize;

use domus_core::audit::actions;
use domus_core::guardrail::{assess, ActivitySummary, GuardrailState};
use domus_core::types::Timestamp;
use domus_db::repositories::{AuditRepo, PolicyRepo};
use domus_db::DbPool;

/// Reporting window in days.
const WINDOW_DAYS: i64 = 7;

/// Audit activity for one proposal kind over the window.
#[derive(Debug, Serialize)]
pub struct KindActivity {
    pub proposal_kind: String,
    pub summary: ActivitySummary,
}

/// Health view of one configured policy.
#[derive(Debug, Serialize)]
pub struct PolicyHealth {
    pub proposal_kind: String,
    pub enabled: bool,
    pub auto_approve: bool,
    pub auto_execute: bool,
    pub daily_limit: i32,
    pub executed_today: i64,
    pub guardrail: GuardrailState,
}

/// The full metrics report.
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub window_days: i64,
    pub since: Timestamp,
    pub generated_at: Timestamp,
    pub activity: Vec<KindActivity>,
    pub policies: Vec<PolicyHealth>,
}

/// Build the report as of `now`.
pub async fn report(pool: &DbPool, now: Timestamp) -> Result<MetricsReport, sqlx::Error> {
    let since = now - Duration::days(WINDOW_DAYS);
    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();

    // Fold per-kind, per-action counts into one summary per kind.
    let mut summaries: HashMap<String, ActivitySummary> = HashMap::new();
    for row in AuditRepo::activity_since(pool, since).await? {
        let summary = summaries.entry(row.proposal_kind.clone()).or_default();
        match row.action.as_str() {
            actions::AUTO_APPROVED => summary.approved += row.count,
            actions::AUTO_EXECUTED => summary.executed += row.count,
            actions::SKIP => summary.skipped += row.count,
            actions::FAIL => summary.failed += row.count,
            other => {
                tracing::warn!(action = other, "Unknown audit action in activity rollup");
            }
        }
    }

    let mut policies = Vec::new();
    for row in PolicyRepo::list_all(pool).await? {
        let snapshot = match row.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(proposal_kind = %row.proposal_kind, error = %e, "Skipping malformed policy in metrics");
                continue;
            }
        };
        let executed_today =
            AuditRepo::count_executed_since(pool, &row.proposal_kind, day_start).await?;
        let window_activity = summaries
            .get(&row.proposal_kind)
            .map(ActivitySummary::total)
            .unwrap_or(0);

        policies.push(PolicyHealth {
            proposal_kind: row.proposal_kind,
            enabled: row.enabled,
            auto_approve: row.auto_approve,
            auto_execute: row.auto_execute,
            daily_limit: row.daily_limit,
            executed_today,
            guardrail: assess(&snapshot, executed_today, window_activity),
        });
    }

    let mut activity: Vec<KindActivity> = summaries
        .into_iter()
        .map(|(proposal_kind, summary)| KindActivity {
            proposal_kind,
            summary,
        })
        .collect();
    activity.sort_by(|a, b| a.proposal_kind.cmp(&b.proposal_kind));

    Ok(MetricsReport {
        window_days: WINDOW_DAYS,
        since,
        generated_at: now,
        activity,
        policies,
    })
}
