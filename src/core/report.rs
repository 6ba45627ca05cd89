//! Report generation business logic.
//!
//! Every rollup here is a pure function over a slice of budget requests, so the
//! same numbers come out whether the caller loaded them from the database or built
//! them in memory. [`get_report`] is the one entry point that touches the database:
//! it loads what the viewer is allowed to see and runs all rollups over it.

use crate::{
    core::budget::get_budget_requests,
    entities::{BudgetStatus, ProcurementStatus, budget_request, user},
    errors::Result,
};
use chrono::Datelike;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Month names used as report labels, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Optional report filters; an unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportFilter {
    /// Calendar month of submission, 1 = January
    pub month: Option<u32>,
    /// Calendar year of submission
    pub year: Option<i32>,
    pub department: Option<String>,
    /// Submitting user id
    pub submitter_id: Option<String>,
    pub status: Option<BudgetStatus>,
}

impl ReportFilter {
    #[must_use]
    pub fn matches(&self, request: &budget_request::Model) -> bool {
        let submitted = request.submitted_at;
        self.month.is_none_or(|m| submitted.month() == m)
            && self.year.is_none_or(|y| submitted.year() == y)
            && self
                .department
                .as_ref()
                .is_none_or(|d| &request.department == d)
            && self
                .submitter_id
                .as_ref()
                .is_none_or(|id| &request.user_id == id)
            && self.status.is_none_or(|s| request.status == s)
    }
}

/// Requests and approved spend for one department in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub department: String,
    pub month: String,
    pub year: i32,
    /// Requests of any status
    pub total_requests: usize,
    /// Sum of totals over approved requests only
    pub total_approved_amount: i64,
}

/// Procurement lane counts over approved requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementPipeline {
    pub pending: usize,
    pub in_progress: usize,
    pub procured: usize,
}

/// Request counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total: usize,
    /// Waiting at either approval stage
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub approved_amount: i64,
}

/// Values available for the report filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    /// Distinct submission years, newest first
    pub years: Vec<i32>,
    /// Distinct departments, alphabetical
    pub departments: Vec<String>,
    pub months: Vec<String>,
}

/// Every rollup for one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub filter: ReportFilter,
    pub departments: Vec<DepartmentSummary>,
    pub pipeline: ProcurementPipeline,
    pub status_summary: StatusSummary,
    pub approved_total: i64,
    /// Options computed before filtering
    pub options: ReportOptions,
}

fn filtered<'a>(
    requests: &'a [budget_request::Model],
    filter: &'a ReportFilter,
) -> impl Iterator<Item = &'a budget_request::Model> {
    requests.iter().filter(move |r| filter.matches(r))
}

fn month_name(month: u32) -> &'static str {
    let index = usize::try_from(month.saturating_sub(1)).unwrap_or_default();
    MONTH_NAMES.get(index).copied().unwrap_or("Unknown")
}

/// Groups matching requests by (department, month, year), largest approved spend
/// first. Groups with equal spend keep the order they were first seen in.
#[must_use]
pub fn department_summaries(
    requests: &[budget_request::Model],
    filter: &ReportFilter,
) -> Vec<DepartmentSummary> {
    let mut index: HashMap<(String, i32, u32), usize> = HashMap::new();
    let mut summaries: Vec<DepartmentSummary> = Vec::new();

    for request in filtered(requests, filter) {
        let year = request.submitted_at.year();
        let month = request.submitted_at.month();
        let key = (request.department.clone(), year, month);

        let slot = *index.entry(key).or_insert_with(|| {
            summaries.push(DepartmentSummary {
                department: request.department.clone(),
                month: month_name(month).to_string(),
                year,
                total_requests: 0,
                total_approved_amount: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.total_requests += 1;
        if request.status == BudgetStatus::Approved {
            summary.total_approved_amount =
                summary.total_approved_amount.saturating_add(request.total);
        }
    }

    summaries.sort_by(|a, b| b.total_approved_amount.cmp(&a.total_approved_amount));
    summaries
}

/// Counts approved requests per procurement stage; a missing stage is pending.
#[must_use]
pub fn procurement_pipeline(
    requests: &[budget_request::Model],
    filter: &ReportFilter,
) -> ProcurementPipeline {
    filtered(requests, filter)
        .filter(|r| r.status == BudgetStatus::Approved)
        .fold(ProcurementPipeline::default(), |mut pipeline, r| {
            match r.effective_procurement_status() {
                ProcurementStatus::Pending => pipeline.pending += 1,
                ProcurementStatus::InProgress => pipeline.in_progress += 1,
                ProcurementStatus::Procured => pipeline.procured += 1,
            }
            pipeline
        })
}

/// Sum of totals over approved requests matching `filter`.
#[must_use]
pub fn approved_total(requests: &[budget_request::Model], filter: &ReportFilter) -> i64 {
    filtered(requests, filter)
        .filter(|r| r.status == BudgetStatus::Approved)
        .fold(0, |total, r| total.saturating_add(r.total))
}

#[must_use]
pub fn status_summary(requests: &[budget_request::Model], filter: &ReportFilter) -> StatusSummary {
    filtered(requests, filter).fold(StatusSummary::default(), |mut summary, r| {
        summary.total += 1;
        match r.status {
            BudgetStatus::PendingManagerApproval | BudgetStatus::PendingBodApproval => {
                summary.pending += 1;
            }
            BudgetStatus::Approved => {
                summary.approved += 1;
                summary.approved_amount = summary.approved_amount.saturating_add(r.total);
            }
            BudgetStatus::Rejected => summary.rejected += 1,
            BudgetStatus::Draft => {}
        }
        summary
    })
}

#[must_use]
pub fn report_options(requests: &[budget_request::Model]) -> ReportOptions {
    let years: BTreeSet<i32> = requests.iter().map(|r| r.submitted_at.year()).collect();
    let departments: BTreeSet<&str> = requests.iter().map(|r| r.department.as_str()).collect();

    ReportOptions {
        years: years.into_iter().rev().collect(),
        departments: departments.into_iter().map(str::to_string).collect(),
        months: MONTH_NAMES.iter().map(|m| (*m).to_string()).collect(),
    }
}

/// Runs every rollup over `requests` for `filter`.
#[must_use]
pub fn build_report(requests: &[budget_request::Model], filter: ReportFilter) -> Report {
    Report {
        departments: department_summaries(requests, &filter),
        pipeline: procurement_pipeline(requests, &filter),
        status_summary: status_summary(requests, &filter),
        approved_total: approved_total(requests, &filter),
        options: report_options(requests),
        filter,
    }
}

/// Builds a report over the requests `viewer` is allowed to see.
pub async fn get_report(
    db: &DatabaseConnection,
    viewer: &user::Model,
    filter: ReportFilter,
) -> Result<Report> {
    let requests = get_budget_requests(db, viewer).await?;
    Ok(build_report(&requests, filter))
}

/// Formats an amount as rupiah with dot-grouped thousands, e.g. `Rp 1.250.000`.
#[must_use]
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}
