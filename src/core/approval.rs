//! Approval state machine - Submission, approval and rejection of budget requests.
//!
//! ```text
//! submit ──► Pending Manager Approval ──approve (total ≤ threshold)──► Approved
//!                     │        └──approve (total > threshold)──► Pending BOD Approval ──approve──► Approved
//!                     └──reject──► Rejected ◄──reject──────────────────────┘
//! ```
//!
//! `submit`, `approve` and `reject` are pure: they take the current record and return
//! the next one, or an error without touching anything. The `*_budget` functions wrap
//! them with loading and persistence.

use crate::{
    core::{BOD_ESCALATION_THRESHOLD, budget::require_budget_request, master_data, new_id},
    entities::{
        BudgetItem, BudgetItems, BudgetStatus, ProcurementStatus, budget_request, user,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, IntoActiveModel, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Which approver a pending request is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStage {
    Manager,
    Bod,
}

impl ApprovalStage {
    /// Stage a request is waiting in, or `None` when no approval is outstanding.
    #[must_use]
    pub const fn of(status: BudgetStatus) -> Option<Self> {
        match status {
            BudgetStatus::PendingManagerApproval => Some(Self::Manager),
            BudgetStatus::PendingBodApproval => Some(Self::Bod),
            BudgetStatus::Draft | BudgetStatus::Approved | BudgetStatus::Rejected => None,
        }
    }
}

/// Builds a new request from the submitter and their line items.
///
/// Lines with a zero quantity are dropped and every remaining line total is
/// recomputed from its price snapshot, so the stored totals never depend on what
/// the caller claimed.
///
/// # Errors
/// [`Error::Validation`] when no line has a positive quantity or the submitter has
/// no manager to route the request to.
pub fn submit(
    submitter: &user::Model,
    items: Vec<BudgetItem>,
    now: DateTime<Utc>,
) -> Result<budget_request::Model> {
    let items: Vec<BudgetItem> = items
        .into_iter()
        .filter(|item| item.qty > 0)
        .map(|mut item| {
            item.set_qty(item.qty);
            item
        })
        .collect();

    if items.is_empty() {
        return Err(Error::validation(
            "Cannot submit an empty request; add a quantity for at least one item",
        ));
    }

    if submitter.manager_id.is_none() {
        return Err(Error::validation(format!(
            "{} has no manager assigned to approve the request",
            submitter.name
        )));
    }

    let items = BudgetItems(items);
    let total = items.grand_total();

    Ok(budget_request::Model {
        id: new_id("BR"),
        user_id: submitter.id.clone(),
        user_name: submitter.name.clone(),
        department: submitter.department.clone(),
        items,
        total,
        status: BudgetStatus::PendingManagerApproval,
        procurement_status: None,
        submitted_at: now,
        manager_approver_id: submitter.manager_id.clone(),
        bod_approver_id: submitter.bod_id.clone(),
        approved_at: None,
        rejected_at: None,
        rejected_reason: None,
        po_generated: false,
        assigned_company_profile_id: None,
        assigned_delivery_address: None,
    })
}

/// Confirms the request is pending and `approver` is the designated approver for
/// its current stage.
fn authorize(
    request: &budget_request::Model,
    approver: &user::Model,
    action: &str,
) -> Result<ApprovalStage> {
    let stage = ApprovalStage::of(request.status).ok_or_else(|| Error::InvalidState {
        action: format!("{action} request {}", request.id),
        current: request.status.to_string(),
    })?;

    let designated = match stage {
        ApprovalStage::Manager => request.manager_approver_id.as_deref(),
        ApprovalStage::Bod => request.bod_approver_id.as_deref(),
    };

    if designated == Some(approver.id.as_str()) {
        Ok(stage)
    } else {
        Err(Error::Authorization {
            message: format!(
                "{} is not the designated approver for request {} ({})",
                approver.name, request.id, request.status
            ),
        })
    }
}

/// Applies an approval.
///
/// A manager approving a request whose total is strictly above
/// [`BOD_ESCALATION_THRESHOLD`] escalates it to the BOD; every other approval is
/// final, stamps `approved_at` and opens the procurement lane at `Pending`.
pub fn approve(
    request: &budget_request::Model,
    approver: &user::Model,
    now: DateTime<Utc>,
) -> Result<budget_request::Model> {
    let stage = authorize(request, approver, "approve")?;
    let mut next = request.clone();

    match stage {
        ApprovalStage::Manager if request.total > BOD_ESCALATION_THRESHOLD => {
            next.status = BudgetStatus::PendingBodApproval;
        }
        ApprovalStage::Manager | ApprovalStage::Bod => {
            next.status = BudgetStatus::Approved;
            next.approved_at = Some(now);
            next.procurement_status = Some(ProcurementStatus::Pending);
        }
    }

    Ok(next)
}

/// Applies a rejection. The reason is stored exactly as given.
pub fn reject(
    request: &budget_request::Model,
    approver: &user::Model,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<budget_request::Model> {
    if reason.trim().is_empty() {
        return Err(Error::validation("A rejection reason is required"));
    }
    authorize(request, approver, "reject")?;

    let mut next = request.clone();
    next.status = BudgetStatus::Rejected;
    next.rejected_at = Some(now);
    next.rejected_reason = Some(reason.to_string());
    Ok(next)
}

/// One requested product line as sent by a submitter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedLine {
    pub product_id: String,
    pub qty: u32,
}

/// Submits a new budget request for `submitter_id`.
///
/// Each line is snapshotted from the current product catalogue; repeated product
/// ids are merged into one line.
#[instrument(skip(db, lines), fields(lines = lines.len()))]
pub async fn submit_budget(
    db: &DatabaseConnection,
    submitter_id: &str,
    lines: &[RequestedLine],
) -> Result<budget_request::Model> {
    let submitter = master_data::require_user(db, submitter_id).await?;

    let mut items: Vec<BudgetItem> = Vec::new();
    for line in lines.iter().filter(|line| line.qty > 0) {
        if let Some(existing) = items.iter_mut().find(|i| i.product_id == line.product_id) {
            existing.set_qty(existing.qty.saturating_add(line.qty));
            continue;
        }
        let product = master_data::get_product(db, &line.product_id)
            .await?
            .ok_or_else(|| Error::not_found("Product", line.product_id.clone()))?;
        items.push(BudgetItem::from_product(&product, line.qty));
    }

    let request = submit(&submitter, items, Utc::now())?;
    let created = request.into_active_model().insert(db).await?;

    info!(
        budget_id = %created.id,
        total = created.total,
        "Budget request submitted"
    );
    Ok(created)
}

/// Loads the request and approver, applies `approve` and persists the result.
#[instrument(skip(db))]
pub async fn approve_budget(
    db: &DatabaseConnection,
    budget_id: &str,
    approver_id: &str,
) -> Result<budget_request::Model> {
    let txn = db.begin().await?;

    let request = require_budget_request(&txn, budget_id).await?;
    let approver = master_data::require_user(&txn, approver_id).await?;
    let next = approve(&request, &approver, Utc::now())?;

    let updated = next.into_active_model().reset_all().update(&txn).await?;
    txn.commit().await?;

    info!(
        budget_id = %updated.id,
        from = %request.status,
        to = %updated.status,
        "Budget request approved"
    );
    Ok(updated)
}

/// Loads the request and approver, applies `reject` and persists the result.
#[instrument(skip(db, reason))]
pub async fn reject_budget(
    db: &DatabaseConnection,
    budget_id: &str,
    approver_id: &str,
    reason: &str,
) -> Result<budget_request::Model> {
    let txn = db.begin().await?;

    let request = require_budget_request(&txn, budget_id).await?;
    let approver = master_data::require_user(&txn, approver_id).await?;
    let next = reject(&request, &approver, reason, Utc::now())?;

    let updated = next.into_active_model().reset_all().update(&txn).await?;
    txn.commit().await?;

    info!(budget_id = %updated.id, "Budget request rejected");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Role;
    use crate::test_utils::*;

    fn requester() -> user::Model {
        let mut user = sample_user("user-1", Role::User);
        user.manager_id = Some("manager-1".to_string());
        user.bod_id = Some("bod-1".to_string());
        user
    }

    fn pending_request(total_price: i64) -> budget_request::Model {
        let items = vec![sample_item("prod-001", total_price, 1)];
        submit(&requester(), items, Utc::now()).unwrap()
    }

    #[test]
    fn test_submit_filters_zero_quantities() {
        let items = vec![
            sample_item("prod-001", 45_000, 3),
            sample_item("prod-002", 25_000, 0),
        ];
        let request = submit(&requester(), items, Utc::now()).unwrap();

        assert_eq!(request.status, BudgetStatus::PendingManagerApproval);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.total, 135_000);
        assert_eq!(request.user_name, "user-1 name");
        assert_eq!(request.manager_approver_id.as_deref(), Some("manager-1"));
        assert_eq!(request.bod_approver_id.as_deref(), Some("bod-1"));
        assert!(request.procurement_status.is_none());
    }

    #[test]
    fn test_submit_recomputes_line_totals() {
        let mut tampered = sample_item("prod-001", 45_000, 2);
        tampered.total = 1;
        let request = submit(&requester(), vec![tampered], Utc::now()).unwrap();

        assert_eq!(request.items.0[0].total, 90_000);
        assert_eq!(request.total, request.items.grand_total());
    }

    #[test]
    fn test_submit_all_zero_is_validation_error() {
        let items = vec![sample_item("prod-001", 45_000, 0)];
        let result = submit(&requester(), items, Utc::now());
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = submit(&requester(), Vec::new(), Utc::now());
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_submit_without_manager_is_validation_error() {
        let mut lonely = requester();
        lonely.manager_id = None;
        let result = submit(&lonely, vec![sample_item("prod-001", 1_000, 1)], Utc::now());
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_manager_approves_at_or_below_threshold() {
        let manager = sample_user("manager-1", Role::Manager);

        for total in [1_000, BOD_ESCALATION_THRESHOLD] {
            let request = pending_request(total);
            let next = approve(&request, &manager, Utc::now()).unwrap();
            assert_eq!(next.status, BudgetStatus::Approved);
            assert!(next.approved_at.is_some());
            assert_eq!(next.procurement_status, Some(ProcurementStatus::Pending));
        }
    }

    #[test]
    fn test_manager_escalates_above_threshold() {
        let manager = sample_user("manager-1", Role::Manager);
        let request = pending_request(BOD_ESCALATION_THRESHOLD + 1);

        let next = approve(&request, &manager, Utc::now()).unwrap();
        assert_eq!(next.status, BudgetStatus::PendingBodApproval);
        assert!(next.approved_at.is_none());
        assert!(next.procurement_status.is_none());
    }

    #[test]
    fn test_bod_approval_is_final_regardless_of_total() {
        let manager = sample_user("manager-1", Role::Manager);
        let bod = sample_user("bod-1", Role::Bod);
        let request = pending_request(50_000_000);

        let escalated = approve(&request, &manager, Utc::now()).unwrap();
        let approved = approve(&escalated, &bod, Utc::now()).unwrap();
        assert_eq!(approved.status, BudgetStatus::Approved);
        assert!(approved.approved_at.is_some());
    }

    #[test]
    fn test_wrong_approver_is_authorization_error() {
        let other_manager = sample_user("manager-2", Role::Manager);
        let bod = sample_user("bod-1", Role::Bod);
        let request = pending_request(1_000);

        let result = approve(&request, &other_manager, Utc::now());
        assert!(matches!(result, Err(Error::Authorization { .. })));

        // The BOD is not the approver at the manager stage
        let result = approve(&request, &bod, Utc::now());
        assert!(matches!(result, Err(Error::Authorization { .. })));
    }

    #[test]
    fn test_approving_settled_request_is_invalid_state() {
        let manager = sample_user("manager-1", Role::Manager);
        let approved = approve(&pending_request(1_000), &manager, Utc::now()).unwrap();

        let result = approve(&approved, &manager, Utc::now());
        assert!(matches!(result, Err(Error::InvalidState { .. })));

        let result = reject(&approved, &manager, "late", Utc::now());
        assert!(matches!(result, Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_reject_requires_reason_and_stores_it_verbatim() {
        let manager = sample_user("manager-1", Role::Manager);
        let request = pending_request(1_000);

        let result = reject(&request, &manager, "   ", Utc::now());
        assert!(matches!(result, Err(Error::Validation { .. })));

        let reason = "  Over budget for Q3 ";
        let rejected = reject(&request, &manager, reason, Utc::now()).unwrap();
        assert_eq!(rejected.status, BudgetStatus::Rejected);
        assert_eq!(rejected.rejected_reason.as_deref(), Some(reason));
        assert!(rejected.rejected_at.is_some());
    }

    #[test]
    fn test_bod_can_reject_escalated_request() {
        let manager = sample_user("manager-1", Role::Manager);
        let bod = sample_user("bod-1", Role::Bod);
        let escalated = approve(&pending_request(9_000_000), &manager, Utc::now()).unwrap();

        let result = reject(&escalated, &manager, "no", Utc::now());
        assert!(matches!(result, Err(Error::Authorization { .. })));

        let rejected = reject(&escalated, &bod, "Defer to next year", Utc::now()).unwrap();
        assert_eq!(rejected.status, BudgetStatus::Rejected);
    }

    #[tokio::test]
    async fn test_submit_budget_snapshots_catalogue() -> Result<()> {
        let (db, org) = setup_with_org().await?;

        let request = submit_budget(
            &db,
            &org.requester.id,
            &[
                RequestedLine {
                    product_id: org.paper.id.clone(),
                    qty: 2,
                },
                RequestedLine {
                    product_id: org.ink.id.clone(),
                    qty: 0,
                },
                RequestedLine {
                    product_id: org.paper.id.clone(),
                    qty: 1,
                },
            ],
        )
        .await?;

        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items.0[0].qty, 3);
        assert_eq!(request.total, 3 * org.paper.price);

        let stored = require_budget_request(&db, &request.id).await?;
        assert_eq!(stored.items, request.items);
        assert_eq!(stored.status, BudgetStatus::PendingManagerApproval);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_budget_unknown_product() -> Result<()> {
        let (db, org) = setup_with_org().await?;

        let result = submit_budget(
            &db,
            &org.requester.id,
            &[RequestedLine {
                product_id: "prod-missing".to_string(),
                qty: 1,
            }],
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "Product",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_escalation_round_trip_through_database() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        let request = submit_test_request(&db, &org, &org.laptop, 1).await?;
        assert!(request.total > BOD_ESCALATION_THRESHOLD);

        let escalated = approve_budget(&db, &request.id, &org.manager.id).await?;
        assert_eq!(escalated.status, BudgetStatus::PendingBodApproval);

        let approved = approve_budget(&db, &request.id, &org.bod.id).await?;
        assert_eq!(approved.status, BudgetStatus::Approved);

        let stored = require_budget_request(&db, &request.id).await?;
        assert_eq!(stored.status, BudgetStatus::Approved);
        assert_eq!(stored.procurement_status, Some(ProcurementStatus::Pending));
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_total_saturates_and_escalates() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        let huge = i64::MAX / 2 + 1;
        create_test_product(&db, "prod-big-1", "vendor-1", huge).await?;
        create_test_product(&db, "prod-big-2", "vendor-2", huge).await?;

        let request = submit_budget(
            &db,
            &org.requester.id,
            &[
                RequestedLine {
                    product_id: "prod-big-1".to_string(),
                    qty: 1,
                },
                RequestedLine {
                    product_id: "prod-big-2".to_string(),
                    qty: 1,
                },
            ],
        )
        .await?;
        assert_eq!(request.total, i64::MAX);

        let escalated = approve_budget(&db, &request.id, &org.manager.id).await?;
        assert_eq!(escalated.status, BudgetStatus::PendingBodApproval);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_approval_leaves_record_unchanged() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        let request = submit_test_request(&db, &org, &org.paper, 1).await?;

        let result = approve_budget(&db, &request.id, &org.bod.id).await;
        assert!(matches!(result.unwrap_err(), Error::Authorization { .. }));

        let stored = require_budget_request(&db, &request.id).await?;
        assert_eq!(stored.status, BudgetStatus::PendingManagerApproval);
        assert!(stored.approved_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_budget_persists_reason() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        let request = submit_test_request(&db, &org, &org.paper, 1).await?;

        let rejected = reject_budget(&db, &request.id, &org.manager.id, "Duplicate").await?;
        assert_eq!(rejected.rejected_reason.as_deref(), Some("Duplicate"));

        let stored = require_budget_request(&db, &request.id).await?;
        assert_eq!(stored.status, BudgetStatus::Rejected);

        let result = reject_budget(&db, "BR-missing", &org.manager.id, "x").await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
