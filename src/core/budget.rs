//! Budget request queries scoped by the caller's role.

use crate::{
    core::require_role,
    entities::{
        BudgetRequest, BudgetRequestColumn, BudgetStatus, Role, budget_request, user,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, prelude::*};

/// Gets a budget request by id.
pub async fn get_budget_request<C>(db: &C, budget_id: &str) -> Result<Option<budget_request::Model>>
where
    C: ConnectionTrait,
{
    BudgetRequest::find_by_id(budget_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_budget_request`] but a missing record is [`Error::NotFound`].
pub async fn require_budget_request<C>(db: &C, budget_id: &str) -> Result<budget_request::Model>
where
    C: ConnectionTrait,
{
    get_budget_request(db, budget_id)
        .await?
        .ok_or_else(|| Error::not_found("Budget request", budget_id))
}

/// Filter selecting the requests `viewer` may see.
fn visibility(viewer: &user::Model) -> Option<Condition> {
    match viewer.role {
        Role::User => Some(Condition::all().add(BudgetRequestColumn::UserId.eq(viewer.id.as_str()))),
        Role::Manager => Some(
            Condition::any()
                .add(BudgetRequestColumn::UserId.eq(viewer.id.as_str()))
                .add(BudgetRequestColumn::ManagerApproverId.eq(viewer.id.as_str())),
        ),
        Role::Bod | Role::Admin => None,
    }
}

/// Lists the requests visible to `viewer`, newest first.
///
/// Users see their own requests, managers additionally see everything routed to
/// them, and BOD members and admins see all requests.
pub async fn get_budget_requests(
    db: &DatabaseConnection,
    viewer: &user::Model,
) -> Result<Vec<budget_request::Model>> {
    let mut query = BudgetRequest::find();
    if let Some(condition) = visibility(viewer) {
        query = query.filter(condition);
    }

    query
        .order_by_desc(BudgetRequestColumn::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Requests currently waiting on `approver`, oldest first.
pub async fn get_pending_approvals(
    db: &DatabaseConnection,
    approver: &user::Model,
) -> Result<Vec<budget_request::Model>> {
    let condition = match approver.role {
        Role::Manager => Condition::all()
            .add(BudgetRequestColumn::Status.eq(BudgetStatus::PendingManagerApproval))
            .add(BudgetRequestColumn::ManagerApproverId.eq(approver.id.as_str())),
        Role::Bod => Condition::all()
            .add(BudgetRequestColumn::Status.eq(BudgetStatus::PendingBodApproval))
            .add(BudgetRequestColumn::BodApproverId.eq(approver.id.as_str())),
        Role::User | Role::Admin => return Ok(Vec::new()),
    };

    BudgetRequest::find()
        .filter(condition)
        .order_by_asc(BudgetRequestColumn::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approved requests for the procurement desk, oldest approval first.
pub async fn get_approved_budgets_for_procurement(
    db: &DatabaseConnection,
    actor: &user::Model,
) -> Result<Vec<budget_request::Model>> {
    require_role(actor, Role::Admin, "view the procurement queue")?;

    BudgetRequest::find()
        .filter(BudgetRequestColumn::Status.eq(BudgetStatus::Approved))
        .order_by_asc(BudgetRequestColumn::ApprovedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
