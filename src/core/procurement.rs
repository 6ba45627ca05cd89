//! Procurement lane on approved budget requests.
//!
//! Once a request is approved it moves through `Pending Procurement`, `In Progress`
//! and `Procured`. Company profile and delivery address can only be assigned while
//! the lane is still pending; both must be set before purchase order generation
//! will pick the request up.

use crate::{
    core::{budget::require_budget_request, master_data, require_role},
    entities::{BudgetStatus, ProcurementStatus, Role, budget_request, user},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Partial update of the procurement assignment. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementDetails {
    pub company_profile_id: Option<String>,
    pub delivery_address: Option<String>,
}

fn require_approved(request: &budget_request::Model, action: &str) -> Result<()> {
    if request.status == BudgetStatus::Approved {
        Ok(())
    } else {
        Err(Error::InvalidState {
            action: format!("{action} for request {}", request.id),
            current: request.status.to_string(),
        })
    }
}

/// Applies a company/address assignment to an approved request.
///
/// # Errors
/// [`Error::InvalidState`] unless the request is approved and its procurement
/// lane is still pending (a missing value counts as pending).
/// [`Error::Validation`] when a given value is blank; values are stored trimmed.
pub fn assign_details(
    request: &budget_request::Model,
    details: ProcurementDetails,
) -> Result<budget_request::Model> {
    require_approved(request, "assign procurement details")?;

    let current = request.effective_procurement_status();
    if current != ProcurementStatus::Pending {
        return Err(Error::InvalidState {
            action: format!("assign procurement details for request {}", request.id),
            current: current.to_string(),
        });
    }

    let mut next = request.clone();
    if let Some(company_profile_id) = details.company_profile_id {
        next.assigned_company_profile_id =
            Some(master_data::require_text(&company_profile_id, "Company profile")?);
    }
    if let Some(delivery_address) = details.delivery_address {
        next.assigned_delivery_address =
            Some(master_data::require_text(&delivery_address, "Delivery address")?);
    }
    Ok(next)
}

/// Overwrites the procurement status of an approved request.
///
/// Any status may follow any other, including moving back to pending.
pub fn set_status(
    request: &budget_request::Model,
    status: ProcurementStatus,
) -> Result<budget_request::Model> {
    require_approved(request, "update procurement status")?;

    let mut next = request.clone();
    next.procurement_status = Some(status);
    Ok(next)
}

/// Assigns company profile and/or delivery address to a request.
#[instrument(skip(db, actor, details), fields(actor = %actor.id))]
pub async fn assign_procurement_details(
    db: &DatabaseConnection,
    actor: &user::Model,
    budget_id: &str,
    details: ProcurementDetails,
) -> Result<budget_request::Model> {
    require_role(actor, Role::Admin, "assign procurement details")?;

    let txn = db.begin().await?;

    let request = require_budget_request(&txn, budget_id).await?;
    let next = assign_details(&request, details)?;

    if let Some(profile_id) = next
        .assigned_company_profile_id
        .as_ref()
        .filter(|id| request.assigned_company_profile_id.as_ref() != Some(*id))
    {
        master_data::get_company_profile(&txn, profile_id)
            .await?
            .ok_or_else(|| Error::not_found("Company profile", profile_id.clone()))?;
    }

    let updated = next.into_active_model().reset_all().update(&txn).await?;
    txn.commit().await?;

    info!(
        budget_id = %updated.id,
        company = ?updated.assigned_company_profile_id,
        address = ?updated.assigned_delivery_address,
        "Procurement details assigned"
    );
    Ok(updated)
}

/// Moves a request along its procurement lane.
#[instrument(skip(db, actor), fields(actor = %actor.id))]
pub async fn set_procurement_status(
    db: &DatabaseConnection,
    actor: &user::Model,
    budget_id: &str,
    status: ProcurementStatus,
) -> Result<budget_request::Model> {
    require_role(actor, Role::Admin, "update procurement status")?;

    let txn = db.begin().await?;
    let request = require_budget_request(&txn, budget_id).await?;
    let next = set_status(&request, status)?;

    let updated = next.into_active_model().reset_all().update(&txn).await?;
    txn.commit().await?;

    info!(
        budget_id = %updated.id,
        from = %request.effective_procurement_status(),
        to = %status,
        "Procurement status updated"
    );
    Ok(updated)
}
