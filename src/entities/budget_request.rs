//! Budget request entity - A submitted purchase request and its workflow state.
//!
//! Two independent lanes live on one row: the approval `status` and, once that is
//! `Approved`, the `procurement_status`. Company and delivery address are filled in
//! during procurement and consumed by purchase order generation.

use super::budget_item::BudgetItems;
use super::sea_orm_active_enums::{BudgetStatus, ProcurementStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_requests")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Submitting user
    pub user_id: String,
    /// Submitter name at submission time
    pub user_name: String,
    /// Submitter department at submission time
    pub department: String,
    /// Requested lines, only those with a positive quantity
    pub items: BudgetItems,
    /// Sum of item totals
    pub total: i64,
    pub status: BudgetStatus,
    /// Only meaningful once `status` is `Approved`
    pub procurement_status: Option<ProcurementStatus>,
    pub submitted_at: DateTimeUtc,
    /// Designated manager-stage approver
    pub manager_approver_id: Option<String>,
    /// Designated BOD-stage approver
    pub bod_approver_id: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    /// Present exactly when `status` is `Rejected`
    pub rejected_reason: Option<String>,
    /// Set once the request has been swept into a purchase order
    pub po_generated: bool,
    pub assigned_company_profile_id: Option<String>,
    pub assigned_delivery_address: Option<String>,
}

impl Model {
    /// Procurement stage with a missing value read as `Pending`.
    #[must_use]
    pub fn effective_procurement_status(&self) -> ProcurementStatus {
        self.procurement_status.unwrap_or_default()
    }

    /// Whether the next purchase order sweep should pick this request up.
    #[must_use]
    pub fn is_ready_for_purchase_order(&self) -> bool {
        self.status == BudgetStatus::Approved
            && self.procurement_status == Some(ProcurementStatus::InProgress)
            && self.assigned_company_profile_id.is_some()
            && self.assigned_delivery_address.is_some()
            && !self.po_generated
    }
}

/// Defines relationships between `BudgetRequest` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request belongs to the user who submitted it
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
