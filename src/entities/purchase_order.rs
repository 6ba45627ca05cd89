//! Purchase order entity - One vendor-facing order aggregated from approved requests.
//!
//! Rows are only ever inserted by the purchase order generator and never updated.

use super::budget_item::{BudgetItems, RelatedBudgetIds};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub po_id: String,
    pub vendor_id: String,
    /// Vendor name at generation time
    pub vendor_name: String,
    pub date_issued: DateTimeUtc,
    /// One line per product, quantities summed across contributing requests
    pub items: BudgetItems,
    pub total_amount: i64,
    pub related_budget_ids: RelatedBudgetIds,
    pub company_profile_id: String,
    pub delivery_address: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
