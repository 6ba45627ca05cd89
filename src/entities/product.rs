//! Product entity - Catalogue items that budget requests are built from.
//!
//! Each product belongs to exactly one vendor; that link is what splits a budget
//! request across purchase orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier (e.g. `"prod-001"`)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default)]
    pub id: String,
    /// Name of the product (e.g. "Kertas HVS A4 70gr")
    pub name: String,
    /// Image reference shown next to the product
    pub image_url: String,
    /// Unit label (e.g. "Rim", "Box")
    pub unit: String,
    /// Unit price in whole currency units, never negative
    pub price: i64,
    /// ID of the vendor supplying this product
    pub vendor_id: String,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one vendor
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::VendorId"
    )]
    Vendor,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
