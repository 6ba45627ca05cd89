//! Delivery address entity - Named shipping destinations for procured goods.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery address database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_addresses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default)]
    pub address_id: String,
    /// Short label (e.g. "Gudang Pusat")
    pub address_label: String,
    /// Full address text; this text, not the id, is copied onto requests and orders
    pub full_address: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
