//! Company profile entity - The buying legal entity printed on purchase orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_profiles")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default)]
    pub profile_id: String,
    pub company_name: String,
    pub company_address: String,
    /// Tax registration number
    pub npwp: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
