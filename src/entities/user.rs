//! User entity - Employees, approvers and administrators.
//!
//! A USER normally carries both a manager and a BOD reference; those two ids are
//! copied onto every request the user submits and decide who may approve it.

use super::sea_orm_active_enums::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier (e.g. `"user-1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    #[sea_orm(unique)]
    pub email: String,
    /// The single role held by this user
    pub role: Role,
    /// Free-text department name
    pub department: String,
    /// First-level approver for this user's requests
    pub manager_id: Option<String>,
    /// Escalation approver for this user's requests
    pub bod_id: Option<String>,
    /// Opaque credential handled by the external auth collaborator
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user submits many budget requests
    #[sea_orm(has_many = "super::budget_request::Entity")]
    BudgetRequests,
}

impl Related<super::budget_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
