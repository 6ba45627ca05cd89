//! Enumerations stored as string columns.
//!
//! The string values double as the wire representation, so API payloads carry the
//! same labels the database does (`"Pending Manager Approval"`, `"In Progress"`, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user. Exactly one per user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    /// Employee submitting budget requests
    #[sea_orm(string_value = "USER")]
    #[serde(rename = "USER")]
    User,
    /// First-level approver for the users that report to them
    #[sea_orm(string_value = "MANAGER")]
    #[serde(rename = "MANAGER")]
    Manager,
    /// Board of directors, final authority on escalated requests
    #[sea_orm(string_value = "BOD")]
    #[serde(rename = "BOD")]
    Bod,
    /// Procurement operator and master data owner
    #[sea_orm(string_value = "ADMIN")]
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    /// Wire label of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Manager => "MANAGER",
            Self::Bod => "BOD",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of a budget request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum BudgetStatus {
    #[sea_orm(string_value = "DRAFT")]
    #[serde(rename = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "Pending Manager Approval")]
    #[serde(rename = "Pending Manager Approval")]
    PendingManagerApproval,
    #[sea_orm(string_value = "Pending BOD Approval")]
    #[serde(rename = "Pending BOD Approval")]
    PendingBodApproval,
    #[sea_orm(string_value = "Approved")]
    #[serde(rename = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    #[serde(rename = "Rejected")]
    Rejected,
}

impl BudgetStatus {
    /// Display label of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingManagerApproval => "Pending Manager Approval",
            Self::PendingBodApproval => "Pending BOD Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// True for the two states that still await an approver.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::PendingManagerApproval | Self::PendingBodApproval)
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-approval procurement stage.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ProcurementStatus {
    #[default]
    #[sea_orm(string_value = "Pending Procurement")]
    #[serde(rename = "Pending Procurement")]
    Pending,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Procured")]
    #[serde(rename = "Procured")]
    Procured,
}

impl ProcurementStatus {
    /// Display label of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending Procurement",
            Self::InProgress => "In Progress",
            Self::Procured => "Procured",
        }
    }
}

impl fmt::Display for ProcurementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
