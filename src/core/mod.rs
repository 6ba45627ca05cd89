//! Core business logic - framework-agnostic workflow, procurement and reporting.
//!
//! The state rules are plain functions over entity models; the async functions next
//! to them load records, apply a rule and persist the outcome inside one database
//! transaction, so a failed rule never leaves a partial write behind.

/// Approval state machine: submit, approve, reject
pub mod approval;
/// Role-scoped budget request queries
pub mod budget;
/// Master data catalogue: users, vendors, products, companies, addresses
pub mod master_data;
/// Procurement lane on approved requests
pub mod procurement;
/// Purchase order aggregation and generation
pub mod purchase_order;
/// Read-only rollups over budget requests
pub mod report;

use crate::{
    entities::{Role, user},
    errors::{Error, Result},
};

/// Manager approvals strictly above this total are escalated to the BOD.
pub const BOD_ESCALATION_THRESHOLD: i64 = 5_000_000;

/// Generates a prefixed identifier such as `BR-4f0c...`.
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// Fails with [`Error::Authorization`] unless `actor` holds `role`.
pub fn require_role(actor: &user::Model, role: Role, action: &str) -> Result<()> {
    if actor.role == role {
        Ok(())
    } else {
        Err(Error::Authorization {
            message: format!(
                "{} ({}) cannot {action}; requires role {role}",
                actor.name, actor.role
            ),
        })
    }
}
