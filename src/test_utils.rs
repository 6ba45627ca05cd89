//! Shared test utilities for `budget-flow`.
//!
//! This module provides helpers for setting up test databases, building entity
//! models with sensible defaults, and walking requests through the workflow.

use crate::{
    core::{
        approval::{self, RequestedLine},
        master_data,
        procurement::{self, ProcurementDetails},
    },
    entities::{
        BudgetItem, BudgetStatus, ProcurementStatus, Role, budget_request, company_profile,
        delivery_address, product, user, vendor,
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a user model without approver links.
///
/// # Defaults
/// * `name`: `"{id} name"`
/// * `email`: `"{id}@budget.test"`
/// * `department`: `"General"`
#[must_use]
pub fn sample_user(id: &str, role: Role) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: format!("{id} name"),
        email: format!("{id}@budget.test"),
        role,
        department: "General".to_string(),
        manager_id: None,
        bod_id: None,
        password: None,
    }
}

#[must_use]
pub fn sample_vendor(id: &str) -> vendor::Model {
    vendor::Model {
        vendor_id: id.to_string(),
        vendor_name: format!("CV {id}"),
        vendor_address: "Jl. Industri No. 1, Jakarta".to_string(),
        vendor_contact: "021-5550100".to_string(),
        term_of_payment: "30 days".to_string(),
    }
}

/// Builds a product model.
///
/// # Defaults
/// * `name`: `"Product {id}"`
/// * `unit`: `"Pcs"`
#[must_use]
pub fn sample_product(id: &str, vendor_id: &str, price: i64) -> product::Model {
    product::Model {
        id: id.to_string(),
        name: format!("Product {id}"),
        image_url: format!("https://picsum.photos/seed/{id}/200"),
        unit: "Pcs".to_string(),
        price,
        vendor_id: vendor_id.to_string(),
    }
}

/// Builds a line item for `product_id` with a consistent total.
#[must_use]
pub fn sample_item(product_id: &str, price: i64, qty: u32) -> BudgetItem {
    BudgetItem::from_product(&sample_product(product_id, "vendor-1", price), qty)
}

/// Builds a request pending manager approval, submitted by `user-1` and routed to
/// `manager-1` and `bod-1`.
#[must_use]
pub fn sample_request(id: &str, items: Vec<BudgetItem>) -> budget_request::Model {
    let items = crate::entities::BudgetItems(items);
    budget_request::Model {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        user_name: "user-1 name".to_string(),
        department: "Marketing".to_string(),
        total: items.grand_total(),
        items,
        status: BudgetStatus::PendingManagerApproval,
        procurement_status: None,
        submitted_at: Utc::now(),
        manager_approver_id: Some("manager-1".to_string()),
        bod_approver_id: Some("bod-1".to_string()),
        approved_at: None,
        rejected_at: None,
        rejected_reason: None,
        po_generated: false,
        assigned_company_profile_id: None,
        assigned_delivery_address: None,
    }
}

pub async fn create_test_vendor(db: &DatabaseConnection, id: &str) -> Result<vendor::Model> {
    master_data::insert_vendor(db, sample_vendor(id)).await
}

pub async fn create_test_product(
    db: &DatabaseConnection,
    id: &str,
    vendor_id: &str,
    price: i64,
) -> Result<product::Model> {
    master_data::insert_product(db, sample_product(id, vendor_id, price)).await
}

pub async fn create_test_company(
    db: &DatabaseConnection,
    id: &str,
) -> Result<company_profile::Model> {
    master_data::insert_company_profile(
        db,
        company_profile::Model {
            profile_id: id.to_string(),
            company_name: format!("PT {id}"),
            company_address: "Jl. Jend. Sudirman Kav. 52, Jakarta".to_string(),
            npwp: "01.234.567.8-901.000".to_string(),
        },
    )
    .await
}

pub async fn create_test_address(
    db: &DatabaseConnection,
    id: &str,
) -> Result<delivery_address::Model> {
    master_data::insert_delivery_address(
        db,
        delivery_address::Model {
            address_id: id.to_string(),
            address_label: "Gudang Utama".to_string(),
            full_address: "Jl. Raya Bekasi Km. 21, Jakarta Timur".to_string(),
        },
    )
    .await
}

/// A small organisation: two reporting lines, one BOD, one admin, a catalogue of
/// three products over two vendors, one company and one delivery address.
pub struct TestOrg {
    /// Marketing user reporting to `manager` and `bod`
    pub requester: user::Model,
    /// Sales user reporting to `other_manager` and `bod`
    pub outsider: user::Model,
    pub manager: user::Model,
    pub other_manager: user::Model,
    pub bod: user::Model,
    pub admin: user::Model,
    /// 45,000 from `vendor-1`
    pub paper: product::Model,
    /// 150,000 from `vendor-1`
    pub ink: product::Model,
    /// 12,500,000 from `vendor-2`, above the escalation threshold on its own
    pub laptop: product::Model,
    pub company: company_profile::Model,
    pub address: delivery_address::Model,
}

/// Sets up a test database populated with a [`TestOrg`].
pub async fn setup_with_org() -> Result<(DatabaseConnection, TestOrg)> {
    let db = setup_test_db().await?;

    let bod = master_data::insert_user(&db, sample_user("bod-1", Role::Bod)).await?;
    let admin = master_data::insert_user(&db, sample_user("admin-1", Role::Admin)).await?;
    let manager = master_data::insert_user(&db, sample_user("manager-1", Role::Manager)).await?;
    let other_manager =
        master_data::insert_user(&db, sample_user("manager-2", Role::Manager)).await?;

    let mut requester = sample_user("user-1", Role::User);
    requester.department = "Marketing".to_string();
    requester.manager_id = Some(manager.id.clone());
    requester.bod_id = Some(bod.id.clone());
    let requester = master_data::insert_user(&db, requester).await?;

    let mut outsider = sample_user("user-2", Role::User);
    outsider.department = "Sales".to_string();
    outsider.manager_id = Some(other_manager.id.clone());
    outsider.bod_id = Some(bod.id.clone());
    let outsider = master_data::insert_user(&db, outsider).await?;

    create_test_vendor(&db, "vendor-1").await?;
    create_test_vendor(&db, "vendor-2").await?;
    let paper = create_test_product(&db, "prod-001", "vendor-1", 45_000).await?;
    let ink = create_test_product(&db, "prod-002", "vendor-1", 150_000).await?;
    let laptop = create_test_product(&db, "prod-003", "vendor-2", 12_500_000).await?;

    let company = create_test_company(&db, "company-1").await?;
    let address = create_test_address(&db, "addr-1").await?;

    let org = TestOrg {
        requester,
        outsider,
        manager,
        other_manager,
        bod,
        admin,
        paper,
        ink,
        laptop,
        company,
        address,
    };
    Ok((db, org))
}

/// Submits `qty` of `product` as `submitter`.
pub async fn submit_test_request_as(
    db: &DatabaseConnection,
    submitter: &user::Model,
    product: &product::Model,
    qty: u32,
) -> Result<budget_request::Model> {
    approval::submit_budget(
        db,
        &submitter.id,
        &[RequestedLine {
            product_id: product.id.clone(),
            qty,
        }],
    )
    .await
}

/// Submits `qty` of `product` as the org's requester.
pub async fn submit_test_request(
    db: &DatabaseConnection,
    org: &TestOrg,
    product: &product::Model,
    qty: u32,
) -> Result<budget_request::Model> {
    submit_test_request_as(db, &org.requester, product, qty).await
}

/// Submits and fully approves a request, going through the BOD when the total
/// needs it.
pub async fn approved_test_request(
    db: &DatabaseConnection,
    org: &TestOrg,
    product: &product::Model,
    qty: u32,
) -> Result<budget_request::Model> {
    let request = submit_test_request(db, org, product, qty).await?;
    let mut request = approval::approve_budget(db, &request.id, &org.manager.id).await?;
    if request.status == BudgetStatus::PendingBodApproval {
        request = approval::approve_budget(db, &request.id, &org.bod.id).await?;
    }
    Ok(request)
}

/// An approved request with company and address assigned and procurement in
/// progress, ready for purchase order generation.
pub async fn ready_test_request(
    db: &DatabaseConnection,
    org: &TestOrg,
    product: &product::Model,
    qty: u32,
) -> Result<budget_request::Model> {
    let request = approved_test_request(db, org, product, qty).await?;
    procurement::assign_procurement_details(
        db,
        &org.admin,
        &request.id,
        ProcurementDetails {
            company_profile_id: Some(org.company.profile_id.clone()),
            delivery_address: Some(org.address.full_address.clone()),
        },
    )
    .await?;
    procurement::set_procurement_status(
        db,
        &org.admin,
        &request.id,
        ProcurementStatus::InProgress,
    )
    .await
}
