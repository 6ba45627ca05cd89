//! Master data business logic - Users, vendors, products, company profiles and
//! delivery addresses.
//!
//! These records carry no workflow rules of their own. Creation validates required
//! text fields, fills in a generated id when none was given, and checks the few
//! references that exist (product → vendor, user → manager/BOD). Updates are full
//! replacements of the stored row; deletes are hard deletes.
//!
//! Every write takes the acting user and requires ADMIN. The `insert_*` functions
//! skip that check and exist for seeding.

use crate::{
    core::{new_id, require_role},
    entities::{
        CompanyProfile, DeliveryAddress, Product, Role, User, Vendor, company_profile,
        delivery_address, product, user, vendor,
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, QueryOrder, prelude::*};
use tracing::{info, warn};

/// Trims `value`, failing with [`Error::Validation`] when nothing is left.
pub(crate) fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn id_or_generated(id: &str, prefix: &str) -> String {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        new_id(prefix)
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Looks a user up by id.
pub async fn get_user<C>(db: &C, user_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks a user up by id, failing with [`Error::NotFound`] when absent.
pub async fn require_user<C>(db: &C, user_id: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Lists all users ordered by name.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn check_user_links(db: &DatabaseConnection, candidate: &user::Model) -> Result<()> {
    for linked in [&candidate.manager_id, &candidate.bod_id].into_iter().flatten() {
        if linked == &candidate.id {
            return Err(Error::validation("A user cannot approve their own requests"));
        }
        require_user(db, linked).await?;
    }

    if candidate.role == Role::User
        && (candidate.manager_id.is_none() || candidate.bod_id.is_none())
    {
        warn!(
            user_id = %candidate.id,
            "User is missing a manager or BOD reference; their requests cannot be fully routed"
        );
    }
    Ok(())
}

fn normalized_user(candidate: user::Model) -> Result<user::Model> {
    Ok(user::Model {
        id: id_or_generated(&candidate.id, "user"),
        name: require_text(&candidate.name, "User name")?,
        email: require_text(&candidate.email, "Email")?,
        department: candidate.department.trim().to_string(),
        ..candidate
    })
}

/// Creates a user. Manager and BOD references must point at existing users.
pub async fn create_user(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: user::Model,
) -> Result<user::Model> {
    require_role(actor, Role::Admin, "create users")?;
    insert_user(db, candidate).await
}

pub(crate) async fn insert_user(
    db: &DatabaseConnection,
    candidate: user::Model,
) -> Result<user::Model> {
    let candidate = normalized_user(candidate)?;
    check_user_links(db, &candidate).await?;

    let created = candidate.into_active_model().insert(db).await?;
    info!(user_id = %created.id, role = %created.role, "Created user");
    Ok(created)
}

/// Replaces an existing user record.
pub async fn update_user(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: user::Model,
) -> Result<user::Model> {
    require_role(actor, Role::Admin, "update users")?;
    let mut candidate = normalized_user(candidate)?;
    let existing = require_user(db, &candidate.id).await?;
    check_user_links(db, &candidate).await?;

    // An omitted credential keeps the stored one.
    if candidate.password.is_none() {
        candidate.password = existing.password;
    }
    candidate
        .into_active_model()
        .reset_all()
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes a user by id.
pub async fn delete_user(
    db: &DatabaseConnection,
    actor: &user::Model,
    user_id: &str,
) -> Result<()> {
    require_role(actor, Role::Admin, "delete users")?;
    let existing = require_user(db, user_id).await?;
    existing.delete(db).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

/// Looks a vendor up by id.
pub async fn get_vendor<C>(db: &C, vendor_id: &str) -> Result<Option<vendor::Model>>
where
    C: ConnectionTrait,
{
    Vendor::find_by_id(vendor_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all vendors ordered by name.
pub async fn list_vendors<C>(db: &C) -> Result<Vec<vendor::Model>>
where
    C: ConnectionTrait,
{
    Vendor::find()
        .order_by_asc(vendor::Column::VendorName)
        .all(db)
        .await
        .map_err(Into::into)
}

fn normalized_vendor(candidate: vendor::Model) -> Result<vendor::Model> {
    Ok(vendor::Model {
        vendor_id: id_or_generated(&candidate.vendor_id, "vendor"),
        vendor_name: require_text(&candidate.vendor_name, "Vendor name")?,
        ..candidate
    })
}

/// Creates a vendor.
pub async fn create_vendor(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: vendor::Model,
) -> Result<vendor::Model> {
    require_role(actor, Role::Admin, "create vendors")?;
    insert_vendor(db, candidate).await
}

pub(crate) async fn insert_vendor(
    db: &DatabaseConnection,
    candidate: vendor::Model,
) -> Result<vendor::Model> {
    let candidate = normalized_vendor(candidate)?;
    candidate
        .into_active_model()
        .insert(db)
        .await
        .map_err(Into::into)
}

/// Replaces an existing vendor record.
pub async fn update_vendor(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: vendor::Model,
) -> Result<vendor::Model> {
    require_role(actor, Role::Admin, "update vendors")?;
    let candidate = normalized_vendor(candidate)?;
    get_vendor(db, &candidate.vendor_id)
        .await?
        .ok_or_else(|| Error::not_found("Vendor", candidate.vendor_id.clone()))?;
    candidate
        .into_active_model()
        .reset_all()
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes a vendor. Fails while products still reference it.
pub async fn delete_vendor(
    db: &DatabaseConnection,
    actor: &user::Model,
    vendor_id: &str,
) -> Result<()> {
    require_role(actor, Role::Admin, "delete vendors")?;
    let existing = get_vendor(db, vendor_id)
        .await?
        .ok_or_else(|| Error::not_found("Vendor", vendor_id))?;

    let referencing = Product::find()
        .filter(product::Column::VendorId.eq(vendor_id))
        .count(db)
        .await?;
    if referencing > 0 {
        return Err(Error::DataIntegrity {
            message: format!("Vendor {vendor_id} is still referenced by {referencing} product(s)"),
        });
    }

    existing.delete(db).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Looks a product up by id.
pub async fn get_product<C>(db: &C, product_id: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all products ordered by name.
pub async fn list_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn normalized_product(
    db: &DatabaseConnection,
    candidate: product::Model,
) -> Result<product::Model> {
    if candidate.price < 0 {
        return Err(Error::validation(format!(
            "Product price cannot be negative (got {})",
            candidate.price
        )));
    }
    get_vendor(db, &candidate.vendor_id)
        .await?
        .ok_or_else(|| Error::not_found("Vendor", candidate.vendor_id.clone()))?;

    Ok(product::Model {
        id: id_or_generated(&candidate.id, "prod"),
        name: require_text(&candidate.name, "Product name")?,
        unit: require_text(&candidate.unit, "Unit")?,
        ..candidate
    })
}

/// Creates a product. Its vendor must exist and its price must not be negative.
pub async fn create_product(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: product::Model,
) -> Result<product::Model> {
    require_role(actor, Role::Admin, "create products")?;
    insert_product(db, candidate).await
}

pub(crate) async fn insert_product(
    db: &DatabaseConnection,
    candidate: product::Model,
) -> Result<product::Model> {
    let candidate = normalized_product(db, candidate).await?;
    candidate
        .into_active_model()
        .insert(db)
        .await
        .map_err(Into::into)
}

/// Replaces an existing product.
///
/// Requests already submitted keep their price snapshot; only new submissions see
/// the change.
pub async fn update_product(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: product::Model,
) -> Result<product::Model> {
    require_role(actor, Role::Admin, "update products")?;
    let candidate = normalized_product(db, candidate).await?;
    get_product(db, &candidate.id)
        .await?
        .ok_or_else(|| Error::not_found("Product", candidate.id.clone()))?;
    candidate
        .into_active_model()
        .reset_all()
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes a product by id.
pub async fn delete_product(
    db: &DatabaseConnection,
    actor: &user::Model,
    product_id: &str,
) -> Result<()> {
    require_role(actor, Role::Admin, "delete products")?;
    let existing = get_product(db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?;
    existing.delete(db).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Company profiles
// ---------------------------------------------------------------------------

/// Looks a company profile up by id.
pub async fn get_company_profile<C>(
    db: &C,
    profile_id: &str,
) -> Result<Option<company_profile::Model>>
where
    C: ConnectionTrait,
{
    CompanyProfile::find_by_id(profile_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all company profiles ordered by name.
pub async fn list_company_profiles(
    db: &DatabaseConnection,
) -> Result<Vec<company_profile::Model>> {
    CompanyProfile::find()
        .order_by_asc(company_profile::Column::CompanyName)
        .all(db)
        .await
        .map_err(Into::into)
}

fn normalized_company_profile(
    candidate: company_profile::Model,
) -> Result<company_profile::Model> {
    Ok(company_profile::Model {
        profile_id: id_or_generated(&candidate.profile_id, "company"),
        company_name: require_text(&candidate.company_name, "Company name")?,
        company_address: require_text(&candidate.company_address, "Company address")?,
        ..candidate
    })
}

/// Creates a company profile.
pub async fn create_company_profile(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: company_profile::Model,
) -> Result<company_profile::Model> {
    require_role(actor, Role::Admin, "create company profiles")?;
    insert_company_profile(db, candidate).await
}

pub(crate) async fn insert_company_profile(
    db: &DatabaseConnection,
    candidate: company_profile::Model,
) -> Result<company_profile::Model> {
    let candidate = normalized_company_profile(candidate)?;
    candidate
        .into_active_model()
        .insert(db)
        .await
        .map_err(Into::into)
}

/// Replaces an existing company profile.
pub async fn update_company_profile(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: company_profile::Model,
) -> Result<company_profile::Model> {
    require_role(actor, Role::Admin, "update company profiles")?;
    let candidate = normalized_company_profile(candidate)?;
    get_company_profile(db, &candidate.profile_id)
        .await?
        .ok_or_else(|| Error::not_found("Company profile", candidate.profile_id.clone()))?;
    candidate
        .into_active_model()
        .reset_all()
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes a company profile by id.
pub async fn delete_company_profile(
    db: &DatabaseConnection,
    actor: &user::Model,
    profile_id: &str,
) -> Result<()> {
    require_role(actor, Role::Admin, "delete company profiles")?;
    let existing = get_company_profile(db, profile_id)
        .await?
        .ok_or_else(|| Error::not_found("Company profile", profile_id))?;
    existing.delete(db).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Delivery addresses
// ---------------------------------------------------------------------------

/// Looks a delivery address up by id.
pub async fn get_delivery_address(
    db: &DatabaseConnection,
    address_id: &str,
) -> Result<Option<delivery_address::Model>> {
    DeliveryAddress::find_by_id(address_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all delivery addresses ordered by label.
pub async fn list_delivery_addresses(
    db: &DatabaseConnection,
) -> Result<Vec<delivery_address::Model>> {
    DeliveryAddress::find()
        .order_by_asc(delivery_address::Column::AddressLabel)
        .all(db)
        .await
        .map_err(Into::into)
}

fn normalized_delivery_address(
    candidate: delivery_address::Model,
) -> Result<delivery_address::Model> {
    Ok(delivery_address::Model {
        address_id: id_or_generated(&candidate.address_id, "addr"),
        address_label: require_text(&candidate.address_label, "Address label")?,
        full_address: require_text(&candidate.full_address, "Full address")?,
    })
}

/// Creates a delivery address.
pub async fn create_delivery_address(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: delivery_address::Model,
) -> Result<delivery_address::Model> {
    require_role(actor, Role::Admin, "create delivery addresses")?;
    insert_delivery_address(db, candidate).await
}

pub(crate) async fn insert_delivery_address(
    db: &DatabaseConnection,
    candidate: delivery_address::Model,
) -> Result<delivery_address::Model> {
    let candidate = normalized_delivery_address(candidate)?;
    candidate
        .into_active_model()
        .insert(db)
        .await
        .map_err(Into::into)
}

/// Replaces an existing delivery address.
pub async fn update_delivery_address(
    db: &DatabaseConnection,
    actor: &user::Model,
    candidate: delivery_address::Model,
) -> Result<delivery_address::Model> {
    require_role(actor, Role::Admin, "update delivery addresses")?;
    let candidate = normalized_delivery_address(candidate)?;
    get_delivery_address(db, &candidate.address_id)
        .await?
        .ok_or_else(|| Error::not_found("Delivery address", candidate.address_id.clone()))?;
    candidate
        .into_active_model()
        .reset_all()
        .update(db)
        .await
        .map_err(Into::into)
}

/// Deletes a delivery address by id.
pub async fn delete_delivery_address(
    db: &DatabaseConnection,
    actor: &user::Model,
    address_id: &str,
) -> Result<()> {
    require_role(actor, Role::Admin, "delete delivery addresses")?;
    let existing = get_delivery_address(db, address_id)
        .await?
        .ok_or_else(|| Error::not_found("Delivery address", address_id))?;
    existing.delete(db).await?;
    Ok(())
}
