//! Master data seeding from config.toml
//!
//! The seed file lists users, vendors, products, company profiles and delivery
//! addresses. On startup every listed record that is not yet in the database is
//! created; records that already exist are left alone so edits made through the
//! API survive a restart.

use crate::{
    core::master_data,
    entities::{Role, company_profile, delivery_address, product, user, vendor},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire seed file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub users: Vec<UserConfig>,
    pub vendors: Vec<VendorConfig>,
    pub products: Vec<ProductConfig>,
    pub company_profiles: Vec<CompanyProfileConfig>,
    pub delivery_addresses: Vec<DeliveryAddressConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub manager_id: Option<String>,
    pub bod_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VendorConfig {
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_address: String,
    pub vendor_contact: String,
    pub term_of_payment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub unit: String,
    /// Unit price in whole rupiah
    pub price: i64,
    pub vendor_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompanyProfileConfig {
    pub profile_id: String,
    pub company_name: String,
    pub company_address: String,
    pub npwp: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryAddressConfig {
    pub address_id: String,
    pub address_label: String,
    pub full_address: String,
}

impl From<UserConfig> for user::Model {
    fn from(c: UserConfig) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            role: c.role,
            department: c.department,
            manager_id: c.manager_id,
            bod_id: c.bod_id,
            password: c.password,
        }
    }
}

impl From<VendorConfig> for vendor::Model {
    fn from(c: VendorConfig) -> Self {
        Self {
            vendor_id: c.vendor_id,
            vendor_name: c.vendor_name,
            vendor_address: c.vendor_address,
            vendor_contact: c.vendor_contact,
            term_of_payment: c.term_of_payment,
        }
    }
}

impl From<ProductConfig> for product::Model {
    fn from(c: ProductConfig) -> Self {
        Self {
            id: c.id,
            name: c.name,
            image_url: c.image_url,
            unit: c.unit,
            price: c.price,
            vendor_id: c.vendor_id,
        }
    }
}

impl From<CompanyProfileConfig> for company_profile::Model {
    fn from(c: CompanyProfileConfig) -> Self {
        Self {
            profile_id: c.profile_id,
            company_name: c.company_name,
            company_address: c.company_address,
            npwp: c.npwp,
        }
    }
}

impl From<DeliveryAddressConfig> for delivery_address::Model {
    fn from(c: DeliveryAddressConfig) -> Self {
        Self {
            address_id: c.address_id,
            address_label: c.address_label,
            full_address: c.full_address,
        }
    }
}

/// Loads the seed configuration from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML for
/// this structure.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Counts of records created by one seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub vendors: usize,
    pub products: usize,
    pub company_profiles: usize,
    pub delivery_addresses: usize,
}

/// Creates every configured record that does not exist yet.
///
/// Vendors go in before products. Users are inserted once the users they point
/// at exist, so the file may list them in any order.
pub async fn seed_master_data(db: &DatabaseConnection, config: &SeedConfig) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for entry in &config.vendors {
        if master_data::get_vendor(db, &entry.vendor_id).await?.is_none() {
            master_data::insert_vendor(db, entry.clone().into()).await?;
            summary.vendors += 1;
        }
    }

    for entry in &config.products {
        if master_data::get_product(db, &entry.id).await?.is_none() {
            master_data::insert_product(db, entry.clone().into()).await?;
            summary.products += 1;
        }
    }

    for entry in &config.company_profiles {
        if master_data::get_company_profile(db, &entry.profile_id)
            .await?
            .is_none()
        {
            master_data::insert_company_profile(db, entry.clone().into()).await?;
            summary.company_profiles += 1;
        }
    }

    for entry in &config.delivery_addresses {
        if master_data::get_delivery_address(db, &entry.address_id)
            .await?
            .is_none()
        {
            master_data::insert_delivery_address(db, entry.clone().into()).await?;
            summary.delivery_addresses += 1;
        }
    }

    summary.users = seed_users(db, &config.users).await?;

    info!(?summary, "Master data seeding finished");
    Ok(summary)
}

async fn seed_users(db: &DatabaseConnection, users: &[UserConfig]) -> Result<usize> {
    let mut waiting: Vec<&UserConfig> = Vec::new();
    for entry in users {
        if master_data::get_user(db, &entry.id).await?.is_none() {
            waiting.push(entry);
        } else {
            debug!(user_id = %entry.id, "User already present, skipping");
        }
    }

    let mut created = 0;
    while !waiting.is_empty() {
        let mut deferred = Vec::new();
        for entry in waiting.iter().copied() {
            if links_exist(db, entry).await? {
                master_data::insert_user(db, entry.clone().into()).await?;
                created += 1;
            } else {
                deferred.push(entry);
            }
        }

        if deferred.len() == waiting.len() {
            let ids: Vec<&str> = deferred.iter().map(|u| u.id.as_str()).collect();
            return Err(Error::Config {
                message: format!(
                    "Seed users reference managers or BOD members that do not exist: {}",
                    ids.join(", ")
                ),
            });
        }
        waiting = deferred;
    }

    Ok(created)
}

async fn links_exist(db: &DatabaseConnection, entry: &UserConfig) -> Result<bool> {
    for linked in [&entry.manager_id, &entry.bod_id].into_iter().flatten() {
        if master_data::get_user(db, linked).await?.is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}
