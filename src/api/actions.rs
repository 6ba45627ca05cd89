//! Action names and payloads accepted by `POST /exec`, and their dispatch onto
//! the core.

use super::AppState;
use crate::{
    core::{
        approval::{self, RequestedLine},
        budget, master_data,
        procurement::{self, ProcurementDetails},
        purchase_order,
        report::{self, ReportFilter},
    },
    documents,
    entities::{ProcurementStatus, company_profile, delivery_address, product, user, vendor},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Reference to the acting user: either a bare id or a user object carrying `id`.
///
/// Only the id is trusted; the record (and role) is always reloaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActorRef {
    Id(String),
    User { id: String },
}

impl ActorRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::User { id } => id,
        }
    }
}

/// One `{action, data}` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "action",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    // Budget requests
    GetBudgetRequests {
        user: ActorRef,
    },
    GetPendingApprovals {
        user: ActorRef,
    },
    SubmitBudget {
        user: ActorRef,
        items: Vec<RequestedLine>,
    },
    ApproveBudget {
        budget_id: String,
        approver: ActorRef,
    },
    RejectBudget {
        budget_id: String,
        approver: ActorRef,
        reason: String,
    },

    // Procurement
    GetApprovedBudgetsForProcurement {
        actor: ActorRef,
    },
    UpdateProcurementStatus {
        budget_id: String,
        status: ProcurementStatus,
        actor: ActorRef,
    },
    UpdateBudgetProcurementDetails {
        budget_id: String,
        company_profile_id: Option<String>,
        delivery_address: Option<String>,
        actor: ActorRef,
    },
    GeneratePurchaseOrders {
        actor: ActorRef,
    },
    GetPurchaseOrders,
    CreatePoPdf {
        po_id: String,
    },

    // Reporting
    GetReport {
        user: ActorRef,
        #[serde(default)]
        filter: ReportFilter,
    },

    // Master data; reads are open, writes need an ADMIN actor
    GetUsers,
    AddUser {
        user: user::Model,
        actor: ActorRef,
    },
    UpdateUser {
        user: user::Model,
        actor: ActorRef,
    },
    DeleteUser {
        user_id: String,
        actor: ActorRef,
    },
    GetProducts,
    AddProduct {
        product: product::Model,
        actor: ActorRef,
    },
    UpdateProduct {
        product: product::Model,
        actor: ActorRef,
    },
    DeleteProduct {
        product_id: String,
        actor: ActorRef,
    },
    GetVendors,
    AddVendor {
        vendor: vendor::Model,
        actor: ActorRef,
    },
    UpdateVendor {
        vendor: vendor::Model,
        actor: ActorRef,
    },
    DeleteVendor {
        vendor_id: String,
        actor: ActorRef,
    },
    GetCompanyProfiles,
    AddCompanyProfile {
        company_profile: company_profile::Model,
        actor: ActorRef,
    },
    UpdateCompanyProfile {
        company_profile: company_profile::Model,
        actor: ActorRef,
    },
    DeleteCompanyProfile {
        profile_id: String,
        actor: ActorRef,
    },
    GetDeliveryAddresses,
    AddDeliveryAddress {
        delivery_address: delivery_address::Model,
        actor: ActorRef,
    },
    UpdateDeliveryAddress {
        delivery_address: delivery_address::Model,
        actor: ActorRef,
    },
    DeleteDeliveryAddress {
        address_id: String,
        actor: ActorRef,
    },
}

/// Acknowledgement returned by delete actions.
#[derive(Debug, Serialize)]
struct Deleted {
    id: String,
    status: &'static str,
}

impl Deleted {
    fn new(id: String) -> Self {
        Self {
            id,
            status: "deleted",
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(Into::into)
}

/// Runs one action and returns its `data` payload.
pub async fn dispatch(state: &AppState, action: Action) -> Result<Value> {
    let db = &state.db;
    debug!(?action, "Dispatching action");

    match action {
        Action::GetBudgetRequests { user } => {
            let viewer = master_data::require_user(db, user.id()).await?;
            to_json(budget::get_budget_requests(db, &viewer).await?)
        }
        Action::GetPendingApprovals { user } => {
            let approver = master_data::require_user(db, user.id()).await?;
            to_json(budget::get_pending_approvals(db, &approver).await?)
        }
        Action::SubmitBudget { user, items } => {
            to_json(approval::submit_budget(db, user.id(), &items).await?)
        }
        Action::ApproveBudget {
            budget_id,
            approver,
        } => to_json(approval::approve_budget(db, &budget_id, approver.id()).await?),
        Action::RejectBudget {
            budget_id,
            approver,
            reason,
        } => to_json(approval::reject_budget(db, &budget_id, approver.id(), &reason).await?),

        Action::GetApprovedBudgetsForProcurement { actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(budget::get_approved_budgets_for_procurement(db, &actor).await?)
        }
        Action::UpdateProcurementStatus {
            budget_id,
            status,
            actor,
        } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(procurement::set_procurement_status(db, &actor, &budget_id, status).await?)
        }
        Action::UpdateBudgetProcurementDetails {
            budget_id,
            company_profile_id,
            delivery_address,
            actor,
        } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            let details = ProcurementDetails {
                company_profile_id,
                delivery_address,
            };
            to_json(
                procurement::assign_procurement_details(db, &actor, &budget_id, details).await?,
            )
        }
        Action::GeneratePurchaseOrders { actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            let outcome = purchase_order::generate_purchase_orders(db, &actor).await?;
            to_json(outcome.purchase_orders)
        }
        Action::GetPurchaseOrders => to_json(purchase_order::get_purchase_orders(db).await?),
        Action::CreatePoPdf { po_id } => {
            let renderer = state.pdf.as_deref().ok_or_else(|| Error::ExternalService {
                message: "No PDF service is configured".to_string(),
            })?;
            to_json(documents::render_purchase_order_pdf(db, renderer, &po_id).await?)
        }

        Action::GetReport { user, filter } => {
            let viewer = master_data::require_user(db, user.id()).await?;
            to_json(report::get_report(db, &viewer, filter).await?)
        }

        Action::GetUsers => to_json(master_data::list_users(db).await?),
        Action::AddUser { user, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::create_user(db, &actor, user).await?)
        }
        Action::UpdateUser { user, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::update_user(db, &actor, user).await?)
        }
        Action::DeleteUser { user_id, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            master_data::delete_user(db, &actor, &user_id).await?;
            to_json(Deleted::new(user_id))
        }
        Action::GetProducts => to_json(master_data::list_products(db).await?),
        Action::AddProduct { product, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::create_product(db, &actor, product).await?)
        }
        Action::UpdateProduct { product, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::update_product(db, &actor, product).await?)
        }
        Action::DeleteProduct { product_id, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            master_data::delete_product(db, &actor, &product_id).await?;
            to_json(Deleted::new(product_id))
        }
        Action::GetVendors => to_json(master_data::list_vendors(db).await?),
        Action::AddVendor { vendor, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::create_vendor(db, &actor, vendor).await?)
        }
        Action::UpdateVendor { vendor, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::update_vendor(db, &actor, vendor).await?)
        }
        Action::DeleteVendor { vendor_id, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            master_data::delete_vendor(db, &actor, &vendor_id).await?;
            to_json(Deleted::new(vendor_id))
        }
        Action::GetCompanyProfiles => to_json(master_data::list_company_profiles(db).await?),
        Action::AddCompanyProfile {
            company_profile,
            actor,
        } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::create_company_profile(db, &actor, company_profile).await?)
        }
        Action::UpdateCompanyProfile {
            company_profile,
            actor,
        } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::update_company_profile(db, &actor, company_profile).await?)
        }
        Action::DeleteCompanyProfile { profile_id, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            master_data::delete_company_profile(db, &actor, &profile_id).await?;
            to_json(Deleted::new(profile_id))
        }
        Action::GetDeliveryAddresses => to_json(master_data::list_delivery_addresses(db).await?),
        Action::AddDeliveryAddress {
            delivery_address,
            actor,
        } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::create_delivery_address(db, &actor, delivery_address).await?)
        }
        Action::UpdateDeliveryAddress {
            delivery_address,
            actor,
        } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            to_json(master_data::update_delivery_address(db, &actor, delivery_address).await?)
        }
        Action::DeleteDeliveryAddress { address_id, actor } => {
            let actor = master_data::require_user(db, actor.id()).await?;
            master_data::delete_delivery_address(db, &actor, &address_id).await?;
            to_json(Deleted::new(address_id))
        }
    }
}
