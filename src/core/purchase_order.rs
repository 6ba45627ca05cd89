//! Purchase order generation - Sweeps procurement-ready requests into vendor orders.
//!
//! A request is ready once it is approved, its procurement lane is `In Progress`,
//! both company profile and delivery address are assigned and it has not been swept
//! before. Every item of a ready request is routed to the vendor of its product and
//! grouped with the other items sharing vendor, company and address. Inside a group
//! repeated products collapse into one line: the first occurrence is kept and later
//! ones add their quantity and total onto it.

use crate::{
    core::{master_data, new_id, require_role},
    entities::{
        BudgetItem, BudgetItems, BudgetRequest, BudgetRequestColumn, BudgetStatus,
        ProcurementStatus, PurchaseOrder, PurchaseOrderColumn, RelatedBudgetIds, Role,
        budget_request, product, purchase_order, user, vendor,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, IntoActiveModel, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument, warn};

/// Product and vendor lookup used to route items.
#[derive(Debug, Default)]
pub struct Catalogue {
    products: HashMap<String, product::Model>,
    vendors: HashMap<String, vendor::Model>,
}

impl Catalogue {
    #[must_use]
    pub fn new(products: Vec<product::Model>, vendors: Vec<vendor::Model>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            vendors: vendors.into_iter().map(|v| (v.vendor_id.clone(), v)).collect(),
        }
    }

    /// Vendor supplying `product_id`.
    ///
    /// # Errors
    /// [`Error::DataIntegrity`] when the product or its vendor no longer exists.
    pub fn vendor_for(&self, product_id: &str) -> Result<&vendor::Model> {
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| Error::DataIntegrity {
                message: format!("product {product_id} is not in the catalogue"),
            })?;

        self.vendors
            .get(&product.vendor_id)
            .ok_or_else(|| Error::DataIntegrity {
                message: format!(
                    "vendor {} of product {product_id} does not exist",
                    product.vendor_id
                ),
            })
    }
}

/// An item left out of every purchase order because it could not be routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub budget_id: String,
    pub product_id: String,
    pub reason: String,
}

/// Result of one aggregation pass.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// New orders, ordered by vendor, company and address
    pub orders: Vec<purchase_order::Model>,
    /// Requests that placed at least one item, in scan order
    pub contributing: Vec<String>,
    pub skipped: Vec<SkippedItem>,
}

/// What a generation run produced.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub purchase_orders: Vec<purchase_order::Model>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    vendor_id: String,
    company_profile_id: String,
    delivery_address: String,
}

#[derive(Debug, Default)]
struct Group {
    vendor_name: String,
    items: Vec<BudgetItem>,
    related: Vec<String>,
}

impl Group {
    fn add(&mut self, budget_id: &str, item: &BudgetItem) {
        match self.items.iter_mut().find(|line| line.product_id == item.product_id) {
            Some(line) => line.absorb(item),
            None => self.items.push(item.clone()),
        }
        if !self.related.iter().any(|id| id == budget_id) {
            self.related.push(budget_id.to_string());
        }
    }
}

/// Builds purchase orders from `requests`.
///
/// Requests that are not ready are ignored. Items whose product or vendor cannot
/// be resolved are reported in [`Aggregation::skipped`] and the rest of the batch
/// carries on.
#[must_use]
pub fn aggregate(
    requests: &[budget_request::Model],
    catalogue: &Catalogue,
    issued_at: DateTime<Utc>,
) -> Aggregation {
    let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();
    let mut aggregation = Aggregation::default();

    for request in requests
        .iter()
        .filter(|r| r.is_ready_for_purchase_order() && !r.po_generated)
    {
        let (Some(company), Some(address)) = (
            request.assigned_company_profile_id.as_ref(),
            request.assigned_delivery_address.as_ref(),
        ) else {
            continue;
        };

        let mut placed = false;
        for item in request.items.iter() {
            let vendor = match catalogue.vendor_for(&item.product_id) {
                Ok(vendor) => vendor,
                Err(e) => {
                    aggregation.skipped.push(SkippedItem {
                        budget_id: request.id.clone(),
                        product_id: item.product_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let key = GroupKey {
                vendor_id: vendor.vendor_id.clone(),
                company_profile_id: company.clone(),
                delivery_address: address.clone(),
            };
            let group = groups.entry(key).or_insert_with(|| Group {
                vendor_name: vendor.vendor_name.clone(),
                ..Group::default()
            });
            group.add(&request.id, item);
            placed = true;
        }

        if placed {
            aggregation.contributing.push(request.id.clone());
        }
    }

    aggregation.orders = groups
        .into_iter()
        .map(|(key, group)| {
            let items = BudgetItems(group.items);
            purchase_order::Model {
                po_id: new_id("PO"),
                vendor_id: key.vendor_id,
                vendor_name: group.vendor_name,
                date_issued: issued_at,
                total_amount: items.grand_total(),
                items,
                related_budget_ids: RelatedBudgetIds(group.related),
                company_profile_id: key.company_profile_id,
                delivery_address: key.delivery_address,
            }
        })
        .collect();

    aggregation
}

/// Generates purchase orders for every ready request and marks the requests that
/// contributed.
///
/// Scanning, inserting and marking happen in one transaction. Nothing ready is not
/// an error; the outcome is simply empty.
#[instrument(skip(db, actor), fields(actor = %actor.id))]
pub async fn generate_purchase_orders(
    db: &DatabaseConnection,
    actor: &user::Model,
) -> Result<GenerationOutcome> {
    require_role(actor, Role::Admin, "generate purchase orders")?;

    let txn = db.begin().await?;

    let ready = BudgetRequest::find()
        .filter(BudgetRequestColumn::Status.eq(BudgetStatus::Approved))
        .filter(BudgetRequestColumn::ProcurementStatus.eq(ProcurementStatus::InProgress))
        .filter(BudgetRequestColumn::AssignedCompanyProfileId.is_not_null())
        .filter(BudgetRequestColumn::AssignedDeliveryAddress.is_not_null())
        .filter(BudgetRequestColumn::PoGenerated.eq(false))
        .order_by_asc(BudgetRequestColumn::SubmittedAt)
        .all(&txn)
        .await?;

    if ready.is_empty() {
        txn.commit().await?;
        info!("No budget requests ready for purchase orders");
        return Ok(GenerationOutcome::default());
    }

    let catalogue = Catalogue::new(
        master_data::list_products(&txn).await?,
        master_data::list_vendors(&txn).await?,
    );
    let aggregation = aggregate(&ready, &catalogue, Utc::now());

    for skipped in &aggregation.skipped {
        warn!(
            budget_id = %skipped.budget_id,
            product_id = %skipped.product_id,
            "Item excluded from purchase orders: {}",
            skipped.reason
        );
    }

    let mut created = Vec::with_capacity(aggregation.orders.len());
    for order in aggregation.orders {
        created.push(order.into_active_model().insert(&txn).await?);
    }

    for request in ready
        .into_iter()
        .filter(|r| aggregation.contributing.contains(&r.id))
    {
        let mut marked = request.into_active_model();
        marked.po_generated = sea_orm::Set(true);
        marked.update(&txn).await?;
    }

    txn.commit().await?;

    info!(
        orders = created.len(),
        requests = aggregation.contributing.len(),
        skipped = aggregation.skipped.len(),
        "Purchase orders generated"
    );

    Ok(GenerationOutcome {
        purchase_orders: created,
        skipped: aggregation.skipped,
    })
}

/// All purchase orders, newest first.
pub async fn get_purchase_orders(db: &DatabaseConnection) -> Result<Vec<purchase_order::Model>> {
    PurchaseOrder::find()
        .order_by_desc(PurchaseOrderColumn::DateIssued)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_purchase_order(
    db: &DatabaseConnection,
    po_id: &str,
) -> Result<Option<purchase_order::Model>> {
    PurchaseOrder::find_by_id(po_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_purchase_order`] but a missing order is [`Error::NotFound`].
pub async fn require_purchase_order(
    db: &DatabaseConnection,
    po_id: &str,
) -> Result<purchase_order::Model> {
    get_purchase_order(db, po_id)
        .await?
        .ok_or_else(|| Error::not_found("Purchase order", po_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::budget::require_budget_request;
    use crate::test_utils::*;

    fn catalogue() -> Catalogue {
        Catalogue::new(
            vec![
                sample_product("prod-001", "vendor-1", 45_000),
                sample_product("prod-002", "vendor-1", 25_000),
                sample_product("prod-003", "vendor-2", 12_500_000),
            ],
            vec![sample_vendor("vendor-1"), sample_vendor("vendor-2")],
        )
    }

    fn ready(id: &str, items: Vec<BudgetItem>) -> budget_request::Model {
        let mut request = sample_request(id, items);
        request.status = BudgetStatus::Approved;
        request.procurement_status = Some(ProcurementStatus::InProgress);
        request.assigned_company_profile_id = Some("company-1".to_string());
        request.assigned_delivery_address = Some("Gudang Utama".to_string());
        request
    }

    #[test]
    fn test_same_product_merges_across_requests() {
        let requests = vec![
            ready("BR-A", vec![sample_item("prod-001", 45_000, 3)]),
            ready("BR-B", vec![sample_item("prod-001", 45_000, 5)]),
        ];

        let aggregation = aggregate(&requests, &catalogue(), Utc::now());

        assert_eq!(aggregation.orders.len(), 1);
        let order = &aggregation.orders[0];
        assert_eq!(order.vendor_id, "vendor-1");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.0[0].qty, 8);
        assert_eq!(order.items.0[0].total, 8 * 45_000);
        assert_eq!(order.total_amount, 8 * 45_000);
        assert_eq!(order.related_budget_ids.0, vec!["BR-A", "BR-B"]);
        assert_eq!(aggregation.contributing, vec!["BR-A", "BR-B"]);
        assert!(aggregation.skipped.is_empty());
    }

    #[test]
    fn test_lines_keep_first_seen_order() {
        let requests = vec![
            ready(
                "BR-A",
                vec![
                    sample_item("prod-002", 25_000, 1),
                    sample_item("prod-001", 45_000, 1),
                ],
            ),
            ready("BR-B", vec![sample_item("prod-002", 25_000, 4)]),
        ];

        let order = &aggregate(&requests, &catalogue(), Utc::now()).orders[0];
        let ids: Vec<&str> = order.items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["prod-002", "prod-001"]);
        assert_eq!(order.items.0[0].qty, 5);
        assert_eq!(order.total_amount, order.items.grand_total());
    }

    #[test]
    fn test_multi_vendor_request_is_split() {
        let requests = vec![ready(
            "BR-A",
            vec![
                sample_item("prod-001", 45_000, 1),
                sample_item("prod-003", 12_500_000, 1),
            ],
        )];

        let aggregation = aggregate(&requests, &catalogue(), Utc::now());

        assert_eq!(aggregation.orders.len(), 2);
        for order in &aggregation.orders {
            assert_eq!(order.items.len(), 1);
            assert!(order.related_budget_ids.contains("BR-A"));
        }
        assert_eq!(aggregation.contributing, vec!["BR-A"]);
    }

    #[test]
    fn test_different_addresses_make_separate_orders() {
        let mut second = ready("BR-B", vec![sample_item("prod-001", 45_000, 1)]);
        second.assigned_delivery_address = Some("Kantor Cabang".to_string());
        let requests = vec![ready("BR-A", vec![sample_item("prod-001", 45_000, 1)]), second];

        let aggregation = aggregate(&requests, &catalogue(), Utc::now());
        assert_eq!(aggregation.orders.len(), 2);
        assert!(
            aggregation
                .orders
                .iter()
                .all(|o| o.related_budget_ids.0.len() == 1)
        );
    }

    #[test]
    fn test_unresolved_product_is_skipped() {
        let requests = vec![
            ready(
                "BR-A",
                vec![
                    sample_item("prod-001", 45_000, 1),
                    sample_item("prod-gone", 1_000, 2),
                ],
            ),
            ready("BR-B", vec![sample_item("prod-gone", 1_000, 1)]),
        ];

        let aggregation = aggregate(&requests, &catalogue(), Utc::now());

        assert_eq!(aggregation.orders.len(), 1);
        assert_eq!(aggregation.orders[0].items.len(), 1);
        assert_eq!(aggregation.contributing, vec!["BR-A"]);
        assert_eq!(aggregation.skipped.len(), 2);
        assert_eq!(aggregation.skipped[0].product_id, "prod-gone");
        assert!(aggregation.skipped[0].reason.contains("Data integrity"));
    }

    #[test]
    fn test_unready_requests_are_ignored() {
        let mut pending_lane = ready("BR-A", vec![sample_item("prod-001", 45_000, 1)]);
        pending_lane.procurement_status = Some(ProcurementStatus::Pending);
        let mut no_address = ready("BR-B", vec![sample_item("prod-001", 45_000, 1)]);
        no_address.assigned_delivery_address = None;
        let mut swept = ready("BR-C", vec![sample_item("prod-001", 45_000, 1)]);
        swept.po_generated = true;

        let aggregation = aggregate(&[pending_lane, no_address, swept], &catalogue(), Utc::now());
        assert!(aggregation.orders.is_empty());
        assert!(aggregation.contributing.is_empty());
    }

    #[tokio::test]
    async fn test_generate_marks_requests_and_second_run_is_empty() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        let first = ready_test_request(&db, &org, &org.paper, 3).await?;
        let second = ready_test_request(&db, &org, &org.paper, 5).await?;
        let waiting = approved_test_request(&db, &org, &org.paper, 7).await?;

        let outcome = generate_purchase_orders(&db, &org.admin).await?;
        assert_eq!(outcome.purchase_orders.len(), 1);
        let order = &outcome.purchase_orders[0];
        assert_eq!(order.items.0[0].qty, 8);
        assert!(order.related_budget_ids.contains(&first.id));
        assert!(order.related_budget_ids.contains(&second.id));
        assert!(!order.related_budget_ids.contains(&waiting.id));
        assert_eq!(order.company_profile_id, org.company.profile_id);

        assert!(require_budget_request(&db, &first.id).await?.po_generated);
        assert!(require_budget_request(&db, &second.id).await?.po_generated);
        assert!(!require_budget_request(&db, &waiting.id).await?.po_generated);

        let again = generate_purchase_orders(&db, &org.admin).await?;
        assert!(again.purchase_orders.is_empty());
        assert_eq!(get_purchase_orders(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_skips_products_removed_after_submission() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        let request = ready_test_request(&db, &org, &org.ink, 2).await?;
        master_data::delete_product(&db, &org.admin, &org.ink.id).await?;

        let outcome = generate_purchase_orders(&db, &org.admin).await?;
        assert!(outcome.purchase_orders.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].budget_id, request.id);

        // Nothing was placed, so the request stays eligible
        assert!(!require_budget_request(&db, &request.id).await?.po_generated);
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_requires_admin() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        ready_test_request(&db, &org, &org.paper, 1).await?;

        let result = generate_purchase_orders(&db, &org.manager).await;
        assert!(matches!(result.unwrap_err(), Error::Authorization { .. }));
        assert!(get_purchase_orders(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_require_purchase_order() -> Result<()> {
        let (db, org) = setup_with_org().await?;
        ready_test_request(&db, &org, &org.paper, 1).await?;
        let outcome = generate_purchase_orders(&db, &org.admin).await?;
        let po_id = &outcome.purchase_orders[0].po_id;

        assert_eq!(&require_purchase_order(&db, po_id).await?.po_id, po_id);
        let result = require_purchase_order(&db, "PO-none").await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
