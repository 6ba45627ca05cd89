//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget_item;
pub mod budget_request;
pub mod company_profile;
pub mod delivery_address;
pub mod product;
pub mod purchase_order;
pub mod sea_orm_active_enums;
pub mod user;
pub mod vendor;

// Re-export specific types to avoid conflicts
pub use budget_item::{BudgetItem, BudgetItems, RelatedBudgetIds};
pub use budget_request::{
    Column as BudgetRequestColumn, Entity as BudgetRequest, Model as BudgetRequestModel,
};
pub use company_profile::{
    Column as CompanyProfileColumn, Entity as CompanyProfile, Model as CompanyProfileModel,
};
pub use delivery_address::{
    Column as DeliveryAddressColumn, Entity as DeliveryAddress, Model as DeliveryAddressModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use purchase_order::{
    Column as PurchaseOrderColumn, Entity as PurchaseOrder, Model as PurchaseOrderModel,
};
pub use sea_orm_active_enums::{BudgetStatus, ProcurementStatus, Role};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use vendor::{Column as VendorColumn, Entity as Vendor, Model as VendorModel};
