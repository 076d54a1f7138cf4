//! Business logic services for the Titik Kasir POS platform

pub mod auth;
pub mod customer;
pub mod discount;
pub mod inventory;
pub mod product;
pub mod purchase_order;
pub mod reporting;
pub mod role;
pub mod sale;
pub mod settings;
pub mod stock;
pub mod stock_transfer;
pub mod store;
pub mod supplier;
pub mod user;
pub mod warehouse;

pub use auth::AuthService;
pub use customer::CustomerService;
pub use discount::DiscountService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use purchase_order::PurchaseOrderService;
pub use reporting::ReportingService;
pub use role::RoleService;
pub use sale::SaleService;
pub use settings::SettingsService;
pub use stock_transfer::StockTransferService;
pub use store::StoreService;
pub use supplier::SupplierService;
pub use user::UserService;
pub use warehouse::WarehouseService;
