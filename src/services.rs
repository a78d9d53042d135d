pub mod ledger;
pub mod fees;
pub mod settlement_service;
pub mod lifecycle_service;
pub mod damage_service;
pub mod returns_service;
pub mod orders_service;

pub use fees::FeeRuleTable;
pub use settlement_service::SettlementService;
pub use lifecycle_service::LifecycleService;
pub use damage_service::DamageService;
pub use returns_service::ReturnsService;
pub use orders_service::OrdersService;
