pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod orders_repo;
pub use orders_repo::OrdersRepository;
pub mod damage_repo;
pub use damage_repo::DamageRepository;
pub mod returns_repo;
pub use returns_repo::ReturnsRepository;
