pub mod ledger;
pub mod orders;
pub mod fees;
pub mod damage;
pub mod returns;
