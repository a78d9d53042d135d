pub mod orders;
pub mod settlement;
pub mod damage;
pub mod returns;
