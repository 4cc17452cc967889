pub mod driver;
pub mod ledger_entry;
pub mod reservation;
pub mod vehicle;
