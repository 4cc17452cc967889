pub mod drivers;
pub mod fares;
pub mod reservations;
pub mod vehicles;
