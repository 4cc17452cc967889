pub mod reservation_code;
pub mod rounding;
