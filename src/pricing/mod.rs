pub mod fare;
pub mod table;

pub use fare::{compute_fare, compute_legacy_fare, quote_vehicle, FareRequest, FareResult, VehiclePricing};
pub use table::{validate_pricing_table, PriceRange, PricingTable, TableValidation};
