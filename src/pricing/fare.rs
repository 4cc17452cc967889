use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::pricing::table::PricingTable;
use crate::utils::rounding::round_amount;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareRequest {
    pub one_way_distance_km: f64,
    #[serde(default)]
    pub round_trip: bool,
}

impl FareRequest {
    pub fn one_way(distance_km: f64) -> Self {
        Self { one_way_distance_km: distance_km, round_trip: false }
    }

    pub fn round_trip(distance_km: f64) -> Self {
        Self { one_way_distance_km: distance_km, round_trip: true }
    }

    /// Distance the vehicle actually covers; the return leg is added before pricing.
    pub fn total_distance_km(&self) -> f64 {
        if self.round_trip {
            self.one_way_distance_km * 2.0
        } else {
            self.one_way_distance_km
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "EUR")]
    Eur,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareBreakdownEntry {
    pub range_from: f64,
    pub range_to: f64,
    pub is_fixed: bool,
    pub consumed_km: f64,
    pub raw_amount: f64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareResult {
    pub total_amount: i64,
    pub raw_total: f64,
    pub breakdown: Vec<FareBreakdownEntry>,
    pub currency: Currency,
}

impl FareResult {
    fn from_breakdown(breakdown: Vec<FareBreakdownEntry>) -> Self {
        let raw_total: f64 = breakdown.iter().map(|e| e.raw_amount).sum();
        Self {
            total_amount: round_amount(raw_total),
            raw_total,
            breakdown,
            currency: Currency::Eur,
        }
    }

    pub fn consumed_km(&self) -> f64 {
        self.breakdown.iter().map(|e| e.consumed_km).sum()
    }
}

/// Price a trip against a tiered pricing table.
///
/// Brackets are consumed progressively in ascending order. A fixed bracket
/// is charged in full as soon as it is entered; a per-km bracket is charged
/// for the kilometres spent in it. Brackets are only entered when the total
/// distance is strictly beyond their `from`, so trips shorter than the first
/// bracket are not priced at all. Distance past the last bracket is not priced.
///
/// The table must have passed [`validate_pricing_table`](super::table::validate_pricing_table).
pub fn compute_fare(request: &FareRequest, table: &PricingTable) -> FareResult {
    let total_distance = request.total_distance_km();

    let mut consumed_so_far = 0.0_f64;
    let mut remaining = total_distance;
    let mut breakdown = Vec::new();

    for range in table.sorted() {
        if remaining <= 0.0 || total_distance <= range.from {
            break;
        }

        let boundary_start = consumed_so_far.max(range.from);
        let capacity = range.to - boundary_start;
        let ceiling = total_distance - boundary_start;
        let consumed = remaining.min(capacity).min(ceiling);

        if consumed > 0.0 {
            let raw_amount = if range.is_fixed {
                range.price
            } else {
                consumed * range.price
            };

            breakdown.push(FareBreakdownEntry {
                range_from: range.from,
                range_to: range.to,
                is_fixed: range.is_fixed,
                consumed_km: consumed,
                raw_amount,
                amount: round_amount(raw_amount),
            });

            remaining -= consumed;
            consumed_so_far += consumed;
        }
    }

    FareResult::from_breakdown(breakdown)
}

/// Flat per-km pricing for vehicles that predate pricing tables.
pub fn compute_legacy_fare(request: &FareRequest, rate_per_km: f64) -> FareResult {
    let total_distance = request.total_distance_km();
    let raw_amount = rate_per_km * total_distance;

    FareResult::from_breakdown(vec![FareBreakdownEntry {
        range_from: 0.0,
        range_to: total_distance,
        is_fixed: false,
        consumed_km: total_distance,
        raw_amount,
        amount: round_amount(raw_amount),
    }])
}

/// Pricing data stored on a vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePricing {
    pub pricing_table: Option<PricingTable>,
    pub legacy_rate_per_km: Option<f64>,
}

/// Price a trip for a vehicle. This is the entry point forms should use.
///
/// A stored pricing table must validate, otherwise pricing is refused. The
/// legacy per-km rate is only used when the vehicle has no pricing table.
pub fn quote_vehicle(request: &FareRequest, pricing: &VehiclePricing) -> AppResult<FareResult> {
    if !request.one_way_distance_km.is_finite() || request.one_way_distance_km < 0.0 {
        return Err(AppError::validation(
            "one_way_distance_km must be a non-negative number",
        ));
    }

    match (&pricing.pricing_table, pricing.legacy_rate_per_km) {
        (Some(table), _) => {
            let validation = table.validate();
            if !validation.valid {
                tracing::warn!(errors = ?validation.errors, "Refusing to price with invalid pricing table");
                return Err(AppError::Validation(validation.errors));
            }
            Ok(compute_fare(request, table))
        }
        (None, Some(rate)) if rate.is_finite() && rate > 0.0 => {
            tracing::debug!(rate, "Pricing with legacy per-km rate");
            Ok(compute_legacy_fare(request, rate))
        }
        (None, Some(_)) => Err(AppError::validation(
            "legacy_rate_per_km must be greater than zero",
        )),
        (None, None) => Err(AppError::validation("vehicle has no pricing configured")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::table::PriceRange;

    fn sedan() -> PricingTable {
        PricingTable::new(vec![
            PriceRange::fixed(1.0, 20.0, 25.0),
            PriceRange::per_km(20.0, 40.0, 1.5),
            PriceRange::per_km(40.0, 80.0, 1.0),
            PriceRange::per_km(80.0, 150.0, 0.8),
        ])
    }

    fn from_zero() -> PricingTable {
        PricingTable::new(vec![
            PriceRange::fixed(0.0, 10.0, 20.0),
            PriceRange::per_km(10.0, 50.0, 2.0),
            PriceRange::per_km(50.0, 100.0, 1.2),
        ])
    }

    #[test]
    fn test_sedan_example() {
        let result = compute_fare(&FareRequest::one_way(25.0), &sedan());

        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[0].consumed_km, 19.0);
        assert_eq!(result.breakdown[0].raw_amount, 25.0);
        assert_eq!(result.breakdown[1].consumed_km, 5.0);
        assert_eq!(result.breakdown[1].raw_amount, 7.5);
        assert_eq!(result.breakdown[1].amount, 8);
        assert_eq!(result.raw_total, 32.5);
        assert_eq!(result.total_amount, 33);
        assert_eq!(result.currency, Currency::Eur);
    }

    #[test]
    fn test_sub_minimum_distance_is_unpriced() {
        let result = compute_fare(&FareRequest::one_way(0.5), &sedan());
        assert_eq!(result.total_amount, 0);
        assert!(result.breakdown.is_empty());

        let result = compute_fare(&FareRequest::one_way(0.6), &sedan());
        assert_eq!(result.total_amount, 0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_distance_equal_to_first_from_is_unpriced() {
        let result = compute_fare(&FareRequest::one_way(1.0), &sedan());
        assert_eq!(result.total_amount, 0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_fixed_bracket_only_needs_to_be_entered() {
        let result = compute_fare(&FareRequest::one_way(2.0), &sedan());
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].consumed_km, 1.0);
        assert_eq!(result.total_amount, 25);
    }

    #[test]
    fn test_round_trip_doubles_distance_before_allocation() {
        let table = sedan();
        let one_way = compute_fare(&FareRequest::one_way(15.0), &table);
        let round_trip = compute_fare(&FareRequest::round_trip(15.0), &table);

        // 15 km stays in the fixed bracket, 30 km crosses into the per-km one
        assert_eq!(one_way.total_amount, 25);
        assert_eq!(round_trip.total_amount, 40);
        assert_ne!(round_trip.total_amount, 2 * one_way.total_amount);
    }

    #[test]
    fn test_consumption_is_capped_by_table() {
        let table = from_zero();
        for distance in [0.0, 3.0, 10.0, 27.5, 99.0, 100.0, 180.0] {
            for request in [FareRequest::one_way(distance), FareRequest::round_trip(distance)] {
                let result = compute_fare(&request, &table);
                let expected = request.total_distance_km().min(100.0);
                assert!(
                    (result.consumed_km() - expected).abs() < 1e-9,
                    "distance {} round_trip {}",
                    distance,
                    request.round_trip
                );
            }
        }
    }

    #[test]
    fn test_consumption_skips_distance_below_first_bracket() {
        let table = sedan();
        for distance in [0.5, 1.0, 5.0, 25.0, 149.0, 400.0] {
            let result = compute_fare(&FareRequest::one_way(distance), &table);
            let expected = (distance.min(150.0) - 1.0).max(0.0);
            assert!((result.consumed_km() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_excess_distance_is_unpriced() {
        let capped = compute_fare(&FareRequest::one_way(150.0), &sedan());
        let beyond = compute_fare(&FareRequest::one_way(500.0), &sedan());
        assert_eq!(capped.total_amount, beyond.total_amount);
        assert_eq!(beyond.breakdown.len(), 4);
    }

    #[test]
    fn test_total_matches_rounded_raw_sum() {
        let result = compute_fare(&FareRequest::one_way(63.3), &sedan());
        let raw: f64 = result.breakdown.iter().map(|e| e.raw_amount).sum();
        assert_eq!(result.total_amount, round_amount(raw));
        assert_eq!(result.raw_total, raw);
    }

    #[test]
    fn test_unsorted_table_is_priced_in_order_without_mutation() {
        let mut ranges = sedan().0;
        ranges.reverse();
        let table = PricingTable::new(ranges.clone());

        let result = compute_fare(&FareRequest::one_way(25.0), &table);
        assert_eq!(result.total_amount, 33);
        assert_eq!(table.0, ranges);
    }

    #[test]
    fn test_legacy_fare() {
        let result = compute_legacy_fare(&FareRequest::round_trip(10.25), 1.2);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].consumed_km, 20.5);
        assert_eq!(result.total_amount, 25);
    }

    #[test]
    fn test_quote_uses_table_when_present() {
        let pricing = VehiclePricing {
            pricing_table: Some(sedan()),
            legacy_rate_per_km: Some(10.0),
        };
        let result = quote_vehicle(&FareRequest::one_way(25.0), &pricing).unwrap();
        assert_eq!(result.total_amount, 33);
    }

    #[test]
    fn test_quote_falls_back_to_legacy_rate_without_table() {
        let pricing = VehiclePricing {
            pricing_table: None,
            legacy_rate_per_km: Some(2.0),
        };
        let result = quote_vehicle(&FareRequest::one_way(12.0), &pricing).unwrap();
        assert_eq!(result.total_amount, 24);
    }

    #[test]
    fn test_quote_rejects_invalid_table_without_fallback() {
        let pricing = VehiclePricing {
            pricing_table: Some(PricingTable::new(vec![
                PriceRange::fixed(0.0, 20.0, 25.0),
                PriceRange::per_km(30.0, 40.0, 1.5),
            ])),
            legacy_rate_per_km: Some(2.0),
        };
        let err = quote_vehicle(&FareRequest::one_way(12.0), &pricing).unwrap_err();
        assert!(matches!(err, AppError::Validation(errors) if errors.len() == 1));
    }

    #[test]
    fn test_quote_rejects_negative_distance() {
        let pricing = VehiclePricing {
            pricing_table: Some(sedan()),
            legacy_rate_per_km: None,
        };
        let err = quote_vehicle(&FareRequest::one_way(-1.0), &pricing).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_quote_without_any_pricing() {
        let err = quote_vehicle(&FareRequest::one_way(5.0), &VehiclePricing::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
