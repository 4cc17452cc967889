use std::fmt;

use serde::{Deserialize, Serialize};

/// One distance bracket of a vehicle's price list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub from: f64,
    pub to: f64,
    pub price: f64,
    #[serde(alias = "isFixed", default)]
    pub is_fixed: bool,
}

impl PriceRange {
    pub fn fixed(from: f64, to: f64, price: f64) -> Self {
        Self { from, to, price, is_fixed: true }
    }

    pub fn per_km(from: f64, to: f64, price: f64) -> Self {
        Self { from, to, price, is_fixed: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable(pub Vec<PriceRange>);

impl PricingTable {
    pub fn new(ranges: Vec<PriceRange>) -> Self {
        Self(ranges)
    }

    pub fn ranges(&self) -> &[PriceRange] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ranges ordered by `from`, leaving the table itself untouched.
    pub fn sorted(&self) -> Vec<PriceRange> {
        let mut ranges = self.0.clone();
        ranges.sort_by(|a, b| a.from.total_cmp(&b.from));
        ranges
    }

    pub fn validate(&self) -> TableValidation {
        validate_pricing_table(&self.0)
    }
}

/// A single structural problem found in a pricing table.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingIssue {
    Empty,
    InvertedBounds { index: usize, from: f64, to: f64 },
    NonPositivePrice { index: usize, price: f64 },
    OutOfOrder { index: usize, from: f64, previous_from: f64 },
    Overlap { index: usize, from: f64, previous_to: f64 },
    Gap { index: usize, previous_to: f64, from: f64 },
}

impl fmt::Display for PricingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingIssue::Empty => write!(f, "pricing table has no ranges"),
            PricingIssue::InvertedBounds { index, from, to } => write!(
                f,
                "range {}: 'from' ({}) must be lower than 'to' ({})",
                index + 1,
                from,
                to
            ),
            PricingIssue::NonPositivePrice { index, price } => write!(
                f,
                "range {}: price ({}) must be greater than zero",
                index + 1,
                price
            ),
            PricingIssue::OutOfOrder { index, from, previous_from } => write!(
                f,
                "range {}: starts at {} which is before the previous range start {}",
                index + 1,
                from,
                previous_from
            ),
            PricingIssue::Overlap { index, from, previous_to } => write!(
                f,
                "range {}: starts at {} and overlaps the previous range ending at {}",
                index + 1,
                from,
                previous_to
            ),
            PricingIssue::Gap { index, previous_to, from } => write!(
                f,
                "range {}: gap between {} and {}",
                index + 1,
                previous_to,
                from
            ),
        }
    }
}

/// Outcome of [`validate_pricing_table`]. Callers decide whether to reject or warn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub issues: Vec<PricingIssue>,
}

impl TableValidation {
    fn from_issues(issues: Vec<PricingIssue>) -> Self {
        Self {
            valid: issues.is_empty(),
            errors: issues.iter().map(ToString::to_string).collect(),
            issues,
        }
    }
}

/// Check a candidate pricing table.
///
/// Checks run in a fixed order and stop at the first one that finds
/// problems: emptiness, bounds, prices, ordering/overlap, then gaps.
pub fn validate_pricing_table(ranges: &[PriceRange]) -> TableValidation {
    if ranges.is_empty() {
        return TableValidation::from_issues(vec![PricingIssue::Empty]);
    }

    let checks: [fn(&[PriceRange]) -> Vec<PricingIssue>; 4] =
        [check_bounds, check_prices, check_order, check_gaps];

    for check in checks {
        let issues = check(ranges);
        if !issues.is_empty() {
            return TableValidation::from_issues(issues);
        }
    }

    TableValidation::from_issues(Vec::new())
}

fn check_bounds(ranges: &[PriceRange]) -> Vec<PricingIssue> {
    ranges
        .iter()
        .enumerate()
        // NaN and infinite bounds fail here too
        .filter(|(_, r)| !(r.from.is_finite() && r.to.is_finite() && r.from < r.to))
        .map(|(index, r)| PricingIssue::InvertedBounds { index, from: r.from, to: r.to })
        .collect()
}

fn check_prices(ranges: &[PriceRange]) -> Vec<PricingIssue> {
    ranges
        .iter()
        .enumerate()
        .filter(|(_, r)| !(r.price.is_finite() && r.price > 0.0))
        .map(|(index, r)| PricingIssue::NonPositivePrice { index, price: r.price })
        .collect()
}

fn check_order(ranges: &[PriceRange]) -> Vec<PricingIssue> {
    let mut issues = Vec::new();

    for (index, pair) in ranges.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.from < previous.from {
            issues.push(PricingIssue::OutOfOrder {
                index: index + 1,
                from: current.from,
                previous_from: previous.from,
            });
        } else if current.from < previous.to {
            issues.push(PricingIssue::Overlap {
                index: index + 1,
                from: current.from,
                previous_to: previous.to,
            });
        }
    }

    issues
}

fn check_gaps(ranges: &[PriceRange]) -> Vec<PricingIssue> {
    ranges
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].to != pair[1].from)
        .map(|(index, pair)| PricingIssue::Gap {
            index: index + 1,
            previous_to: pair[0].to,
            from: pair[1].from,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sedan() -> Vec<PriceRange> {
        vec![
            PriceRange::fixed(1.0, 20.0, 25.0),
            PriceRange::per_km(20.0, 40.0, 1.5),
            PriceRange::per_km(40.0, 80.0, 1.0),
            PriceRange::per_km(80.0, 150.0, 0.8),
        ]
    }

    #[test]
    fn test_valid_table() {
        let result = validate_pricing_table(&sedan());
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let result = validate_pricing_table(&[]);
        assert!(!result.valid);
        assert_eq!(result.issues, vec![PricingIssue::Empty]);
    }

    #[test]
    fn test_inverted_bounds_reported_per_range() {
        let ranges = vec![
            PriceRange::per_km(10.0, 5.0, 1.0),
            PriceRange::per_km(5.0, 5.0, 1.0),
            PriceRange::per_km(5.0, f64::NAN, 1.0),
        ];
        let result = validate_pricing_table(&ranges);
        assert!(!result.valid);
        assert_eq!(result.issues.len(), 3);
        assert!(matches!(result.issues[0], PricingIssue::InvertedBounds { index: 0, .. }));
    }

    #[test]
    fn test_bounds_checked_before_prices() {
        let ranges = vec![
            PriceRange::per_km(10.0, 5.0, 0.0),
            PriceRange::per_km(10.0, 20.0, -1.0),
        ];
        let result = validate_pricing_table(&ranges);
        assert_eq!(result.issues.len(), 1);
        assert!(matches!(result.issues[0], PricingIssue::InvertedBounds { .. }));
    }

    #[test]
    fn test_non_positive_price() {
        let mut ranges = sedan();
        ranges[2].price = 0.0;
        let result = validate_pricing_table(&ranges);
        assert_eq!(
            result.issues,
            vec![PricingIssue::NonPositivePrice { index: 2, price: 0.0 }]
        );
        assert!(result.errors[0].contains("range 3"));
    }

    #[test]
    fn test_out_of_order() {
        let mut ranges = sedan();
        ranges.swap(1, 2);
        let result = validate_pricing_table(&ranges);
        assert!(!result.valid);
        assert!(result
            .issues
            .iter()
            .any(|i| matches!(i, PricingIssue::OutOfOrder { index: 2, .. })));
    }

    #[test]
    fn test_overlap() {
        let ranges = vec![
            PriceRange::fixed(0.0, 20.0, 25.0),
            PriceRange::per_km(15.0, 40.0, 1.5),
        ];
        let result = validate_pricing_table(&ranges);
        assert_eq!(
            result.issues,
            vec![PricingIssue::Overlap { index: 1, from: 15.0, previous_to: 20.0 }]
        );
    }

    #[test]
    fn test_gap() {
        let ranges = vec![
            PriceRange::fixed(0.0, 20.0, 25.0),
            PriceRange::per_km(25.0, 40.0, 1.5),
        ];
        let result = validate_pricing_table(&ranges);
        assert_eq!(
            result.issues,
            vec![PricingIssue::Gap { index: 1, previous_to: 20.0, from: 25.0 }]
        );
        assert_eq!(result.errors, vec!["range 2: gap between 20 and 25".to_string()]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let ranges = vec![
            PriceRange::fixed(0.0, 20.0, 25.0),
            PriceRange::per_km(25.0, 40.0, 1.5),
        ];
        assert_eq!(validate_pricing_table(&ranges), validate_pricing_table(&ranges));
        assert_eq!(validate_pricing_table(&sedan()), validate_pricing_table(&sedan()));
    }

    #[test]
    fn test_deserialize_accepts_camel_case_flag() {
        let table: PricingTable = serde_json::from_str(
            r#"[{"from":1,"to":20,"price":25,"isFixed":true},{"from":20,"to":40,"price":1.5,"is_fixed":false}]"#,
        )
        .unwrap();
        assert!(table.ranges()[0].is_fixed);
        assert!(!table.ranges()[1].is_fixed);
    }
}
