/// Round a monetary amount to whole currency units.
///
/// Fractions of 0.51 and above go up, fractions of 0.49 and below go down.
/// Only the band in between falls back to round-half-up, so a half-unit
/// fare such as 32.5 becomes 33.
pub fn round_amount(x: f64) -> i64 {
    let floor = x.floor();
    let frac = x - floor;

    if frac >= 0.51 {
        x.ceil() as i64
    } else if frac <= 0.49 {
        floor as i64
    } else {
        (x + 0.5).floor() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_amounts_are_unchanged() {
        assert_eq!(round_amount(0.0), 0);
        assert_eq!(round_amount(25.0), 25);
    }

    #[test]
    fn test_outside_the_band() {
        assert_eq!(round_amount(10.49), 10);
        assert_eq!(round_amount(10.2), 10);
        assert_eq!(round_amount(10.51), 11);
        assert_eq!(round_amount(10.9), 11);
    }

    #[test]
    fn test_half_unit_rounds_up() {
        assert_eq!(round_amount(32.5), 33);
        assert_eq!(round_amount(7.5), 8);
        assert_eq!(round_amount(0.5), 1);
    }

    #[test]
    fn test_inside_the_band() {
        assert_eq!(round_amount(4.495), 4);
        assert_eq!(round_amount(4.505), 5);
    }
}
