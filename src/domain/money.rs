use std::ops::Neg;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

use crate::domain::Error;

/// Signed currency amount, always held at exactly four decimal places.
///
/// Values are bounded so the scaled mantissa fits a `Decimal`; arithmetic is
/// checked against that bound instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const TARGET_DECIMALS: u32 = 4;

    pub fn zero() -> Self {
        Self::from(0)
    }

    /// Largest representable amount, 7922816251426433759354395.0335.
    pub fn max_value() -> Self {
        Self(Decimal::from_parts(
            u32::MAX,
            u32::MAX,
            u32::MAX,
            false,
            Self::TARGET_DECIMALS,
        ))
    }

    pub fn try_new(value: Decimal) -> Result<Self, Error> {
        Self::bounded(value)
            .ok_or_else(|| Error::InvalidRequest(format!("amount out of range: {}", value)))
    }

    fn bounded(value: Decimal) -> Option<Self> {
        // tie -> bankers (round half to even)
        let mut value =
            value.round_dp_with_strategy(Self::TARGET_DECIMALS, RoundingStrategy::MidpointNearestEven);
        if value.abs() > Self::max_value().0 {
            return None;
        }
        value.rescale(Self::TARGET_DECIMALS);
        Some(Self(value))
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).and_then(Self::bounded)
    }

    pub fn checked_sum<I: IntoIterator<Item = Money>>(iter: I) -> Option<Money> {
        iter.into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn from_decimal_str(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidRequest("empty amount".to_string()));
        }

        let value = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| Error::InvalidRequest(format!("amount is not a finite number: {}", s)))?;
        Self::try_new(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        // |i64| at four places always fits the 96-bit mantissa
        let mut value = Decimal::from(value);
        value.rescale(Self::TARGET_DECIMALS);
        Self(value)
    }
}

impl TryFrom<f64> for Money {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(Error::InvalidRequest(format!(
                "amount is not a finite number: {}",
                value
            )));
        }

        Decimal::try_from(value)
            .map_err(|e| Error::InvalidRequest(format!("amount {} out of range: {}", value, e)))
            .and_then(Self::try_new)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // scale is fixed at four, so the plain form already carries four places
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_decimal_str(&s)
            .map_err(|_| serde::de::Error::custom(format!("Invalid Money format: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::Money;
    use crate::domain::Error;

    #[test]
    fn bankers_round_half_even() {
        let v = Money::from_decimal_str("1.23445").unwrap();
        assert_eq!(format!("{}", v), "1.2344");
        let v = Money::from_decimal_str("1.23455").unwrap();
        assert_eq!(format!("{}", v), "1.2346");
        let v = Money::from_decimal_str("-1.23445").unwrap();
        assert_eq!(format!("{}", v), "-1.2344");
        let v = Money::from_decimal_str("-1.23455").unwrap();
        assert_eq!(format!("{}", v), "-1.2346");
    }

    #[test]
    fn rejects_non_finite_floats() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(Money::try_from(value), Err(Error::InvalidRequest(_))));
        }
        assert_eq!(Money::try_from(-500.0).unwrap(), Money::from(-500));
    }

    #[test]
    fn rejects_garbage_text() {
        assert!(Money::from_decimal_str("NaN").is_err());
        assert!(Money::from_decimal_str("inf").is_err());
        assert!(Money::from_decimal_str("").is_err());
        assert_eq!(Money::from_decimal_str(" 200 ").unwrap(), Money::from(200));
    }

    #[test]
    fn sums_signed_amounts() {
        let total =
            Money::checked_sum([Money::from(1000), Money::from(200), Money::from(-500)]).unwrap();
        assert_eq!(total, Money::from(700));
        assert_eq!(format!("{}", total), "700.0000");
    }

    #[test]
    fn addition_past_the_bound_is_none() {
        let max = Money::max_value();
        assert_eq!(max.checked_add(Money::from(1)), None);
        assert_eq!((-max).checked_add(Money::from(-1)), None);
        assert_eq!(Money::checked_sum([max, Money::from(1), Money::from(-1)]), None);
        assert_eq!(
            max.checked_add(Money::from(-1)).unwrap(),
            Money::from_decimal_str("7922816251426433759354394.0335").unwrap()
        );
    }

    #[test]
    fn rejects_amounts_beyond_four_place_range() {
        assert!(matches!(
            Money::from_decimal_str("79228162514264337593543950335"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            Money::from_decimal_str("7922816251426433759354395.0336"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(Money::try_from(1e30).is_err());
    }

    #[test]
    fn extreme_values_format_with_four_places() {
        assert_eq!(
            format!("{}", Money::max_value()),
            "7922816251426433759354395.0335"
        );
        assert_eq!(
            format!("{}", -Money::max_value()),
            "-7922816251426433759354395.0335"
        );
        assert_eq!(format!("{}", Money::from(1500)), "1500.0000");
        assert_eq!(format!("{}", Money::from_decimal_str("0.5").unwrap()), "0.5000");
    }
}
