//! Value objects: equality by value, not identity.
//!
//! Names and dates entering the domain are wrapped in validated types so that
//! an invalid value cannot be constructed past the boundary.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::validation;

macro_rules! impl_name_value_object {
    ($t:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $t(String);

        impl $t {
            /// Validate and normalize (trim) a raw name.
            pub fn parse(raw: &str) -> DomainResult<Self> {
                validation::validate_name($kind, raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_name_value_object!(IngredientName, "ingredient");
impl_name_value_object!(DishName, "dish");

/// Date a stock entry was last restocked (`YYYY-MM-DD`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockDate(NaiveDate);

impl StockDate {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        validation::parse_stock_date(raw).map(Self)
    }
}

impl core::fmt::Display for StockDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for StockDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StockDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StockDate> for String {
    fn from(value: StockDate) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_compare_after_trimming() {
        let a = IngredientName::parse(" flour ").unwrap();
        let b: IngredientName = "flour".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "flour");
    }

    #[test]
    fn deserializing_an_invalid_name_fails() {
        let res: Result<DishName, _> = serde_json::from_str("\"pie!\"");
        assert!(res.is_err());
    }

    #[test]
    fn stock_date_round_trips_through_text() {
        let date = StockDate::parse("2024-05-01").unwrap();
        assert_eq!(date.to_string(), "2024-05-01");
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-05-01\"");
    }
}
