//! SatisfactionRating value object (1 to 5 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// User satisfaction rating given when a session closes: 1 (poor) to 5 (great).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SatisfactionRating(i8);

impl SatisfactionRating {
    /// Creates a SatisfactionRating, returning error if out of range.
    pub fn new(value: i8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::out_of_range(
                "satisfaction_rating",
                1,
                5,
                value as i32,
            ))
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> i8 {
        self.0
    }
}

impl fmt::Display for SatisfactionRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_range() {
        for v in 1..=5 {
            assert_eq!(SatisfactionRating::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(SatisfactionRating::new(0).is_err());
        assert!(SatisfactionRating::new(6).is_err());
    }

    #[test]
    fn displays_out_of_five() {
        assert_eq!(format!("{}", SatisfactionRating::new(4).unwrap()), "4/5");
    }
}
