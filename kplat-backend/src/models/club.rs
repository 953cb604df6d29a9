//! Football clubs table model
//!
//! `(name, country)` is unique; the same club name may exist in different
//! countries.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{bounded_text, ValidationError};

pub const MAX_CLUB_NAME_LEN: usize = 100;
pub const MAX_COUNTRY_LEN: usize = 50;
pub const MIN_FOUNDED_YEAR: i32 = 1800;

/// Football club record from database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FootballClub {
    pub id: i32,
    pub name: String,
    pub country: String,
    pub founded_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClubName(String);

impl ClubName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("name", s, MAX_CLUB_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Country(String);

impl Country {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("country", s, MAX_COUNTRY_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Founding year in `[1800, current year]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundedYear(i32);

impl FoundedYear {
    /// Validate against the current UTC year.
    pub fn new(year: i32) -> Result<Self, ValidationError> {
        Self::as_of(year, Utc::now().year())
    }

    /// Validate against an explicit current year.
    pub fn as_of(year: i32, current_year: i32) -> Result<Self, ValidationError> {
        if !(MIN_FOUNDED_YEAR..=current_year).contains(&year) {
            return Err(ValidationError::OutOfRange {
                field: "founded_year",
                value: year.into(),
                min: MIN_FOUNDED_YEAR.into(),
                max: current_year.into(),
            });
        }
        Ok(Self(year))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Body of `POST /footballClub`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub founded_year: Option<i32>,
}

/// Validated insert
#[derive(Debug, Clone)]
pub struct NewClub {
    pub name: ClubName,
    pub country: Country,
    pub founded_year: Option<FoundedYear>,
}

impl TryFrom<CreateClubRequest> for NewClub {
    type Error = ValidationError;

    fn try_from(req: CreateClubRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: ClubName::new(&req.name)?,
            country: Country::new(&req.country)?,
            founded_year: req.founded_year.map(FoundedYear::new).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn founded_year_bounds_are_inclusive() {
        assert!(FoundedYear::as_of(1800, 2026).is_ok());
        assert!(FoundedYear::as_of(2026, 2026).is_ok());
        assert!(FoundedYear::as_of(1799, 2026).is_err());
        assert!(FoundedYear::as_of(2027, 2026).is_err());
    }

    #[test]
    fn next_year_is_rejected() {
        let next = Utc::now().year() + 1;
        let err = FoundedYear::new(next).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "founded_year",
                ..
            }
        ));
    }

    #[test]
    fn country_max_length() {
        assert!(Country::new(&"x".repeat(50)).is_ok());
        assert!(matches!(
            Country::new(&"x".repeat(51)).unwrap_err(),
            ValidationError::TooLong { max: 50, .. }
        ));
    }

    #[test]
    fn request_without_year_is_valid() {
        let req: CreateClubRequest =
            serde_json::from_str(r#"{"name": "Real Madrid", "country": "Spain"}"#).unwrap();
        let club = NewClub::try_from(req).unwrap();
        assert_eq!(club.founded_year, None);
    }

    #[test]
    fn request_with_bad_year_is_rejected() {
        let req: CreateClubRequest = serde_json::from_str(
            r#"{"name": "Old Club", "country": "England", "founded_year": 1066}"#,
        )
        .unwrap();
        assert!(NewClub::try_from(req).is_err());
    }

    proptest! {
        #[test]
        fn prop_years_outside_range_always_rejected(year in prop_oneof![i32::MIN..1800, 2027..i32::MAX]) {
            prop_assert!(FoundedYear::as_of(year, 2026).is_err());
        }

        #[test]
        fn prop_years_inside_range_accepted(year in 1800i32..=2026) {
            prop_assert_eq!(FoundedYear::as_of(year, 2026).unwrap().get(), year);
        }
    }
}
