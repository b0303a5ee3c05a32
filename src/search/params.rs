//! Search Parameter Validator
//!
//! Turns the loose, optional query-string parameters of a search request into a
//! normalized [`SearchRequest`], or rejects them with the first failing rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum length (in characters) for the free-text parameters
const MIN_TEXT_LEN: usize = 3;

/// Raw search parameters as they arrive on the query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchParams {
    pub title: Option<String>,
    pub minprice: Option<String>,
    pub maxprice: Option<String>,
    pub location: Option<String>,
    pub amenities: Option<String>,
    pub sort: Option<String>,
}

/// Price sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    /// Case-sensitive: only `asc` and `desc` are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::InvalidSort),
        }
    }
}

/// A validated, normalized search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub title: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub location: String,
    pub amenities: Option<String>,
    pub sort: Option<SortOrder>,
}

/// Rejection reasons, each surfaced to the client verbatim
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title should be atleast 3 characters")]
    TitleTooShort,
    #[error("Amenities should be atleast 3 characters")]
    AmenitiesTooShort,
    #[error("Invalid minprice")]
    InvalidMinPrice,
    #[error("Invalid maxprice")]
    InvalidMaxPrice,
    #[error("Location is required")]
    LocationRequired,
    #[error("Location should be atleast 3 characters")]
    LocationTooShort,
    #[error("Invalid sort value")]
    InvalidSort,
}

impl RawSearchParams {
    /// Validate and normalize the parameters.
    ///
    /// Rules run in a fixed order and the first failure wins:
    /// title, amenities, minprice, maxprice, location, sort.
    /// Empty strings count as absent.
    pub fn validate(&self) -> Result<SearchRequest, ValidationError> {
        let title = match present(&self.title) {
            Some(raw) if char_len(raw) < MIN_TEXT_LEN => {
                return Err(ValidationError::TitleTooShort)
            }
            Some(raw) => Some(normalize_text(raw)),
            None => None,
        };

        let amenities = match present(&self.amenities) {
            Some(raw) if char_len(raw) < MIN_TEXT_LEN => {
                return Err(ValidationError::AmenitiesTooShort)
            }
            Some(raw) => Some(raw.to_lowercase()),
            None => None,
        };

        let min_price = present(&self.minprice)
            .map(|raw| parse_price(raw).ok_or(ValidationError::InvalidMinPrice))
            .transpose()?;

        let max_price = present(&self.maxprice)
            .map(|raw| parse_price(raw).ok_or(ValidationError::InvalidMaxPrice))
            .transpose()?;

        let location = match present(&self.location) {
            Some(raw) => {
                let normalized = normalize_text(raw);
                if char_len(&normalized) < MIN_TEXT_LEN {
                    return Err(ValidationError::LocationTooShort);
                }
                normalized
            }
            None => return Err(ValidationError::LocationRequired),
        };

        let sort = present(&self.sort)
            .map(SortOrder::from_str)
            .transpose()?;

        Ok(SearchRequest {
            title,
            min_price,
            max_price,
            location,
            amenities,
            sort,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Trim, collapse whitespace runs to a single space, lowercase
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Accept only plain ASCII digits that parse to a value above zero
pub fn parse_price(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_location(location: &str) -> RawSearchParams {
        RawSearchParams {
            location: Some(location.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_location_only() {
        let req = with_location("Downtown").validate().unwrap();
        assert_eq!(req.location, "downtown");
        assert!(req.title.is_none());
        assert!(req.min_price.is_none());
        assert!(req.max_price.is_none());
        assert!(req.amenities.is_none());
        assert!(req.sort.is_none());
    }

    #[test]
    fn test_missing_location() {
        let err = RawSearchParams::default().validate().unwrap_err();
        assert_eq!(err, ValidationError::LocationRequired);
        assert_eq!(err.to_string(), "Location is required");
    }

    #[test]
    fn test_empty_location_counts_as_missing() {
        let err = with_location("").validate().unwrap_err();
        assert_eq!(err, ValidationError::LocationRequired);
    }

    #[test]
    fn test_short_location() {
        let err = with_location("ab").validate().unwrap_err();
        assert_eq!(err.to_string(), "Location should be atleast 3 characters");
    }

    #[test]
    fn test_location_checked_after_normalization() {
        // Five characters raw, two after trimming
        let err = with_location("  ab ").validate().unwrap_err();
        assert_eq!(err, ValidationError::LocationTooShort);
    }

    #[test]
    fn test_title_normalized() {
        let params = RawSearchParams {
            title: Some("  New  York ".to_string()),
            ..with_location("downtown")
        };
        let req = params.validate().unwrap();
        assert_eq!(req.title.as_deref(), Some("new york"));
    }

    #[test]
    fn test_title_length_checked_before_trimming() {
        // Raw length is 4 so it passes, even though it normalizes to "a"
        let params = RawSearchParams {
            title: Some(" a  ".to_string()),
            ..with_location("downtown")
        };
        assert_eq!(params.validate().unwrap().title.as_deref(), Some("a"));

        let params = RawSearchParams {
            title: Some("ab".to_string()),
            ..with_location("downtown")
        };
        assert_eq!(params.validate().unwrap_err(), ValidationError::TitleTooShort);
    }

    #[test]
    fn test_amenities_lowercased_without_trimming() {
        let params = RawSearchParams {
            amenities: Some(" Pool  Gym".to_string()),
            ..with_location("downtown")
        };
        assert_eq!(params.validate().unwrap().amenities.as_deref(), Some(" pool  gym"));
    }

    #[test]
    fn test_short_amenities() {
        let params = RawSearchParams {
            amenities: Some("tv".to_string()),
            ..with_location("downtown")
        };
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "Amenities should be atleast 3 characters"
        );
    }

    #[test]
    fn test_invalid_min_price() {
        for bad in ["-5", "abc", "0", "5.0", "+5", "99999999999999999999999"] {
            let params = RawSearchParams {
                minprice: Some(bad.to_string()),
                ..with_location("downtown")
            };
            assert_eq!(
                params.validate().unwrap_err(),
                ValidationError::InvalidMinPrice,
                "minprice {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_max_price() {
        let params = RawSearchParams {
            maxprice: Some("abc".to_string()),
            ..with_location("downtown")
        };
        assert_eq!(params.validate().unwrap_err().to_string(), "Invalid maxprice");
    }

    #[test]
    fn test_min_above_max_is_accepted() {
        let params = RawSearchParams {
            minprice: Some("10".to_string()),
            maxprice: Some("5".to_string()),
            ..with_location("downtown")
        };
        let req = params.validate().unwrap();
        assert_eq!(req.min_price, Some(10));
        assert_eq!(req.max_price, Some(5));
    }

    #[test]
    fn test_sort_values() {
        let params = RawSearchParams {
            sort: Some("asc".to_string()),
            ..with_location("downtown")
        };
        assert_eq!(params.validate().unwrap().sort, Some(SortOrder::Asc));

        for bad in ["xyz", "ASC", "Desc"] {
            let params = RawSearchParams {
                sort: Some(bad.to_string()),
                ..with_location("downtown")
            };
            assert_eq!(params.validate().unwrap_err().to_string(), "Invalid sort value");
        }
    }

    #[test]
    fn test_rule_precedence() {
        // Every field is bad: title wins
        let mut params = RawSearchParams {
            title: Some("ab".to_string()),
            minprice: Some("x".to_string()),
            maxprice: Some("y".to_string()),
            location: None,
            amenities: Some("tv".to_string()),
            sort: Some("up".to_string()),
        };
        assert_eq!(params.validate().unwrap_err(), ValidationError::TitleTooShort);

        params.title = None;
        assert_eq!(params.validate().unwrap_err(), ValidationError::AmenitiesTooShort);

        params.amenities = None;
        assert_eq!(params.validate().unwrap_err(), ValidationError::InvalidMinPrice);

        params.minprice = None;
        assert_eq!(params.validate().unwrap_err(), ValidationError::InvalidMaxPrice);

        params.maxprice = None;
        assert_eq!(params.validate().unwrap_err(), ValidationError::LocationRequired);

        params.location = Some("downtown".to_string());
        assert_eq!(params.validate().unwrap_err(), ValidationError::InvalidSort);
    }

    #[test]
    fn test_unicode_length_counts_characters() {
        // Three characters, six bytes
        let req = with_location("äöü").validate().unwrap();
        assert_eq!(req.location, "äöü");
    }

    #[test]
    fn test_sort_order_display() {
        assert_eq!(SortOrder::Asc.to_string(), "asc");
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }
}
