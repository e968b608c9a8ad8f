use std::collections::HashMap;

use crate::error::FilterError;

/// Equality filter over parks, built from search query parameters.
///
/// Only the fields listed here can be filtered on. Every set field must match;
/// an empty filter matches every park.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParkFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub parktype_id: Option<i64>,
    /// Parktype name.
    pub parktype: Option<String>,
    /// Neighborhood slug.
    pub neighborhood: Option<String>,
}

impl ParkFilter {
    pub const FIELDS: &'static [&'static str] =
        &["id", "name", "slug", "parktype_id", "parktype", "neighborhood"];

    /// Build a filter from raw query parameters. Unknown field names and
    /// non-integer values for integer fields are rejected.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        let mut filter = ParkFilter::default();

        for (field, value) in params {
            match field.as_str() {
                "id" => filter.id = Some(parse_int(field, value)?),
                "name" => filter.name = Some(value.clone()),
                "slug" => filter.slug = Some(value.clone()),
                "parktype_id" => filter.parktype_id = Some(parse_int(field, value)?),
                "parktype" => filter.parktype = Some(value.clone()),
                "neighborhood" => filter.neighborhood = Some(value.clone()),
                _ => return Err(FilterError::UnknownField(field.clone())),
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        *self == ParkFilter::default()
    }
}

fn parse_int(field: &str, value: &str) -> Result<i64, FilterError> {
    value.trim().parse().map_err(|_| FilterError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}
