use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Parses an optional query value, treating `""` as absent.
///
/// HTML forms and some HTTP clients send `?status=&supplier_id=` for cleared filters.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
