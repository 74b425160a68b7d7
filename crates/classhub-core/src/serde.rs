use serde::{Deserialize, Deserializer};

/// Tri-state string field for partial updates.
///
/// Use together with `#[serde(default)]`: an absent field stays `None`,
/// `null` or `""` becomes `Some(None)` (clear), anything else `Some(Some(value))`.
pub fn deserialize_clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(Some(None)),
        Some(s) => Ok(Some(Some(s))),
        None => Ok(Some(None)),
    }
}

/// Treats `""` like an absent value.
pub fn deserialize_optional_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}
