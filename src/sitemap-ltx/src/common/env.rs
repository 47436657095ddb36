use std::str::FromStr;

use crate::errors::{LlmsGenError, Result};

/// Reads and parses an optional environment variable.
/// Unset or blank variables yield `Ok(None)`; present but unparsable values are configuration errors.
pub fn optional_env_var<T>(env_var_name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(env_var_name) {
        Ok(v) if !v.trim().is_empty() => parse_env_value(env_var_name, &v).map(Some),
        _ => Ok(None),
    }
}

fn parse_env_value<T>(env_var_name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| LlmsGenError::InvalidConfig(format!("{} has an invalid value '{}': {}", env_var_name, value, e)))
}
