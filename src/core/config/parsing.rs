use std::env;
use std::str::FromStr;

use super::types::ConfigError;

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Trimmed value of `key`; blank counts as unset.
pub(crate) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(crate) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn env_flag(key: &str) -> bool {
    env_optional(key).is_some_and(|value| parse_bool(&value))
}

/// Reads `key` as a number, falling back to `default` when unset.
pub(crate) fn env_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_optional(key) {
        Some(value) => parse_number(key, value),
        None => Ok(default),
    }
}

pub(crate) fn parse_number<T: FromStr>(field: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(crate) fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Accepts a JSON array or a comma-separated list. Blank input yields the local dev origins.
pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let raw = value.unwrap_or_default();
    let trimmed = raw.trim();

    let origins: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|_| ConfigError::InvalidCors(raw.clone()))?
    } else {
        trimmed.split(',').map(str::trim).filter(|item| !item.is_empty()).map(String::from).collect()
    };

    if origins.is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    }
    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_accept_json_and_csv() {
        let expected = vec!["http://a".to_string(), "http://b".to_string()];
        assert_eq!(parse_cors_origins(Some("[\"http://a\",\"http://b\"]".into())).unwrap(), expected);
        assert_eq!(parse_cors_origins(Some("http://a, http://b".into())).unwrap(), expected);
    }

    #[test]
    fn cors_origins_default_when_blank() {
        assert_eq!(parse_cors_origins(Some(" ".into())).unwrap().len(), DEFAULT_CORS_ORIGINS.len());
        assert_eq!(parse_cors_origins(Some("[]".into())).unwrap().len(), DEFAULT_CORS_ORIGINS.len());
        assert!(matches!(
            parse_cors_origins(Some("[\"http://a\"".into())),
            Err(ConfigError::InvalidCors(_))
        ));
    }

    #[test]
    fn bool_variants() {
        for yes in ["1", "true", "TRUE", "yes", "On"] {
            assert!(parse_bool(yes), "{yes}");
        }
        for no in ["0", "false", "off", ""] {
            assert!(!parse_bool(no), "{no}");
        }
    }

    #[test]
    fn numbers_report_field() {
        let err = parse_number::<u64>("ATTEMPT_SUBMIT_GRACE_SECONDS", "soon".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for ATTEMPT_SUBMIT_GRACE_SECONDS: soon");
        assert_eq!(parse_number::<u16>("POSTGRES_PORT", "5432".to_string()).unwrap(), 5432);
        assert!(parse_number::<u16>("POSTGRES_PORT", "70000".to_string()).is_err());
    }
}
