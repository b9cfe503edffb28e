// Configuration chargée depuis l'environnement (.env via dotenv)

use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Paramètres SMTP (optionnels). Sans eux, les emails sont simplement loggés.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub reset_granularity_secs: i64,
    pub reset_max_steps: i64,
    pub mail_from: String,
    /// Origine publique du service, utilisée dans les liens envoyés par email
    pub public_base_url: String,
    pub smtp: Option<SmtpSettings>,
    pub auto_create_schema: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let smtp = match env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpSettings {
                host,
                port: parse_or("SMTP_PORT", 587)?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
            }),
            Err(_) => None,
        };

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("PORT", 8080)?;
        let public_base_url = match env::var("PUBLIC_BASE_URL") {
            Ok(url) => parse_base_url(url)?,
            Err(_) => format!("http://{}:{}", host, port),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host,
            port,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl_secs: parse_or("ACCESS_TOKEN_TTL_SECS", 300)?,
            refresh_token_ttl_secs: parse_or("REFRESH_TOKEN_TTL_SECS", 86_400)?,
            reset_granularity_secs: parse_or("PASSWORD_RESET_GRANULARITY_SECS", 3_600)?,
            reset_max_steps: parse_or("PASSWORD_RESET_MAX_STEPS", 72)?,
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@example.com".to_string()),
            public_base_url,
            smtp,
            auto_create_schema: parse_or("AUTO_CREATE_SCHEMA", false)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// "<scheme>://<host>[:port]" sans slash final
fn parse_base_url(value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let valid = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty() && !rest.contains('/')));
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::Invalid { name: "PUBLIC_BASE_URL", value })
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: i64 = parse_or("WATCHLIST_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_public_base_url_is_an_origin() {
        assert_eq!(
            parse_base_url("https://watch.example.com/".to_string()).unwrap(),
            "https://watch.example.com"
        );
        assert_eq!(parse_base_url("http://localhost:8080".to_string()).unwrap(), "http://localhost:8080");
        assert!(parse_base_url("watch.example.com".to_string()).is_err());
        assert!(parse_base_url("https://".to_string()).is_err());
        assert!(parse_base_url("https://watch.example.com/app".to_string()).is_err());
    }

    #[test]
    fn test_required_reports_missing_variable() {
        let err = required("WATCHLIST_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WATCHLIST_TEST_UNSET_VARIABLE")));
    }
}
