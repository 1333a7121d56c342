//! Configuration validation.

use super::Config;
use crate::core::catalog::DialectRegistry;
use crate::error::{CatalogError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;
    if conn.host.is_empty() {
        return Err(CatalogError::Config("connection.host is required".into()));
    }
    if conn.database.is_empty() {
        return Err(CatalogError::Config(
            "connection.database is required".into(),
        ));
    }
    if conn.user.is_empty() {
        return Err(CatalogError::Config("connection.user is required".into()));
    }
    DialectRegistry::normalize_name(&conn.r#type)?;

    if conn.max_connections == 0 {
        return Err(CatalogError::Config(
            "connection.max_connections must be at least 1".into(),
        ));
    }
    if conn.query_timeout_secs == 0 {
        return Err(CatalogError::Config(
            "connection.query_timeout_secs must be at least 1".into(),
        ));
    }

    let intro = &config.introspection;
    if let Some(0) = intro.workers {
        return Err(CatalogError::Config(
            "introspection.workers must be at least 1".into(),
        ));
    }
    for schema in &intro.schemas {
        crate::core::identifier::validate_identifier(schema)?;
    }
    if let Some(rules) = &intro.length_rules {
        for rule in rules {
            if rule.udt_name.is_empty() {
                return Err(CatalogError::Config(
                    "introspection.length_rules: udt_name is required".into(),
                ));
            }
            if rule.header_size < 0 {
                return Err(CatalogError::Config(format!(
                    "introspection.length_rules: header_size for '{}' must not be negative",
                    rule.udt_name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, IntrospectionConfig};
    use crate::normalize::LengthRule;

    fn valid_config() -> Config {
        Config {
            connection: ConnectionConfig {
                r#type: "postgres".to_string(),
                host: "localhost".to_string(),
                port: None,
                database: "hr".to_string(),
                user: "postgres".to_string(),
                password: "password".to_string(),
                ssl_mode: "disable".to_string(),
                encrypt: false,
                trust_server_cert: false,
                max_connections: 4,
                query_timeout_secs: 30,
            },
            introspection: IntrospectionConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.connection.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_user_and_database() {
        let mut config = valid_config();
        config.connection.user = "".to_string();
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.connection.database = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_dialect() {
        let mut config = valid_config();
        config.connection.r#type = "oracle".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_dialect_aliases_accepted() {
        for alias in ["pg", "postgresql", "sqlserver", "MSSQL"] {
            let mut config = valid_config();
            config.connection.r#type = alias.to_string();
            assert!(validate(&config).is_ok(), "{}", alias);
        }
    }

    #[test]
    fn test_zero_workers() {
        let mut config = valid_config();
        config.introspection.workers = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_pool_and_timeout() {
        let mut config = valid_config();
        config.connection.max_connections = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.connection.query_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_header_size() {
        let mut config = valid_config();
        config.introspection.length_rules = Some(vec![LengthRule::new("_varchar", -4)]);
        assert!(validate(&config).is_err());

        config.introspection.length_rules = Some(vec![LengthRule::new("", 4)]);
        assert!(validate(&config).is_err());

        config.introspection.length_rules = Some(vec![LengthRule::new("_bpchar", 4)]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_schema_name() {
        let mut config = valid_config();
        config.introspection.schemas = vec!["".to_string()];
        assert!(validate(&config).is_err());
    }
}
