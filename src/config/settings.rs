//! Process settings read from the environment (after `.env` via dotenvy).

use crate::config::NamingConvention;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_PATH: &str = "db.json";
const DEFAULT_PG_SCHEMA: &str = "public";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct Settings {
    /// Postgres connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// json-server style document backing the in-memory store.
    pub db_path: PathBuf,
    /// Explicit schema definition; overrides introspection and inference.
    pub schema_path: Option<PathBuf>,
    pub pg_schema: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub naming: NamingConvention,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: None,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            schema_path: None,
            pg_schema: DEFAULT_PG_SCHEMA.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            naming: NamingConvention::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset or blank keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();
        let max_connections = match get("MAX_CONNECTIONS").map(|v| v.parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                tracing::warn!("MAX_CONNECTIONS is not a positive integer; using {}", DEFAULT_MAX_CONNECTIONS);
                DEFAULT_MAX_CONNECTIONS
            }
            None => DEFAULT_MAX_CONNECTIONS,
        };
        Settings {
            database_url: get("DATABASE_URL"),
            db_path: get("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            schema_path: get("SCHEMA_PATH").map(PathBuf::from),
            pg_schema: get("PG_SCHEMA").unwrap_or(defaults.pg_schema),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections,
            naming: get("IRREGULAR_PLURALS")
                .map(|v| parse_irregular_plurals(&v))
                .unwrap_or_default(),
        }
    }
}

/// Parses `person:people,child:children`. Malformed pairs are skipped.
fn parse_irregular_plurals(raw: &str) -> NamingConvention {
    raw.split(',')
        .filter_map(|pair| {
            let (singular, plural) = pair.split_once(':')?;
            let (singular, plural) = (singular.trim(), plural.trim());
            (!singular.is_empty() && !plural.is_empty()).then_some((singular, plural))
        })
        .fold(NamingConvention::new(), |n, (s, p)| n.with_irregular(s, p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]);
        assert!(s.database_url.is_none());
        assert_eq!(s.db_path, PathBuf::from("db.json"));
        assert_eq!(s.pg_schema, "public");
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
        assert_eq!(s.max_connections, 5);
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("PG_SCHEMA", "blog"),
            ("MAX_CONNECTIONS", "12"),
            ("IRREGULAR_PLURALS", "person:people, bad, child:children"),
        ]);
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(s.pg_schema, "blog");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.naming.pluralize("person"), "people");
        assert_eq!(s.naming.singularize("children"), "child");
    }

    #[test]
    fn invalid_max_connections_falls_back() {
        assert_eq!(settings(&[("MAX_CONNECTIONS", "zero")]).max_connections, 5);
        assert_eq!(settings(&[("MAX_CONNECTIONS", "0")]).max_connections, 5);
    }
}
