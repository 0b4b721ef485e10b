//! Runtime settings read from the environment (and `.env` when present).

use crate::error::ConfigError;
use axum::http::HeaderValue;
use regex::Regex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/ketebul";
const DEFAULT_SCHEMA: &str = "content";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000/";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_URL: &str = "/media/";
const DEFAULT_ALLOWED_HOSTS: &[&str] = &["localhost", "127.0.0.1", "testserver"];

/// First path segments owned by the router; media cannot be mounted over them.
const RESERVED_MEDIA_PREFIXES: &[&str] = &["api", "health", "ready", "version"];

/// Deployment environment. Media files are only served outside production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    pub fn serves_media(self) -> bool {
        !matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "development" | "dev" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidValue {
                key: "KETEBUL_ENV",
                reason: format!("'{}' (expected local, staging or production)", other),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// Schema holding the content tables. Validated as a plain PostgreSQL identifier.
    pub schema: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Where `GET /` redirects to. Always http(s) with a host.
    pub frontend_url: Url,
    pub media_root: PathBuf,
    /// Starts and ends with `/` and has at least one segment.
    pub media_url: String,
    pub environment: Environment,
    pub trust_forwarded_proto: bool,
    /// Host names accepted in the `Host` header, lowercase, without port.
    /// `*` accepts any host; a leading `.` also matches subdomains.
    pub allowed_hosts: Vec<String>,
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is fine; variables may come from the real environment.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let schema = get("KETEBUL_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        validate_identifier(&schema)?;

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "DATABASE_MAX_CONNECTIONS",
                    reason: format!("'{}' is not a positive integer", v),
                }
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::InvalidValue {
            key: "BIND_ADDR",
            reason: format!("'{}': {}", bind_raw, e),
        })?;

        let frontend_raw = get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.into());
        let frontend_url = parse_http_url(&frontend_raw)
            .filter(|u| HeaderValue::from_str(u.as_str()).is_ok())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "FRONTEND_URL",
                reason: format!("'{}' is not an http(s) URL with a host", frontend_raw),
            })?;

        let media_url =
            normalize_media_url(&get("MEDIA_URL").unwrap_or_else(|| DEFAULT_MEDIA_URL.into()))?;

        let allowed_hosts = match get("ALLOWED_HOSTS") {
            Some(v) => parse_allowed_hosts(&v)?,
            None => default_allowed_hosts(),
        };

        let environment = match get("KETEBUL_ENV") {
            Some(v) => v.parse()?,
            None => Environment::default(),
        };

        let trust_forwarded_proto = match get("TRUST_FORWARDED_PROTO") {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::InvalidValue {
                key: "TRUST_FORWARDED_PROTO",
                reason: format!("'{}' is not a boolean", v),
            })?,
            None => false,
        };

        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            schema,
            max_connections,
            bind_addr,
            frontend_url,
            media_root: PathBuf::from(get("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.into())),
            media_url,
            environment,
            trust_forwarded_proto,
            allowed_hosts,
        })
    }

    /// Whether `host` (no port) may appear in absolute URLs built for a request.
    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.allowed_hosts.iter().any(|pattern| {
            pattern == "*"
                || *pattern == host
                || pattern
                    .strip_prefix('.')
                    .is_some_and(|domain| host == domain || host.ends_with(pattern.as_str()))
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            schema: DEFAULT_SCHEMA.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            frontend_url: Url::parse(DEFAULT_FRONTEND_URL).expect("default frontend URL parses"),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            media_url: DEFAULT_MEDIA_URL.into(),
            environment: Environment::Local,
            trust_forwarded_proto: false,
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").map_err(|e| ConfigError::Load(e.to_string()))?;
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: "KETEBUL_SCHEMA",
            reason: format!("'{}' is not a lowercase PostgreSQL identifier", name),
        })
    }
}

/// Parse an absolute http(s) URL that names a host.
pub(crate) fn parse_http_url(raw: &str) -> Option<Url> {
    if raw.contains(|c: char| c.is_control() || c.is_whitespace()) {
        return None;
    }
    let url = Url::parse(raw).ok()?;
    let http = matches!(url.scheme(), "http" | "https");
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    (http && has_host).then_some(url)
}

fn default_allowed_hosts() -> Vec<String> {
    DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect()
}

fn parse_allowed_hosts(raw: &str) -> Result<Vec<String>, ConfigError> {
    let hosts: Vec<String> = raw
        .split(',')
        .map(|h| h.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect();
    if let Some(bad) = hosts
        .iter()
        .find(|h| h.contains(|c: char| c.is_whitespace() || matches!(c, '/' | '@' | '?' | '#')))
    {
        return Err(ConfigError::InvalidValue {
            key: "ALLOWED_HOSTS",
            reason: format!("'{}' is not a host name", bad),
        });
    }
    if hosts.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "ALLOWED_HOSTS",
            reason: "no hosts listed".into(),
        });
    }
    Ok(hosts)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Normalize to `/prefix/`. The site root and router-owned prefixes are refused.
fn normalize_media_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_matches('/');
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: "MEDIA_URL",
        reason: format!("'{}' {}", raw, reason),
    };
    if trimmed.is_empty() {
        return Err(invalid("would mount media over the whole site"));
    }
    if trimmed.contains(|c: char| c.is_whitespace() || matches!(c, '?' | '#' | '*' | ':')) {
        return Err(invalid("is not a URL path"));
    }
    let first = trimmed.split('/').next().unwrap_or(trimmed);
    if RESERVED_MEDIA_PREFIXES.contains(&first) {
        return Err(invalid("collides with an API route"));
    }
    Ok(format!("/{}/", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let s = settings_from(&[]).unwrap();
        assert_eq!(s.database_url, "postgres://localhost/ketebul");
        assert_eq!(s.schema, "content");
        assert_eq!(s.bind_addr.port(), 8000);
        assert_eq!(s.frontend_url.as_str(), "http://localhost:3000/");
        assert_eq!(s.media_url, "/media/");
        assert_eq!(s.allowed_hosts, vec!["localhost", "127.0.0.1", "testserver"]);
        assert_eq!(s.environment, Environment::Local);
        assert!(!s.trust_forwarded_proto);
    }

    #[test]
    fn frontend_url_is_configurable() {
        let s = settings_from(&[("FRONTEND_URL", "https://ketebul.example/app")]).unwrap();
        assert_eq!(s.frontend_url.as_str(), "https://ketebul.example/app");
    }

    #[test]
    fn frontend_url_must_be_http_with_a_host() {
        for bad in [
            "ftp://x",
            "http://",
            "ketebul.example",
            "http://ketebul example/",
            "http://k\u{7f}x/",
            "http://:::/",
        ] {
            let err = settings_from(&[("FRONTEND_URL", bad)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: "FRONTEND_URL", .. }),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn media_url_gets_slashes() {
        let s = settings_from(&[("MEDIA_URL", "uploads")]).unwrap();
        assert_eq!(s.media_url, "/uploads/");
        let s = settings_from(&[("MEDIA_URL", "/site/media")]).unwrap();
        assert_eq!(s.media_url, "/site/media/");
    }

    #[test]
    fn media_url_cannot_shadow_routes() {
        for bad in ["/", "//", "/api/", "api/media", "/health/", "ready", "/version/", "/a b/"] {
            let err = settings_from(&[("MEDIA_URL", bad)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: "MEDIA_URL", .. }),
                "{:?} accepted",
                bad
            );
        }
        assert!(settings_from(&[("MEDIA_URL", "/apis/")]).is_ok());
    }

    #[test]
    fn allowed_hosts_are_parsed_and_matched() {
        let s = settings_from(&[("ALLOWED_HOSTS", " Ketebul.Example, .cdn.example ,")]).unwrap();
        assert_eq!(s.allowed_hosts, vec!["ketebul.example", ".cdn.example"]);
        assert!(s.is_allowed_host("ketebul.example"));
        assert!(s.is_allowed_host("KETEBUL.example."));
        assert!(s.is_allowed_host("cdn.example"));
        assert!(s.is_allowed_host("img.cdn.example"));
        assert!(!s.is_allowed_host("evil.example"));
        assert!(!s.is_allowed_host("evilcdn.example"));

        let any = settings_from(&[("ALLOWED_HOSTS", "*")]).unwrap();
        assert!(any.is_allowed_host("anything.example"));

        assert!(settings_from(&[("ALLOWED_HOSTS", "user@evil.example")]).is_err());
        assert!(settings_from(&[("ALLOWED_HOSTS", " , ")]).is_err());
    }

    #[test]
    fn schema_must_be_identifier() {
        assert!(settings_from(&[("KETEBUL_SCHEMA", "drop table;")]).is_err());
        assert!(settings_from(&[("KETEBUL_SCHEMA", "site_content")]).is_ok());
    }

    #[test]
    fn environment_parsing() {
        let s = settings_from(&[("KETEBUL_ENV", "Production")]).unwrap();
        assert_eq!(s.environment, Environment::Production);
        assert!(!s.environment.serves_media());
        assert!(Environment::Staging.serves_media());
        assert!(settings_from(&[("KETEBUL_ENV", "qa")]).is_err());
    }

    #[test]
    fn bad_numbers_and_flags_are_rejected() {
        assert!(settings_from(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(settings_from(&[("BIND_ADDR", "localhost")]).is_err());
        assert!(settings_from(&[("TRUST_FORWARDED_PROTO", "maybe")]).is_err());
        let s = settings_from(&[("TRUST_FORWARDED_PROTO", "yes")]).unwrap();
        assert!(s.trust_forwarded_proto);
    }
}
