mod loader;
pub mod value;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde_json::{json, Map, Value};

pub use value::{ConfigValue, FromConfigValue};

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Environment variables with this prefix override config keys.
const ENV_PREFIX: &str = "API_";

/// Flattened key-value settings loaded from YAML, `.env` files and the
/// environment.
///
/// Resolution order (lowest to highest priority):
/// 1. the YAML file
/// 2. `.env` file (loaded into process environment)
/// 3. `API_*` environment variables (`API_BASE_PATH` overrides `api.base_path`)
///
/// `.env` files never overwrite already-set environment variables.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, ConfigValue>,
}

impl Settings {
    /// Load settings from `path`, then overlay `.env` and the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_file(path.as_ref(), &mut values)?;

        let _ = dotenvy::dotenv();

        let mut settings = Settings { values };
        settings.overlay_env(std::env::vars());
        Ok(settings)
    }

    /// Create settings from a YAML string (useful for testing).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(Settings { values })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Overlay `API_*` variables from `vars`; other names are ignored.
    pub fn overlay_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let name = name.as_ref();
            if !name.starts_with(ENV_PREFIX) {
                continue;
            }
            if let Some(key) = loader::env_key(name) {
                self.values.insert(key, ConfigValue::String(value.into()));
            }
        }
    }

    /// Set a value programmatically.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Get a typed value for the given dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the key does not exist, or
    /// `ConfigError::TypeMismatch` if the value cannot be converted.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, returning a default if the key is missing.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .values
            .keys()
            .map(String::as_str)
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort_unstable();
        keys
    }
}

/// A security scheme listed under `securityDefinitions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    /// `apiKey`, `basic` or `oauth2`.
    pub kind: String,
    pub name: Option<String>,
    pub location: Option<String>,
}

impl SecurityScheme {
    pub fn api_key(name: impl Into<String>, location: impl Into<String>) -> Self {
        SecurityScheme {
            kind: "apiKey".into(),
            name: Some(name.into()),
            location: Some(location.into()),
        }
    }

    pub fn basic() -> Self {
        SecurityScheme {
            kind: "basic".into(),
            name: None,
            location: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.kind));
        if let Some(ref name) = self.name {
            out.insert("name".into(), json!(name));
        }
        if let Some(ref location) = self.location {
            out.insert("in".into(), json!(location));
        }
        Value::Object(out)
    }
}

/// Document metadata: the info block, schemes, base path and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DocConfig {
    pub version: String,
    pub title: String,
    pub description: String,
    pub terms_of_service: Option<String>,
    pub contact_email: Option<String>,
    pub license_name: Option<String>,
    pub license_url: Option<String>,
    pub schemes: Vec<String>,
    pub base_path: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Prefix of the routes serving the document itself.
    pub docs_prefix: String,
    pub security_definitions: BTreeMap<String, SecurityScheme>,
}

impl Default for DocConfig {
    fn default() -> Self {
        DocConfig {
            version: "1.0.0".into(),
            title: "API".into(),
            description: String::new(),
            terms_of_service: None,
            contact_email: None,
            license_name: None,
            license_url: None,
            schemes: vec!["http".into()],
            base_path: String::new(),
            consumes: vec!["application/vnd.api+json".into()],
            produces: vec!["application/vnd.api+json".into()],
            docs_prefix: "/openapi".into(),
            security_definitions: BTreeMap::new(),
        }
    }
}

impl DocConfig {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        DocConfig {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Read the `api.*` keys, falling back to the defaults.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut security_definitions = BTreeMap::new();
        for name in security_names(settings) {
            let prefix = format!("api.security.{name}");
            let scheme = SecurityScheme {
                kind: settings.get(&format!("{prefix}.type"))?,
                name: settings.get_or(&format!("{prefix}.name"), None),
                location: settings.get_or(&format!("{prefix}.in"), None),
            };
            security_definitions.insert(name, scheme);
        }

        Ok(DocConfig {
            version: settings.get_or("api.version", defaults.version),
            title: settings.get_or("api.title", defaults.title),
            description: settings.get_or("api.description", defaults.description),
            terms_of_service: settings.get_or("api.terms_of_service", None),
            contact_email: settings.get_or("api.contact_email", None),
            license_name: settings.get_or("api.license_name", None),
            license_url: settings.get_or("api.license_url", None),
            schemes: settings.get_or("api.schemes", defaults.schemes),
            base_path: settings.get_or("api.base_path", defaults.base_path),
            consumes: settings.get_or("api.consumes_content_types", defaults.consumes),
            produces: settings.get_or("api.produces_content_types", defaults.produces),
            docs_prefix: settings.get_or("api.docs_prefix", defaults.docs_prefix),
            security_definitions,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_terms_of_service(mut self, url: impl Into<String>) -> Self {
        self.terms_of_service = Some(url.into());
        self
    }

    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    pub fn with_license(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.license_name = Some(name.into());
        self.license_url = Some(url.into());
        self
    }

    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_docs_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.docs_prefix = prefix.into();
        self
    }

    pub fn with_security_scheme(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.security_definitions.insert(name.into(), scheme);
        self
    }

    /// The `info` block; unset keys and empty objects are left out.
    pub fn info(&self) -> Value {
        let mut info = Map::new();
        info.insert("version".into(), json!(self.version));
        info.insert("title".into(), json!(self.title));
        info.insert("description".into(), json!(self.description));
        if let Some(ref terms) = self.terms_of_service {
            info.insert("termsOfService".into(), json!(terms));
        }
        if let Some(ref email) = self.contact_email {
            info.insert("contact".into(), json!({ "email": email }));
        }

        let mut license = Map::new();
        if let Some(ref name) = self.license_name {
            license.insert("name".into(), json!(name));
        }
        if let Some(ref url) = self.license_url {
            license.insert("url".into(), json!(url));
        }
        if !license.is_empty() {
            info.insert("license".into(), Value::Object(license));
        }
        Value::Object(info)
    }

    pub fn security_definitions_json(&self) -> Value {
        Value::Object(
            self.security_definitions
                .iter()
                .map(|(name, scheme)| (name.clone(), scheme.to_json()))
                .collect(),
        )
    }
}

/// Scheme names declared under `api.security.<name>.*`, sorted and unique.
fn security_names(settings: &Settings) -> BTreeSet<String> {
    settings
        .keys_with_prefix("api.security.")
        .into_iter()
        .filter_map(|key| {
            let rest = key.strip_prefix("api.security.")?;
            let (name, _) = rest.rsplit_once('.')?;
            Some(name.to_string())
        })
        .collect()
}
