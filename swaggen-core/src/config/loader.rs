use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Load and parse a YAML file, flattening it into the values map.
/// A missing file is not an error.
pub(crate) fn load_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if path.exists() {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
        load_yaml_str(&content, values)?;
    }
    Ok(())
}

/// Parse a YAML string and flatten it into the values map.
pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten_yaml("", &yaml, values);
    Ok(())
}

/// Flatten a YAML tree into dot-separated keys. Sequences are stored whole
/// under their parent key.
pub(crate) fn flatten_yaml(
    prefix: &str,
    value: &serde_yaml::Value,
    out: &mut HashMap<String, ConfigValue>,
) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key_str = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                let full_key = if prefix.is_empty() {
                    key_str
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(&full_key, v, out);
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
            }
        }
    }
}

/// Map an environment variable name to a config key:
/// `API_TERMS_OF_SERVICE` becomes `api.terms_of_service`.
///
/// Only the first underscore separates the section, so multi-word keys
/// survive the round trip.
pub(crate) fn env_key(name: &str) -> Option<String> {
    let (section, rest) = name.split_once('_')?;
    if section.is_empty() || rest.is_empty() {
        return None;
    }
    Some(format!("{}.{}", section.to_lowercase(), rest.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_nested_mappings() {
        let mut values = HashMap::new();
        load_yaml_str("api:\n  title: Pets\n  security:\n    key:\n      type: apiKey\n", &mut values)
            .unwrap();
        assert_eq!(values["api.title"], ConfigValue::String("Pets".into()));
        assert_eq!(values["api.security.key.type"], ConfigValue::String("apiKey".into()));
    }

    #[test]
    fn sequences_are_stored_whole() {
        let mut values = HashMap::new();
        load_yaml_str("api:\n  schemes: [http, https]\n", &mut values).unwrap();
        assert_eq!(
            values["api.schemes"],
            ConfigValue::List(vec![
                ConfigValue::String("http".into()),
                ConfigValue::String("https".into()),
            ])
        );
    }

    #[test]
    fn env_names_split_at_first_underscore() {
        assert_eq!(env_key("API_TERMS_OF_SERVICE").as_deref(), Some("api.terms_of_service"));
        assert_eq!(env_key("API_TITLE").as_deref(), Some("api.title"));
        assert_eq!(env_key("API"), None);
        assert_eq!(env_key("API_"), None);
    }
}
