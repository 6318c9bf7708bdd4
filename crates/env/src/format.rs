//! Property source file formats

use crate::error::{EnvError, EnvResult};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Format of a property source file
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// JSON format
    Json,

    /// TOML format
    Toml,

    /// YAML format
    Yaml,

    /// Java-style `.properties` (flat `key=value` lines)
    Properties,

    /// Unknown format
    Unknown(String),
}

impl SourceFormat {
    /// Extensions probed for `application.<ext>` files, in load order
    pub const PROBE_ORDER: [SourceFormat; 4] = [
        SourceFormat::Properties,
        SourceFormat::Json,
        SourceFormat::Toml,
        SourceFormat::Yaml,
    ];

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&'static str] {
        match self {
            SourceFormat::Json => &["json"],
            SourceFormat::Toml => &["toml"],
            SourceFormat::Yaml => &["yml", "yaml"],
            SourceFormat::Properties => &["properties"],
            SourceFormat::Unknown(_) => &[],
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" => SourceFormat::Json,
            "toml" => SourceFormat::Toml,
            "yml" | "yaml" => SourceFormat::Yaml,
            "properties" | "props" => SourceFormat::Properties,
            _ => SourceFormat::Unknown(ext.to_string()),
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(SourceFormat::Unknown("no_extension".to_string()))
    }

    /// Parse `content` into a JSON document.
    ///
    /// `path` only labels errors.
    pub fn parse(&self, content: &str, path: &Path) -> EnvResult<Value> {
        match self {
            SourceFormat::Json => serde_json::from_str(content)
                .map_err(|e| EnvError::parse(path, format!("JSON parse error: {e}"))),
            #[cfg(feature = "toml")]
            SourceFormat::Toml => toml::from_str::<Value>(content)
                .map_err(|e| EnvError::parse(path, format!("TOML parse error: {e}"))),
            #[cfg(feature = "yaml")]
            SourceFormat::Yaml => parse_yaml(content, path),
            SourceFormat::Properties => parse_properties(content, path),
            other => Err(EnvError::format_not_supported(other.to_string())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Json => write!(f, "JSON"),
            SourceFormat::Toml => write!(f, "TOML"),
            SourceFormat::Yaml => write!(f, "YAML"),
            SourceFormat::Properties => write!(f, "Properties"),
            SourceFormat::Unknown(s) => write!(f, "Unknown ({s})"),
        }
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(content: &str, path: &Path) -> EnvResult<Value> {
    use yaml_rust2::YamlLoader;

    let docs = YamlLoader::load_from_str(content)
        .map_err(|e| EnvError::parse(path, format!("YAML parse error: {e}")))?;

    match docs.first() {
        Some(doc) => yaml_to_json(doc, path),
        None => Ok(Value::Object(serde_json::Map::new())),
    }
}

#[cfg(feature = "yaml")]
fn yaml_to_json(yaml: &yaml_rust2::Yaml, path: &Path) -> EnvResult<Value> {
    use yaml_rust2::Yaml;

    match yaml {
        Yaml::Real(s) => Ok(s
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| Value::String(s.clone()), Value::Number)),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Integer(i) => Ok(Value::from(*i)),
        Yaml::Boolean(b) => Ok(Value::Bool(*b)),
        Yaml::Array(arr) => arr
            .iter()
            .map(|item| yaml_to_json(item, path))
            .collect::<EnvResult<Vec<_>>>()
            .map(Value::Array),
        Yaml::Hash(hash) => {
            let mut obj = serde_json::Map::new();
            for (key, value) in hash {
                let key = match key {
                    Yaml::String(s) | Yaml::Real(s) => s.clone(),
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Boolean(b) => b.to_string(),
                    _ => return Err(EnvError::parse(path, "Invalid key type in YAML mapping")),
                };
                obj.insert(key, yaml_to_json(value, path)?);
            }
            Ok(Value::Object(obj))
        }
        Yaml::Null => Ok(Value::Null),
        Yaml::BadValue => Err(EnvError::parse(path, "Bad YAML value encountered")),
        _ => Err(EnvError::parse(path, "Unsupported YAML construct")),
    }
}

/// Parse `.properties` content. Keys stay flat; values stay strings.
fn parse_properties(content: &str, path: &Path) -> EnvResult<Value> {
    let mut result = serde_json::Map::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let Some(pos) = line.find(['=', ':']) else {
            return Err(EnvError::parse(
                path,
                format!("Invalid properties format at line {}", line_num + 1),
            ));
        };

        let key = line[..pos].trim();
        if key.is_empty() {
            return Err(EnvError::parse(
                path,
                format!("Missing key at line {}", line_num + 1),
            ));
        }
        result.insert(
            key.to_string(),
            Value::String(line[pos + 1..].trim().to_string()),
        );
    }

    Ok(Value::Object(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_extension("json"), SourceFormat::Json);
        assert_eq!(SourceFormat::from_extension("YML"), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_extension("yaml"), SourceFormat::Yaml);
        assert_eq!(
            SourceFormat::from_extension("props"),
            SourceFormat::Properties
        );
        assert!(matches!(
            SourceFormat::from_extension("hcl"),
            SourceFormat::Unknown(_)
        ));
        assert_eq!(
            SourceFormat::from_path(Path::new("conf/application.toml")),
            SourceFormat::Toml
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("noext")),
            SourceFormat::Unknown(_)
        ));
    }

    #[test]
    fn test_parse_json() {
        let value = SourceFormat::Json
            .parse(r#"{"db": {"port": 5432}}"#, Path::new("a.json"))
            .unwrap();
        assert_eq!(value, json!({"db": {"port": 5432}}));

        let err = SourceFormat::Json
            .parse("{not json", Path::new("a.json"))
            .unwrap_err();
        assert!(matches!(err, EnvError::Parse { .. }));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_parse_toml() {
        let value = SourceFormat::Toml
            .parse("[db]\nport = 5432\nhost = \"localhost\"\n", Path::new("a.toml"))
            .unwrap();
        assert_eq!(value, json!({"db": {"port": 5432, "host": "localhost"}}));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_parse_yaml() {
        let value = SourceFormat::Yaml
            .parse(
                "db:\n  port: 5432\n  ratio: 0.5\n  name: \"123\"\n  tags: [a, b]\n",
                Path::new("a.yml"),
            )
            .unwrap();
        assert_eq!(
            value,
            json!({"db": {"port": 5432, "ratio": 0.5, "name": "123", "tags": ["a", "b"]}})
        );

        let empty = SourceFormat::Yaml.parse("", Path::new("a.yml")).unwrap();
        assert_eq!(empty, json!({}));
    }

    #[test]
    fn test_parse_properties() {
        let value = SourceFormat::Properties
            .parse(
                "# comment\n! also comment\ndb.port = 5432\ndb.host: localhost\n\nurl=jdbc:h2:mem\n",
                Path::new("a.properties"),
            )
            .unwrap();
        assert_eq!(
            value,
            json!({"db.port": "5432", "db.host": "localhost", "url": "jdbc:h2:mem"})
        );

        assert!(
            SourceFormat::Properties
                .parse("no separator here", Path::new("a.properties"))
                .is_err()
        );
    }

    #[test]
    fn test_unknown_format_not_supported() {
        let err = SourceFormat::Unknown("hcl".into())
            .parse("", Path::new("a.hcl"))
            .unwrap_err();
        assert!(matches!(err, EnvError::FormatNotSupported { .. }));
    }
}
