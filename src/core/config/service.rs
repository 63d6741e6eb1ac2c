use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use super::paths::AppPaths;
use crate::core::errors::RagError;

pub(crate) const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 10] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "private_key",
    "auth_",
    "access_key",
    "bearer",
];

const SENSITIVE_WHITELIST: [&str; 4] = ["max_tokens", "summary_max_tokens", "top_k", "tokens"];

#[derive(Debug, Clone, Copy)]
enum EnvKind {
    Text,
    Integer,
    Float,
}

/// Environment variables layered over the YAML files, with their config path.
const ENV_OVERRIDES: [(&str, &str, &str, EnvKind); 7] = [
    ("PINECONE_API_KEY", "pinecone", "api_key", EnvKind::Text),
    ("PINECONE_INDEX_NAME", "pinecone", "index_name", EnvKind::Text),
    ("PINECONE_ENVIRONMENT", "pinecone", "region", EnvKind::Text),
    ("PINECONE_TOP_K", "retrieval", "top_k", EnvKind::Integer),
    ("PINECONE_SCORE_THRESHOLD", "retrieval", "score_threshold", EnvKind::Float),
    ("OPENAI_API_KEY", "embedding", "api_key", EnvKind::Text),
    ("GROQ_API_KEY", "completion", "api_key", EnvKind::Text),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("DOCQA_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Loads `config.yml` and `secrets.yaml`, then overlays the process environment.
    pub fn load_config(&self) -> Result<Value, RagError> {
        self.load_config_with(|key| env::var(key).ok())
    }

    pub fn load_config_with<F>(&self, lookup: F) -> Result<Value, RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let public_config = load_yaml_file(&self.config_path());
        let secrets_config = load_yaml_file(&self.secrets_path());
        let merged = deep_merge(&public_config, &secrets_config);
        apply_env_overrides(&merged, lookup)
    }

    pub fn redact_sensitive_values(&self, value: &Value) -> Value {
        redact_sensitive_values(value)
    }
}

fn load_yaml_file(path: &Path) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Value>(&contents) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => Value::Object(Map::new()),
            Err(err) => {
                tracing::warn!("Ignoring malformed config file {}: {}", path.display(), err);
                Value::Object(Map::new())
            }
        },
        Err(err) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), err);
            Value::Object(Map::new())
        }
    }
}

fn apply_env_overrides<F>(config: &Value, lookup: F) -> Result<Value, RagError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = Map::new();

    for (var, section, key, kind) in ENV_OVERRIDES {
        let Some(raw) = lookup(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let raw = raw.trim();

        let value = match kind {
            EnvKind::Text => Value::String(raw.to_string()),
            EnvKind::Integer => raw
                .parse::<u64>()
                .map(|v| Value::Number(v.into()))
                .map_err(|_| RagError::config(format!("{var} must be a non-negative integer")))?,
            EnvKind::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| RagError::config(format!("{var} must be a number")))?,
        };

        let section_map = overrides
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = section_map {
            map.insert(key.to_string(), value);
        }
    }

    Ok(deep_merge(config, &Value::Object(overrides)))
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}
