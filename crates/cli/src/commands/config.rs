use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use xsell_core::config::{AppConfig, LoadOptions};

use super::{load_config, CommandResult};

struct Sources<'a> {
    options: &'a LoadOptions,
    file_path: Option<PathBuf>,
    file_doc: Option<Value>,
}

/// Effective configuration with the source of every value; secrets are never
/// printed.
pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("config", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let file_path = detect_config_path(options);
    let file_doc = load_config_file_doc(file_path.as_deref());
    let sources = Sources { options, file_path, file_doc };

    CommandResult::rendered(render(&config, &sources).join("\n"))
}

fn render(config: &AppConfig, sources: &Sources<'_>) -> Vec<String> {
    let overrides = &sources.options.overrides;
    let timeout = config
        .backend
        .request_timeout_secs
        .map(|secs| format!("{secs}s"))
        .unwrap_or_else(|| "<none>".to_string());
    let api_token = if config.backend.api_token.is_some() { "<redacted>" } else { "<unset>" };

    vec![
        "effective config (source precedence: flag > env > file > default):".to_string(),
        render_line(
            "backend.base_url",
            &config.backend.base_url,
            sources.field(
                "backend.base_url",
                &["XSELL_BACKEND_BASE_URL"],
                overrides.backend_base_url.is_some(),
            ),
        ),
        render_line(
            "backend.api_token",
            api_token,
            sources.field(
                "backend.api_token",
                &["XSELL_BACKEND_API_TOKEN"],
                overrides.backend_api_token.is_some(),
            ),
        ),
        render_line(
            "backend.request_timeout_secs",
            &timeout,
            sources.field(
                "backend.request_timeout_secs",
                &["XSELL_BACKEND_REQUEST_TIMEOUT_SECS"],
                overrides.request_timeout_secs.is_some(),
            ),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            sources.field(
                "logging.level",
                &["XSELL_LOGGING_LEVEL", "XSELL_LOG_LEVEL"],
                overrides.log_level.is_some(),
            ),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format).to_lowercase(),
            sources.field(
                "logging.format",
                &["XSELL_LOGGING_FORMAT", "XSELL_LOG_FORMAT"],
                overrides.log_format.is_some(),
            ),
        ),
    ]
}

impl Sources<'_> {
    fn field(&self, key_path: &str, env_keys: &[&str], from_flag: bool) -> String {
        if from_flag {
            return "flag".to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn detect_config_path(options: &LoadOptions) -> Option<PathBuf> {
    if let Some(path) = &options.config_path {
        return path.exists().then(|| path.clone());
    }

    [PathBuf::from("xsell.toml"), PathBuf::from("config/xsell.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
