use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Files probed, in order, when `CONFIG_PATH` is not set
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["conf.yaml", "conf.json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub llm_config: LlmConfig,
    #[serde(default)]
    pub fetch_config: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request body limit for image uploads, which arrive base64 encoded
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Settings for the generation service shared by all agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider() -> String {
    "openai_llm".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: default_model(),
            llm_api_key: None,
            organization_id: None,
            project_id: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// The API key, if one is really configured.
    ///
    /// Blank values and `${VAR}` placeholders left unresolved by a missing
    /// environment variable count as absent.
    pub fn credential(&self) -> Option<String> {
        self.llm_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !PLACEHOLDER.is_match(key))
            .map(str::to_string)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Settings for the page fetcher used by the site audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bytes of page body read before the rest is ignored
    #[serde(default = "default_max_page_bytes")]
    pub max_page_bytes: usize,
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_excerpt_chars() -> usize {
    2000
}

fn default_max_page_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            excerpt_chars: default_excerpt_chars(),
            user_agent: default_user_agent(),
            max_page_bytes: default_max_page_bytes(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{(\w+)\}").unwrap());

/// Replace `${VAR_NAME}` with the value from `lookup`, leaving unknown variables untouched
pub fn substitute_env_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Read a text file as UTF-8, dropping a byte-order mark if present
fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let (content, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        anyhow::bail!("Configuration file is not valid UTF-8: {}", path.display());
    }
    Ok(content.into_owned())
}

impl Config {
    /// Load a YAML or JSON configuration file, substituting environment variables
    pub fn load(path: &str) -> Result<Self> {
        let path_ref = Path::new(path);
        if !path_ref.exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = read_text_file(path_ref)?;
        let content = substitute_env_vars(&content, |name| std::env::var(name).ok());

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") || path_lower.ends_with(".jsonld") {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON configuration: {}", path))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML configuration: {}", path))?
        };
        Ok(config)
    }

    /// Locate and load the configuration, falling back to defaults when no file exists.
    ///
    /// An explicit `CONFIG_PATH` must load successfully.
    pub fn discover() -> Result<Self> {
        let mut config = if let Ok(path) = std::env::var("CONFIG_PATH") {
            let config = Config::load(&path)?;
            info!("Loaded configuration from: {}", path);
            config
        } else {
            let mut found = None;
            for path in DEFAULT_CONFIG_PATHS {
                if !Path::new(path).exists() {
                    debug!("No configuration at {}", path);
                    continue;
                }
                found = Some(Config::load(path)?);
                info!("Loaded configuration from: {}", path);
                break;
            }
            found.unwrap_or_else(|| {
                info!("No configuration file found, using defaults");
                Config::default()
            })
        };

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `PORT` and, when the file configured no key, `OPENAI_API_KEY`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.system_config.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        }

        if self.llm_config.credential().is_none() {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.llm_config.llm_api_key = Some(key);
            }
        }

        Ok(())
    }
}
