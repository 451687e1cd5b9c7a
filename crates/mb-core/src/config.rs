//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数 (`.env` は起動時に dotenvy で読み込み済み)
//! 2. mailbot.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。
//! 資格情報は存在チェックのみ行い、欠けていても読み込み自体は失敗しません。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "mailbot.toml";

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude API
    Claude,
    /// OpenAI-compatible API
    #[default]
    OpenAi,
}

impl LlmProvider {
    /// Parse a provider name, falling back to OpenAI for unknown values
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "claude" | "anthropic" => LlmProvider::Claude,
            _ => LlmProvider::OpenAi,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (empty when not configured)
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::OpenAi,
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

/// Sender account and SMTP endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Sender address (EMAIL_ADDRESS)
    pub address: Option<String>,

    /// Sender app password (EMAIL_PASSWORD)
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// SMTP host, implicit TLS
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            address: None,
            password: None,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

/// Web front-end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Bind host
    #[serde(default = "default_web_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_web_port")]
    pub port: u16,

    /// Minutes a session may sit idle before it is dropped
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            session_idle_minutes: default_session_idle_minutes(),
        }
    }
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    8501
}

fn default_session_idle_minutes() -> u64 {
    60
}

/// Main configuration for mailbot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Mail sender configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Web front-end configuration
    #[serde(default)]
    pub web: WebConfig,
}

/// Presence of a single credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    /// Environment variable name shown to the user
    pub name: &'static str,
    /// Whether a non-empty value is configured
    pub present: bool,
    /// Displayable value (only for non-secret settings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Startup presence check of all credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    pub model_key: CredentialStatus,
    pub email_address: CredentialStatus,
    pub email_password: CredentialStatus,
}

impl ConfigStatus {
    /// Chatting requires the model credential
    pub fn can_chat(&self) -> bool {
        self.model_key.present
    }

    /// Non-blocking warnings for missing mail credentials
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.email_address.present {
            warnings.push("EMAIL_ADDRESS not set - email sending will not work".to_string());
        }
        if !self.email_password.present {
            warnings.push("EMAIL_PASSWORD not set - email sending will not work".to_string());
        }
        warnings
    }
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後、環境変数による上書きが適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// TOML 文字列を解析する (環境変数の上書きは行わない)
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let toml: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        Ok(Self::from_toml_config(toml))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./mailbot.toml` があればそれを使い、なければ環境変数のみ。
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Ok(Self::from_env())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();
        let email = toml.email.unwrap_or_default();
        let web = toml.web.unwrap_or_default();

        Config {
            llm: LlmConfig {
                api_key: llm
                    .api_key
                    .filter(|k| !k.trim().is_empty())
                    .unwrap_or_default(),
                model: llm.model.unwrap_or_else(default_model),
                provider: llm
                    .provider
                    .map(|p| LlmProvider::from_name(&p))
                    .unwrap_or_default(),
                base_url: llm.base_url.filter(|u| !u.trim().is_empty()),
            },
            email: EmailConfig {
                address: email.address.filter(|a| !a.trim().is_empty()),
                password: email.password.filter(|p| !p.trim().is_empty()),
                smtp_host: email.smtp_host.unwrap_or_else(default_smtp_host),
                smtp_port: email.smtp_port.unwrap_or_else(default_smtp_port),
            },
            web: WebConfig {
                host: web.host.unwrap_or_else(default_web_host),
                port: web.port.unwrap_or_else(default_web_port),
                session_idle_minutes: web
                    .session_idle_minutes
                    .unwrap_or_else(default_session_idle_minutes),
            },
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source; empty values are ignored
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // LLM 設定の上書き
        if let Some(key) = get("LLM_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .or_else(|| get("CLAUDE_API_KEY"))
        {
            self.llm.api_key = key;
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = get("LLM_PROVIDER") {
            self.llm.provider = LlmProvider::from_name(&provider);
        }
        if let Some(base_url) = get("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        // メール設定の上書き
        if let Some(address) = get("EMAIL_ADDRESS") {
            self.email.address = Some(address);
        }
        if let Some(password) = get("EMAIL_PASSWORD") {
            self.email.password = Some(password);
        }
        if let Some(host) = get("SMTP_HOST") {
            self.email.smtp_host = host;
        }
        if let Some(port) = get("SMTP_PORT").and_then(|p| p.parse().ok()) {
            self.email.smtp_port = port;
        }

        // Web 設定の上書き
        if let Some(host) = get("WEB_HOST") {
            self.web.host = host;
        }
        if let Some(port) = get("WEB_PORT").and_then(|p| p.parse().ok()) {
            self.web.port = port;
        }
        if let Some(minutes) = get("SESSION_IDLE_MINUTES").and_then(|m| m.parse().ok()) {
            self.web.session_idle_minutes = minutes;
        }
    }

    /// Get the effective LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }

    /// Presence check of the three credentials
    pub fn status(&self) -> ConfigStatus {
        ConfigStatus {
            model_key: CredentialStatus {
                name: "OPENAI_API_KEY",
                present: !self.llm.api_key.is_empty(),
                detail: None,
            },
            email_address: CredentialStatus {
                name: "EMAIL_ADDRESS",
                present: self.email.address.is_some(),
                detail: self.email.address.clone(),
            },
            email_password: CredentialStatus {
                name: "EMAIL_PASSWORD",
                present: self.email.password.is_some(),
                detail: None,
            },
        }
    }
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    llm: Option<TomlLlmConfig>,
    email: Option<TomlEmailConfig>,
    web: Option<TomlWebConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlmConfig {
    /// "openai" または "claude"
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlEmailConfig {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    smtp_host: Option<String>,
    #[serde(default)]
    smtp_port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlWebConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    session_idle_minutes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model, "gpt-4");
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 465);
        assert_eq!(config.web.port, 8501);
    }

    #[test]
    fn test_provider_from_name() {
        assert_eq!(LlmProvider::from_name("Claude"), LlmProvider::Claude);
        assert_eq!(LlmProvider::from_name("openai"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::from_name("something"), LlmProvider::OpenAi);
    }

    #[test]
    fn test_expand_env_vars() {
        // テスト用環境変数を設定
        unsafe {
            std::env::set_var("MAILBOT_TEST_EXPAND_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${MAILBOT_TEST_EXPAND_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${MAILBOT_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("MAILBOT_TEST_EXPAND_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("cost: $5"), "cost: $5");
    }

    #[test]
    fn test_overrides_from_vars() {
        let env = vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_MODEL", "gpt-4o"),
            ("EMAIL_ADDRESS", "me@example.com"),
            ("EMAIL_PASSWORD", "app-pass"),
            ("WEB_PORT", "9000"),
            ("SESSION_IDLE_MINUTES", "15"),
        ]);

        let mut config = Config::default();
        config.apply_overrides_from(|k| env.get(k).cloned());

        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.email.address.as_deref(), Some("me@example.com"));
        assert_eq!(config.email.password.as_deref(), Some("app-pass"));
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.session_idle_minutes, 15);
    }

    #[test]
    fn test_empty_values_are_missing() {
        let env = vars(&[("EMAIL_ADDRESS", ""), ("OPENAI_API_KEY", "  ")]);

        let mut config = Config::default();
        config.apply_overrides_from(|k| env.get(k).cloned());

        let status = config.status();
        assert!(!status.model_key.present);
        assert!(!status.email_address.present);
    }

    #[test]
    fn test_llm_api_key_takes_precedence() {
        let env = vars(&[("LLM_API_KEY", "generic"), ("OPENAI_API_KEY", "openai")]);

        let mut config = Config::default();
        config.apply_overrides_from(|k| env.get(k).cloned());

        assert_eq!(config.llm.api_key, "generic");
    }

    #[test]
    fn test_status() {
        let mut config = Config::default();
        let status = config.status();
        assert!(!status.can_chat());
        assert_eq!(status.warnings().len(), 2);

        config.llm.api_key = "sk-test".to_string();
        config.email.address = Some("me@example.com".to_string());
        config.email.password = Some("secret".to_string());

        let status = config.status();
        assert!(status.can_chat());
        assert!(status.warnings().is_empty());
        assert_eq!(status.email_address.detail.as_deref(), Some("me@example.com"));
        assert!(status.email_password.detail.is_none());
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[llm]
provider = "claude"
model = "claude-sonnet-4-20250514"
api_key = "test_key"

[email]
address = "bot@example.com"
password = "app-password"
smtp_port = 2465

[web]
host = "0.0.0.0"
port = 8080
"#;

        let config = Config::from_toml_str(toml_content).unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Claude);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.llm.api_key, "test_key");
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.email.address.as_deref(), Some("bot@example.com"));
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 2465);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn test_blank_toml_credentials_are_missing() {
        let toml_content = r#"
[llm]
api_key = "   "

[email]
address = "bot@example.com"
password = "  "

[web]
session_idle_minutes = 5
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert!(config.llm.api_key.is_empty());
        assert!(config.email.password.is_none());
        assert_eq!(config.web.session_idle_minutes, 5);

        let status = config.status();
        assert!(!status.model_key.present);
        assert!(status.email_address.present);
        assert!(!status.email_password.present);
    }

    #[test]
    fn test_toml_config_invalid() {
        let result = Config::from_toml_str("[llm\nmodel = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_serialized_config_hides_secrets() {
        let mut config = Config::default();
        config.llm.api_key = "sk-secret".to_string();
        config.email.password = Some("hunter2".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[email]\nsmtp_host = \"smtp.example.com\"\n").unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.email.smtp_host, "smtp.example.com");

        let missing = Config::from_toml_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
