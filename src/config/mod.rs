pub mod prompt;

use thiserror::Error;
use url::Url;

use crate::cli::Args;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} endpoint '{value}': {reason}")]
    InvalidEndpoint {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read system prompt file '{path}': {source}")]
    PromptFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("system prompt file '{0}' is empty")]
    EmptyPrompt(String),
}

/// Base URLs of the three backend capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub chat: String,
    pub upload: String,
    pub tts: String,
}

impl Endpoints {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Ok(Self {
            chat: validate_base_url("chat", &args.chat_api_endpoint)?,
            upload: validate_base_url("upload", &args.upload_api_endpoint)?,
            tts: validate_base_url("text-to-speech", &args.tts_api_endpoint)?,
        })
    }
}

pub fn validate_base_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        name,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(invalid(format!("unsupported scheme '{}'", other)));
        }
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert_eq!(
            validate_base_url("chat", " https://api.example.com/prod/ ").unwrap(),
            "https://api.example.com/prod"
        );
        assert!(validate_base_url("chat", "http://localhost:3000").is_ok());
    }

    #[test]
    fn rejects_garbage_and_other_schemes() {
        assert!(matches!(
            validate_base_url("chat", "not a url"),
            Err(ConfigError::InvalidEndpoint { name: "chat", .. })
        ));
        assert!(validate_base_url("upload", "ftp://files.example.com").is_err());
        assert!(validate_base_url("upload", "").is_err());
    }
}
