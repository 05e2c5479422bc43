use std::fs;
use std::path::Path;

use log::info;

use super::ConfigError;

/// Instructions sent as `context` with every chat request.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("system_prompt.md");

pub fn load_prompt_file(path: &str) -> Result<String, ConfigError> {
    let content = fs
        ::read_to_string(Path::new(path))
        .map_err(|e| ConfigError::PromptFile { path: path.to_string(), source: e })?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyPrompt(path.to_string()));
    }
    Ok(trimmed.to_string())
}

/// A prompt file wins over inline text, which wins over the built-in prompt.
pub fn resolve_system_prompt(
    inline: Option<&str>,
    path: Option<&str>
) -> Result<String, ConfigError> {
    if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
        info!("Loading system prompt from {}", path);
        return load_prompt_file(path);
    }
    match inline.map(str::trim).filter(|p| !p.is_empty()) {
        Some(text) => Ok(text.to_string()),
        None => Ok(DEFAULT_SYSTEM_PROMPT.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_prompt_is_the_default() {
        let prompt = resolve_system_prompt(None, None).unwrap();
        assert!(prompt.starts_with("Você é o \"Copiloto Acadêmico\""));
        assert_eq!(resolve_system_prompt(Some("   "), Some("")).unwrap(), prompt);
    }

    #[test]
    fn inline_override_is_used() {
        assert_eq!(resolve_system_prompt(Some(" Be brief. "), None).unwrap(), "Be brief.");
    }

    #[test]
    fn file_override_beats_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "From file\n").unwrap();
        let path = path.to_str().unwrap();
        assert_eq!(resolve_system_prompt(Some("inline"), Some(path)).unwrap(), "From file");
    }

    #[test]
    fn empty_or_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "  \n").unwrap();
        assert!(matches!(
            load_prompt_file(path.to_str().unwrap()),
            Err(ConfigError::EmptyPrompt(_))
        ));
        assert!(matches!(
            load_prompt_file(dir.path().join("missing.txt").to_str().unwrap()),
            Err(ConfigError::PromptFile { .. })
        ));
    }
}
