use std::sync::Arc;

use async_trait::async_trait;
use log::{ error, info };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use tokio::process::Command;

use super::{ endpoint, post_json, GatewayError, SpeechGateway };

pub const DEFAULT_VOICE: &str = "Camila";
pub const DEFAULT_PLAYER: &str = "ffplay -nodisp -autoexit -loglevel quiet";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechReply {
    audio_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpSpeechGateway {
    http: HttpClient,
    base_url: String,
    voice_id: String,
}

impl HttpSpeechGateway {
    pub fn new(base_url: impl Into<String>, voice_id: Option<String>) -> Self {
        Self::with_client(HttpClient::new(), base_url, voice_id)
    }

    pub fn with_client(
        http: HttpClient,
        base_url: impl Into<String>,
        voice_id: Option<String>
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            voice_id: voice_id.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        }
    }
}

#[async_trait]
impl SpeechGateway for HttpSpeechGateway {
    async fn synthesize(&self, text: &str) -> Result<String, GatewayError> {
        let url = endpoint(&self.base_url, "text-to-speech");
        let payload = SpeechRequest { text, voice_id: &self.voice_id };
        let reply: SpeechReply = post_json(&self.http, &url, &payload).await?;
        reply.audio_url.ok_or(GatewayError::MissingField("audioUrl"))
    }
}

/// Plays an audio resource; returns once playback has finished.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio_url: &str) -> Result<(), GatewayError>;
}

/// Hands the URL to an external player program, e.g. `ffplay` or `mpv`.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Parses a whitespace separated command line such as `mpv --no-video`.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self {
            program: "ffplay".to_string(),
            args: ["-nodisp", "-autoexit", "-loglevel", "quiet"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio_url: &str) -> Result<(), GatewayError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(audio_url)
            .status().await
            .map_err(|e| GatewayError::Playback(format!("could not start {}: {}", self.program, e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(GatewayError::Playback(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Reads assistant replies aloud.
#[derive(Clone)]
pub struct Narrator {
    speech: Arc<dyn SpeechGateway>,
    player: Arc<dyn AudioPlayer>,
}

impl Narrator {
    pub fn new(speech: Arc<dyn SpeechGateway>, player: Arc<dyn AudioPlayer>) -> Self {
        Self { speech, player }
    }

    pub async fn read_aloud(&self, text: &str) -> Result<(), GatewayError> {
        let audio_url = self.speech.synthesize(text).await.map_err(|e| {
            error!("Speech synthesis failed: {}", e);
            e
        })?;
        info!("Playing synthesized audio from {}", audio_url);
        self.player.play(&audio_url).await.map_err(|e| {
            error!("Audio playback failed: {}", e);
            e
        })
    }
}
