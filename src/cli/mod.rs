use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Endpoints ---
    /// Base URL of the chat processing API (serves /chat-process)
    #[arg(long, env = "CHAT_API_ENDPOINT")]
    pub chat_api_endpoint: String,

    /// Base URL of the upload authorization API (serves /upload-url)
    #[arg(long, env = "S3_UPLOAD_API_ENDPOINT")]
    pub upload_api_endpoint: String,

    /// Base URL of the text-to-speech API (serves /text-to-speech)
    #[arg(long, env = "TTS_API_ENDPOINT")]
    pub tts_api_endpoint: String,

    // --- Assistant Args ---
    /// System instructions sent with every chat request. Defaults to the built-in academic prompt.
    #[arg(long, env = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// File holding the system instructions. Takes precedence over --system-prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    // --- Speech Args ---
    /// Voice used by the text-to-speech backend
    #[arg(long, env = "TTS_VOICE_ID", default_value = "Camila")]
    pub voice_id: String,

    /// Command used to play synthesized audio; the audio URL is appended as last argument
    #[arg(long, env = "AUDIO_PLAYER", default_value = "ffplay -nodisp -autoexit -loglevel quiet")]
    pub audio_player: String,

    // --- Identity Args ---
    /// Where the user identity is kept (file, memory)
    #[arg(long, env = "IDENTITY_TYPE", default_value = "file")]
    pub identity_type: String,

    /// JSON file backing the file identity store
    #[arg(long, env = "IDENTITY_PATH", default_value = ".copiloto/storage.json")]
    pub identity_path: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
