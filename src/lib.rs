pub mod attachments;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod identity;
pub mod models;
pub mod render;
pub mod session;

use attachments::AttachmentStager;
use cli::Args;
use config::prompt::resolve_system_prompt;
use config::Endpoints;
use conversation::Conversation;
use gateway::{ CommandPlayer, HttpChatGateway, HttpSpeechGateway, HttpUploadGateway, Narrator };
use identity::create_identity_store;
use log::info;
use session::Session;
use std::error::Error;
use std::sync::Arc;
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let endpoints = Endpoints::from_args(&args)?;
    let system_prompt = resolve_system_prompt(
        args.system_prompt.as_deref(),
        args.system_prompt_path.as_deref()
    )?;
    let player = CommandPlayer::from_command_line(&args.audio_player).ok_or_else(||
        "AUDIO_PLAYER must name a program".to_string()
    )?;

    info!("--- Core Configuration ---");
    info!("Chat Endpoint: {}", endpoints.chat);
    info!("Upload Endpoint: {}", endpoints.upload);
    info!("Text-to-Speech Endpoint: {}", endpoints.tts);
    info!("Voice: {}", args.voice_id);
    info!("Audio Player: {}", player.program());
    info!("Identity Store: {} ({})", args.identity_type, args.identity_path);
    info!("System Prompt: {} chars", system_prompt.chars().count());
    info!("-------------------------");

    let identity = create_identity_store(&args)?;
    let http = reqwest::Client::new();
    let chat = Arc::new(HttpChatGateway::with_client(http.clone(), endpoints.chat));
    let uploads = Arc::new(HttpUploadGateway::with_client(http.clone(), endpoints.upload));
    let speech = Arc::new(
        HttpSpeechGateway::with_client(http, endpoints.tts, Some(args.voice_id.clone()))
    );

    let conversation = Conversation::new(chat, identity.clone(), system_prompt);
    let stager = AttachmentStager::new(uploads, identity.clone());
    let narrator = Narrator::new(speech, Arc::new(player));
    let mut session = Session::new(conversation, stager, narrator, identity);

    session.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    Ok(())
}
