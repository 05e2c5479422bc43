use chrono::Local;

use super::markdown::{ parse, Block, Document };
use crate::attachments::AttachmentStager;
use crate::models::chat::{ Delivery, Message };

pub const ASSISTANT_NAME: &str = "Copiloto Acadêmico";
pub const USER_NAME: &str = "Você";
pub const WELCOME: &str =
    "Bem-vindo ao Copiloto Acadêmico\nFaça perguntas, anexe documentos ou peça ajuda com seus estudos.\nEstou aqui para apoiar seu aprendizado!";

pub fn render_document(doc: &Document) -> String {
    let mut out = Vec::with_capacity(doc.blocks.len());
    for block in &doc.blocks {
        let line = match block {
            Block::Heading { level: 1, text } => text.to_uppercase(),
            Block::Heading { level: 2, text } => format!("== {} ==", text),
            Block::Heading { text, .. } => format!("-- {} --", text),
            Block::ListItem(text) => format!("  • {}", text),
            Block::Blank => String::new(),
            Block::Paragraph(text) => text.clone(),
        };
        out.push(line);
    }
    out.join("\n")
}

pub fn render_message(message: &Message) -> String {
    let mut out = String::new();
    let author = if message.from_assistant { ASSISTANT_NAME } else { USER_NAME };
    out.push_str(&format!("[{}] {}", message.segment_index, author));
    match message.delivery {
        Delivery::Pending => out.push_str(" (enviando...)"),
        Delivery::Failed => out.push_str(" (não entregue)"),
        Delivery::Delivered => {}
    }
    out.push('\n');

    if message.from_assistant {
        out.push_str(&render_document(&parse(&message.content)));
    } else {
        out.push_str(&message.content);
    }
    out.push('\n');

    if !message.attachment_paths.is_empty() {
        let docs: Vec<String> = (1..=message.attachment_paths.len())
            .map(|i| format!("Documento {}", i))
            .collect();
        out.push_str(&format!("Documentos anexados: {}\n", docs.join(", ")));
    }
    out.push_str(&message.timestamp.with_timezone(&Local).format("%H:%M").to_string());
    out
}

pub fn render_transcript(messages: &[Message]) -> String {
    if messages.is_empty() {
        return WELCOME.to_string();
    }
    messages.iter().map(render_message).collect::<Vec<_>>().join("\n\n")
}

pub fn attachment_count(count: usize) -> String {
    if count == 1 {
        "1 arquivo anexado".to_string()
    } else {
        format!("{} arquivos anexados", count)
    }
}

pub fn render_pending(stager: &AttachmentStager) -> String {
    if stager.is_empty() {
        return "Nenhum arquivo anexado".to_string();
    }
    let mut out = attachment_count(stager.len());
    for attachment in stager.pending() {
        out.push_str(&format!("\n  - {}", attachment));
    }
    out
}
