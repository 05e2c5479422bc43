use std::sync::Arc;

use log::{ error, info, warn };
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::attachments::AttachmentStager;
use crate::conversation::{ Conversation, SendOutcome };
use crate::gateway::Narrator;
use crate::identity::IdentityProvider;
use crate::models::attachment::LocalFile;
use crate::render::terminal::{ render_message, render_pending, render_transcript, ASSISTANT_NAME };

pub const PLAYBACK_ERROR: &str = "Erro ao reproduzir áudio";

const HELP: &str = "Comandos:
  <texto>                 envia uma mensagem
  /anexar <arquivo>...    anexa PDF, PNG ou JPG (até 10MB)
  /remover <nome>         remove um anexo pendente
  /anexos                 lista os anexos pendentes
  /ouvir [n]              ouve a n-ésima resposta (padrão: a última)
  /perfil <nome> <idade>  salva seu perfil
  /quem                   mostra sua identificação
  /sair-perfil            apaga seu perfil
  /historico              mostra a conversa
  /ajuda                  mostra esta ajuda
  /sair                   encerra";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Attach(Vec<String>),
    Remove(String),
    Files,
    Speak(Option<usize>),
    Profile {
        name: String,
        age: u32,
    },
    WhoAmI,
    Logout,
    History,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with('/') {
        return Some(Command::Say(trimmed.to_string()));
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    let command = match name {
        "/anexar" | "/attach" => {
            let paths = split_paths(rest);
            if paths.is_empty() {
                Command::Invalid("Uso: /anexar <arquivo>...".to_string())
            } else {
                Command::Attach(paths)
            }
        }
        "/remover" | "/remove" => {
            if rest.is_empty() {
                Command::Invalid("Uso: /remover <nome>".to_string())
            } else {
                Command::Remove(rest.to_string())
            }
        }
        "/anexos" | "/files" => Command::Files,
        "/ouvir" | "/speak" => {
            if rest.is_empty() {
                Command::Speak(None)
            } else {
                match rest.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Speak(Some(n)),
                    _ => Command::Invalid("Uso: /ouvir [n]".to_string()),
                }
            }
        }
        "/perfil" | "/profile" => parse_profile(rest),
        "/quem" | "/whoami" => Command::WhoAmI,
        "/sair-perfil" | "/logout" => Command::Logout,
        "/historico" | "/history" => Command::History,
        "/ajuda" | "/help" => Command::Help,
        "/sair" | "/quit" => Command::Quit,
        other => Command::Invalid(format!("Comando desconhecido: {} (use /ajuda)", other)),
    };
    Some(command)
}

/// Splits on whitespace; double quotes keep a path with spaces together.
fn split_paths(rest: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in rest.chars() {
        match c {
            '"' => {
                quoted = !quoted;
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }
    paths
}

fn parse_profile(rest: &str) -> Command {
    let usage = || Command::Invalid("Uso: /perfil <nome> <idade>".to_string());
    let Some((name, age)) = rest.rsplit_once(char::is_whitespace) else {
        return usage();
    };
    match age.trim().parse::<u32>() {
        Ok(age) if age > 0 && !name.trim().is_empty() => {
            Command::Profile { name: name.trim().to_string(), age }
        }
        _ => usage(),
    }
}

pub enum Flow {
    Continue(String),
    Quit,
}

pub struct Session {
    conversation: Conversation,
    stager: AttachmentStager,
    narrator: Narrator,
    identity: Arc<dyn IdentityProvider>,
}

impl Session {
    pub fn new(
        conversation: Conversation,
        stager: AttachmentStager,
        narrator: Narrator,
        identity: Arc<dyn IdentityProvider>
    ) -> Self {
        Self { conversation, stager, narrator, identity }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn stager(&self) -> &AttachmentStager {
        &self.stager
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        let output = match command {
            Command::Say(text) => self.say(text).await,
            Command::Attach(paths) => self.attach(paths).await,
            Command::Remove(name) => {
                if self.stager.remove(&name) {
                    format!("Removido: {}", name)
                } else {
                    format!("Nenhum anexo chamado {}", name)
                }
            }
            Command::Files => render_pending(&self.stager),
            Command::Speak(n) => self.speak(n).await,
            Command::Profile { name, age } => {
                match self.identity.set_user_info(&name, age) {
                    Ok(info) => format!("Perfil salvo: {} ({} anos)", info.name, info.age),
                    Err(e) => {
                        error!("Failed to save profile: {}", e);
                        "Não foi possível salvar o perfil".to_string()
                    }
                }
            }
            Command::WhoAmI => {
                match self.identity.user_info() {
                    Some(info) => format!("{} ({} anos), id {}", info.name, info.age, info.user_id),
                    None => format!("Anônimo, id {}", self.identity.user_id()),
                }
            }
            Command::Logout => {
                match self.identity.clear() {
                    Ok(()) => "Perfil apagado".to_string(),
                    Err(e) => {
                        error!("Failed to clear profile: {}", e);
                        "Não foi possível apagar o perfil".to_string()
                    }
                }
            }
            Command::History => render_transcript(self.conversation.messages()),
            Command::Help => HELP.to_string(),
            Command::Quit => {
                return Flow::Quit;
            }
            Command::Invalid(message) => message,
        };
        Flow::Continue(output)
    }

    async fn say(&mut self, text: String) -> String {
        self.conversation.set_input(text);
        match self.conversation.send(&mut self.stager).await {
            SendOutcome::Ignored => "Aguarde a resposta anterior".to_string(),
            SendOutcome::Replied | SendOutcome::Failed => {
                match self.conversation.last_reply() {
                    Some(reply) => render_message(reply),
                    None => String::new(),
                }
            }
        }
    }

    async fn attach(&mut self, paths: Vec<String>) -> String {
        let mut lines = Vec::new();
        let mut files = Vec::new();
        for path in paths {
            match LocalFile::open(&path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!("Cannot open {}: {}", path, e);
                    lines.push(format!("Arquivo não encontrado: {}", path));
                }
            }
        }

        let report = self.stager.stage(files).await;
        if !report.is_clean() {
            info!("{} staged file(s) were skipped", report.rejected.len());
        }
        for name in &report.accepted {
            lines.push(format!("Anexado: {}", name));
        }
        for rejection in &report.rejected {
            lines.push(rejection.to_string());
        }
        lines.push(render_pending(&self.stager));
        lines.join("\n")
    }

    async fn speak(&self, n: Option<usize>) -> String {
        let replies: Vec<_> = self.conversation
            .messages()
            .iter()
            .filter(|m| m.from_assistant)
            .collect();
        let target = match n {
            Some(n) => n.checked_sub(1).and_then(|i| replies.get(i)).copied(),
            None => replies.last().copied(),
        };
        let Some(reply) = target else {
            return format!("Nenhuma resposta do {} para ouvir", ASSISTANT_NAME);
        };
        match self.narrator.read_aloud(&reply.content).await {
            Ok(()) => String::new(),
            Err(_) => PLAYBACK_ERROR.to_string(),
        }
    }

    /// Reads commands line by line until `/sair` or end of input.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
        where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
    {
        writer.write_all(render_transcript(&[]).as_bytes()).await?;
        writer.write_all(b"\n\n").await?;
        writer.flush().await?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let Some(command) = parse_command(&line) else {
                continue;
            };
            match self.handle(command).await {
                Flow::Continue(output) => {
                    if !output.is_empty() {
                        writer.write_all(output.as_bytes()).await?;
                        writer.write_all(b"\n\n").await?;
                        writer.flush().await?;
                    }
                }
                Flow::Quit => {
                    break;
                }
            }
        }
        info!("Session ended after {} message(s)", self.conversation.messages().len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse_command("  olá  "), Some(Command::Say("olá".to_string())));
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn portuguese_and_english_aliases() {
        assert_eq!(
            parse_command("/anexar a.pdf b.png"),
            Some(Command::Attach(vec!["a.pdf".to_string(), "b.png".to_string()]))
        );
        assert_eq!(parse_command("/attach"), Some(Command::Invalid("Uso: /anexar <arquivo>...".to_string())));
        assert_eq!(parse_command("/remove notes.pdf"), Some(Command::Remove("notes.pdf".to_string())));
        assert_eq!(parse_command("/ouvir"), Some(Command::Speak(None)));
        assert_eq!(parse_command("/speak 2"), Some(Command::Speak(Some(2))));
        assert!(matches!(parse_command("/ouvir 0"), Some(Command::Invalid(_))));
        assert_eq!(parse_command("/sair"), Some(Command::Quit));
        assert!(matches!(parse_command("/xyz"), Some(Command::Invalid(_))));
    }

    #[test]
    fn quoted_paths_keep_their_spaces() {
        assert_eq!(
            parse_command(r#"/anexar "meus docs/a b.pdf" c.png"#),
            Some(Command::Attach(vec!["meus docs/a b.pdf".to_string(), "c.png".to_string()]))
        );
        assert_eq!(
            parse_command(r#"/anexar notas"finais 2".pdf"#),
            Some(Command::Attach(vec!["notasfinais 2.pdf".to_string()]))
        );
        assert!(matches!(parse_command(r#"/anexar """#), Some(Command::Invalid(_))));
    }

    #[test]
    fn profile_takes_last_token_as_age() {
        assert_eq!(
            parse_command("/perfil Ana Maria 21"),
            Some(Command::Profile { name: "Ana Maria".to_string(), age: 21 })
        );
        assert!(matches!(parse_command("/perfil Ana"), Some(Command::Invalid(_))));
        assert!(matches!(parse_command("/perfil Ana vinte"), Some(Command::Invalid(_))));
        assert!(matches!(parse_command("/profile"), Some(Command::Invalid(_))));
    }
}
