pub mod chat;
pub mod speech;
pub mod upload;

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{ Deserialize, Serialize };
use thiserror::Error;

use crate::models::attachment::LocalFile;
use crate::models::user::UserInfo;

pub use self::chat::HttpChatGateway;
pub use self::speech::{ AudioPlayer, CommandPlayer, HttpSpeechGateway, Narrator };
pub use self::upload::HttpUploadGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("backend reported failure: {0}")]
    Rejected(String),
    #[error("response is missing field '{0}'")]
    MissingField(&'static str),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Body of a chat request, exactly as the backend reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub context: String,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
    pub s3_paths: Vec<String>,
    pub segment_index: u32,
}

/// Target returned by the upload authorization step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub upload_url: String,
    pub remote_path: String,
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait UploadGateway: Send + Sync {
    async fn request_upload(
        &self,
        user_id: &str,
        file: &LocalFile
    ) -> Result<UploadTicket, GatewayError>;

    async fn transfer(&self, upload_url: &str, file: &LocalFile) -> Result<(), GatewayError>;

    /// Authorizes then transfers; returns the remote storage path.
    async fn upload(&self, user_id: &str, file: &LocalFile) -> Result<String, GatewayError> {
        let ticket = self.request_upload(user_id, file).await?;
        self.transfer(&ticket.upload_url, file).await?;
        Ok(ticket.remote_path)
    }
}

#[async_trait]
pub trait SpeechGateway: Send + Sync {
    /// Returns the URL of the synthesized audio.
    async fn synthesize(&self, text: &str) -> Result<String, GatewayError>;
}

/// Envelope shared by every backend response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> Result<T, GatewayError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(GatewayError::Rejected(self.error.unwrap_or_else(|| "unknown error".to_string())))
        }
    }
}

pub(crate) fn endpoint(base_url: &str, route: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), route.trim_start_matches('/'))
}

/// One POST, no retry. Non-2xx and `success: false` are both failures.
pub(crate) async fn post_json<Req, Resp>(
    http: &HttpClient,
    url: &str,
    payload: &Req
) -> Result<Resp, GatewayError>
    where Req: Serialize + ?Sized, Resp: DeserializeOwned
{
    debug!("POST {}", url);
    let resp = http.post(url).json(payload).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(GatewayError::Status(status.as_u16()));
    }
    let body = resp.json::<ApiResponse<Resp>>().await?;
    body.into_data()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: Option<String>,
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("https://api.example.com/", "/chat-process"), "https://api.example.com/chat-process");
        assert_eq!(endpoint("https://api.example.com/prod", "upload-url"), "https://api.example.com/prod/upload-url");
    }

    #[test]
    fn failure_envelope_carries_backend_error() {
        let body: ApiResponse<Payload> = serde_json
            ::from_str(r#"{"success": false, "error": "quota exceeded"}"#)
            .unwrap();
        match body.into_data() {
            Err(GatewayError::Rejected(msg)) => assert_eq!(msg, "quota exceeded"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn success_envelope_yields_data() {
        let body: ApiResponse<Payload> = serde_json
            ::from_str(r#"{"success": true, "value": "ok"}"#)
            .unwrap();
        assert_eq!(body.into_data().unwrap().value.as_deref(), Some("ok"));
    }

    #[test]
    fn chat_request_uses_wire_names() {
        let request = ChatRequest {
            query: "oi".to_string(),
            context: "ctx".to_string(),
            user_info: UserInfo::anonymous("u-1"),
            s3_paths: vec!["s3://bucket/a.pdf".to_string()],
            segment_index: 3,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userInfo"]["userId"], "u-1");
        assert_eq!(json["s3_paths"][0], "s3://bucket/a.pdf");
        assert_eq!(json["segment_index"], 3);
    }
}
