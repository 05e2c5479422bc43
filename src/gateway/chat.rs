use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::{ endpoint, post_json, ChatGateway, ChatRequest, GatewayError };

#[derive(Deserialize)]
struct ChatReply {
    llm_response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    http: HttpClient,
    base_url: String,
}

impl HttpChatGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), base_url)
    }

    pub fn with_client(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        let url = endpoint(&self.base_url, "chat-process");
        info!(
            "Sending segment {} with {} attachment(s) to {}",
            request.segment_index,
            request.s3_paths.len(),
            url
        );
        let reply: ChatReply = post_json(&self.http, &url, request).await?;
        reply.llm_response.ok_or(GatewayError::MissingField("llm_response"))
    }
}
