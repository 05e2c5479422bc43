use async_trait::async_trait;
use log::info;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ endpoint, post_json, GatewayError, UploadGateway, UploadTicket };
use crate::models::attachment::LocalFile;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlRequest<'a> {
    user_id: &'a str,
    file_name: &'a str,
    file_type: &'a str,
    file_size: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlReply {
    upload_url: Option<String>,
    s3_path: Option<String>,
}

/// Pre-signed URL issuer plus the direct PUT to storage.
#[derive(Debug, Clone)]
pub struct HttpUploadGateway {
    http: HttpClient,
    base_url: String,
}

impl HttpUploadGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), base_url)
    }

    pub fn with_client(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }
}

#[async_trait]
impl UploadGateway for HttpUploadGateway {
    async fn request_upload(
        &self,
        user_id: &str,
        file: &LocalFile
    ) -> Result<UploadTicket, GatewayError> {
        let url = endpoint(&self.base_url, "upload-url");
        let payload = UploadUrlRequest {
            user_id,
            file_name: &file.file_name,
            file_type: &file.media_type,
            file_size: file.size,
        };
        let reply: UploadUrlReply = post_json(&self.http, &url, &payload).await?;
        Ok(UploadTicket {
            upload_url: reply.upload_url.ok_or(GatewayError::MissingField("uploadUrl"))?,
            remote_path: reply.s3_path.ok_or(GatewayError::MissingField("s3Path"))?,
        })
    }

    async fn transfer(&self, upload_url: &str, file: &LocalFile) -> Result<(), GatewayError> {
        let bytes = file.read_bytes().await?;
        info!("Uploading {} ({} bytes)", file.file_name, bytes.len());
        let resp = self.http
            .put(upload_url)
            .header(CONTENT_TYPE, file.media_type.as_str())
            .body(bytes)
            .send().await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}
