//! Files selected by the user but not yet sent.
//!
//! Each accepted file is uploaded before it becomes pending, so anything a
//! send can reference already has a remote storage path.

use std::fmt;
use std::sync::Arc;

use log::{ error, info, warn };

use crate::gateway::UploadGateway;
use crate::identity::IdentityProvider;
use crate::models::attachment::{ Attachment, LocalFile };

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = [
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/jpg",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType(String),
    TooLarge(u64),
    Duplicate,
    UploadFailed,
}

/// Why one file of a batch was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRejection {
    pub file_name: String,
    pub reason: RejectReason,
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            RejectReason::UnsupportedType(_) => {
                write!(f, "Tipo de arquivo não suportado: {}", self.file_name)
            }
            RejectReason::TooLarge(_) => {
                write!(f, "Arquivo muito grande: {} (máx 10MB)", self.file_name)
            }
            RejectReason::Duplicate => write!(f, "Arquivo já anexado: {}", self.file_name),
            RejectReason::UploadFailed => write!(f, "Falha no upload: {}", self.file_name),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<FileRejection>,
}

impl StageReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub fn validate(file: &LocalFile) -> Result<(), FileRejection> {
    let media_type = file.media_type.to_ascii_lowercase();
    if !ACCEPTED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(FileRejection {
            file_name: file.file_name.clone(),
            reason: RejectReason::UnsupportedType(file.media_type.clone()),
        });
    }
    if file.size > MAX_FILE_SIZE {
        return Err(FileRejection {
            file_name: file.file_name.clone(),
            reason: RejectReason::TooLarge(file.size),
        });
    }
    Ok(())
}

pub struct AttachmentStager {
    uploads: Arc<dyn UploadGateway>,
    identity: Arc<dyn IdentityProvider>,
    pending: Vec<Attachment>,
}

impl AttachmentStager {
    pub fn new(uploads: Arc<dyn UploadGateway>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            uploads,
            identity,
            pending: Vec::new(),
        }
    }

    /// Validates and uploads each file in order. A bad file is reported and skipped.
    pub async fn stage(&mut self, files: Vec<LocalFile>) -> StageReport {
        let mut report = StageReport::default();
        let user_id = self.identity.user_id();

        for file in files {
            if let Err(rejection) = validate(&file) {
                warn!("Rejected {}: {:?}", file.file_name, rejection.reason);
                report.rejected.push(rejection);
                continue;
            }
            if self.contains(&file.file_name) {
                report.rejected.push(FileRejection {
                    file_name: file.file_name.clone(),
                    reason: RejectReason::Duplicate,
                });
                continue;
            }

            match self.uploads.upload(&user_id, &file).await {
                Ok(remote_path) => {
                    info!("Uploaded {} to {}", file.file_name, remote_path);
                    report.accepted.push(file.file_name.clone());
                    self.pending.push(Attachment {
                        file_name: file.file_name.clone(),
                        file,
                        remote_path,
                        upload_progress: 100,
                    });
                }
                Err(e) => {
                    error!("Upload of {} failed: {}", file.file_name, e);
                    report.rejected.push(FileRejection {
                        file_name: file.file_name.clone(),
                        reason: RejectReason::UploadFailed,
                    });
                }
            }
        }
        report
    }

    pub fn remove(&mut self, file_name: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|a| a.file_name != file_name);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.pending.iter().any(|a| a.file_name == file_name)
    }

    pub fn pending(&self) -> &[Attachment] {
        &self.pending
    }

    pub fn remote_paths(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|a| a.remote_path.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
