use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::{debug, info};

/// Multipart field the analyzer reads the uploaded codebase from.
pub const UPLOAD_FIELD: &str = "zipFile";

/// HTTP client for the external analyzer service.
#[derive(Debug, Clone)]
pub struct AnalyzerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalyzerClient {
    /// Analysis of a large codebase can take minutes, so requests carry no
    /// timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload a zipped codebase and parse the analyzer's answer.
    pub async fn upload(&self, archive: &Path) -> Result<AnalysisResult, AnalysisError> {
        check_archive(archive)?;

        let bytes = tokio::fs::read(archive)
            .await
            .map_err(|e| AnalysisError::io(archive, e))?;
        let file_name = archive
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.zip".to_string());

        info!(
            "Uploading {} ({} bytes) to {}",
            archive.display(),
            bytes.len(),
            self.endpoint
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("Analyzer answered {status} with {} bytes", body.len());

        if !status.is_success() {
            return Err(AnalysisError::Http {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        AnalysisResult::from_slice(&body)
    }
}

/// The analyzer only accepts non-empty `.zip` uploads.
fn check_archive(path: &Path) -> Result<(), AnalysisError> {
    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(AnalysisError::InvalidArchive {
            path: path.to_path_buf(),
            reason: "expected a .zip file".to_string(),
        });
    }

    let metadata = std::fs::metadata(path).map_err(|e| AnalysisError::io(path, e))?;
    if metadata.len() == 0 {
        return Err(AnalysisError::InvalidArchive {
            path: path.to_path_buf(),
            reason: "archive is empty".to_string(),
        });
    }
    Ok(())
}
