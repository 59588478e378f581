use crate::error::{Error, Result};
use crate::metadata::GenericFile;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;

/// Content storage for asset files and metadata documents
pub trait Uploader {
    /// Store raw file bytes, returning the public URI
    fn upload(&self, file: &GenericFile) -> Result<String>;

    /// Store a JSON document, returning the public URI
    fn upload_json(&self, document: &Value) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    uri: String,
}

/// Blocking client for an HTTP upload gateway.
///
/// Files go to `POST {base}/upload` as the raw body, with `Content-Type` and
/// `X-File-Name` headers. Metadata documents go to `POST {base}/upload/json`.
/// Both answer `{"uri": "..."}` with the permanent public URI. Bundler or
/// storage-network payment is the gateway's concern.
pub struct HttpUploader {
    client: Client,
    base_url: String,
}

impl HttpUploader {
    pub fn new(upload_url: impl Into<String>) -> Self {
        HttpUploader {
            client: Client::new(),
            base_url: upload_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn read_uri(response: reqwest::blocking::Response, what: &str) -> Result<String> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(Error::Upload(format!("{} rejected {}: {}", what, status, error_text)));
        }

        let uploaded: UploadResponse = response
            .json()
            .map_err(|e| Error::Upload(format!("Failed to parse upload response: {}", e)))?;

        if uploaded.uri.is_empty() {
            return Err(Error::Upload(format!("{} returned an empty uri", what)));
        }
        Ok(uploaded.uri)
    }
}

impl Uploader for HttpUploader {
    fn upload(&self, file: &GenericFile) -> Result<String> {
        let url = format!("{}/upload", self.base_url);
        debug!("uploading {} ({} bytes)", file.file_name, file.bytes.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .header("X-File-Name", file.file_name.as_str())
            .body(file.bytes.clone())
            .send()
            .map_err(|e| Error::Upload(format!("Failed to upload {}: {}", file.file_name, e)))?;

        Self::read_uri(response, &file.file_name)
    }

    fn upload_json(&self, document: &Value) -> Result<String> {
        let url = format!("{}/upload/json", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(document)
            .send()
            .map_err(|e| Error::Upload(format!("Failed to upload metadata: {}", e)))?;

        Self::read_uri(response, "metadata document")
    }
}
