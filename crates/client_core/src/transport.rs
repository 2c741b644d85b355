use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde_json::Value;
use shared::{domain::AdviceKind, error::TransportError};
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://samadhan-backend.onrender.com";
pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub file: FileAttachment,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartBody),
}

/// Sends one advice request and hands back the decoded JSON body.
#[async_trait]
pub trait AdviceTransport: Send + Sync {
    async fn post(&self, kind: AdviceKind, body: RequestBody) -> Result<Value, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, None)
    }

    /// `timeout` bounds the whole request; `None` keeps reqwest's default.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| TransportError::network(base_url, err))?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint_url(&self, kind: AdviceKind) -> Result<Url, TransportError> {
        let relative = kind.endpoint_path().trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|err| TransportError::InvalidUrl {
                url: format!("{}{relative}", self.base_url),
                reason: err.to_string(),
            })
    }
}

/// Parses `raw` and makes sure it ends in `/` so endpoint joins keep any
/// path prefix the backend is mounted under.
pub fn normalize_base_url(raw: &str) -> Result<Url, TransportError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|err| TransportError::InvalidUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(url)
}

#[async_trait]
impl AdviceTransport for HttpTransport {
    async fn post(&self, kind: AdviceKind, body: RequestBody) -> Result<Value, TransportError> {
        let url = self.endpoint_url(kind)?;
        let endpoint = url.to_string();

        let request = match body {
            RequestBody::Json(payload) => self.http.post(url).json(&payload),
            RequestBody::Multipart(multipart) => {
                let file = multipart.file;
                let part = Part::bytes(file.bytes)
                    .file_name(file.filename)
                    .mime_str(&file.mime_type)
                    .map_err(|err| TransportError::network(endpoint.as_str(), err))?;
                let form = multipart
                    .fields
                    .into_iter()
                    .fold(Form::new().part("file", part), |form, (name, value)| {
                        form.text(name, value)
                    });
                self.http.post(url).multipart(form)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|err| TransportError::network(endpoint.as_str(), err))?;
        let status = response.status();
        debug!(%endpoint, status = status.as_u16(), "advice backend responded");
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::network(endpoint.as_str(), err))?;
        serde_json::from_slice(&bytes).map_err(|err| TransportError::MalformedBody {
            endpoint,
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_join_keeps_path_prefix() {
        let transport = HttpTransport::new("http://127.0.0.1:9000/backend").expect("transport");
        assert_eq!(
            transport
                .endpoint_url(AdviceKind::ProductAdvice)
                .expect("url")
                .as_str(),
            "http://127.0.0.1:9000/backend/api/advice/product-advice"
        );
    }

    #[test]
    fn default_base_url_resolves_every_endpoint() {
        let transport = HttpTransport::new(DEFAULT_BASE_URL).expect("transport");
        assert_eq!(
            transport
                .endpoint_url(AdviceKind::PdfAdvice)
                .expect("url")
                .as_str(),
            "https://samadhan-backend.onrender.com/api/advice/pdf-advice"
        );
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(TransportError::InvalidUrl { .. })
        ));
        assert!(normalize_base_url("not a url").is_err());
    }
}
