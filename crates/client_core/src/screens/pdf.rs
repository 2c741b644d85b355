use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use shared::{
    domain::AdviceKind,
    error::{ErrorDetail, FileTypeError},
    protocol::{ChatEntry, PdfAdviceResponse},
};
use tracing::{debug, info, warn};

use crate::{
    submission::{SubmissionPipeline, SubmitOutcome},
    transcript::Transcript,
    transport::{AdviceTransport, FileAttachment, MultipartBody, RequestBody, PDF_MIME_TYPE},
};

pub const PDF_GREETING: &str = "I've received your PDF. What would you like to know about it?";
pub const PDF_FALLBACK_REPLY: &str = "Here's what I found in your document...";
pub const PDF_ERROR_REPLY: &str =
    "I encountered an error analyzing your document. Please try again.";
pub const DEFAULT_FILE_BANNER_TTL: Duration = Duration::from_secs(3);

/// Dismissable notice shown after a rejected attachment.
#[derive(Debug, Clone)]
pub struct FileTypeBanner {
    error: FileTypeError,
    raised_at: Instant,
    ttl: Duration,
}

impl FileTypeBanner {
    pub fn error(&self) -> &FileTypeError {
        &self.error
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < self.ttl
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// The assistant reply now at the end of the transcript.
    Replied(ChatEntry),
    /// The request failed; an apology was appended in place of a reply.
    Failed(ErrorDetail),
    /// Blank input; nothing happened.
    Ignored,
    /// A question is still waiting for its answer.
    Busy,
    NoDocument,
    /// The conversation was reset while the request was pending.
    Superseded,
}

/// Document chat: attach one PDF, then ask questions about it.
pub struct PdfAdvisorScreen {
    pipeline: Arc<SubmissionPipeline<PdfAdviceResponse>>,
    document: Option<FileAttachment>,
    banner: Option<FileTypeBanner>,
    banner_ttl: Duration,
    transcript: Transcript,
    input: String,
}

impl PdfAdvisorScreen {
    pub fn new(transport: Arc<dyn AdviceTransport>) -> Self {
        Self {
            pipeline: Arc::new(SubmissionPipeline::new(AdviceKind::PdfAdvice, transport)),
            document: None,
            banner: None,
            banner_ttl: DEFAULT_FILE_BANNER_TTL,
            transcript: Transcript::new(),
            input: String::new(),
        }
    }

    pub fn with_banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner_ttl = ttl;
        self
    }

    pub fn pipeline(&self) -> Arc<SubmissionPipeline<PdfAdviceResponse>> {
        Arc::clone(&self.pipeline)
    }

    pub fn document(&self) -> Option<&FileAttachment> {
        self.document.as_ref()
    }

    /// Size of the attached document as shown in the chat header.
    pub fn document_size_label(&self) -> Option<String> {
        self.document
            .as_ref()
            .map(|doc| format!("{:.2} MB", doc.size_bytes() as f64 / 1024.0 / 1024.0))
    }

    pub fn is_chat_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn banner_at(&self, now: Instant) -> Option<&FileTypeBanner> {
        self.banner.as_ref().filter(|banner| banner.is_visible_at(now))
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Accepts a PDF and opens the chat with a greeting. Anything else raises
    /// the file-type banner and leaves the current document untouched.
    pub fn attach(&mut self, file: FileAttachment) -> Result<(), FileTypeError> {
        if !file.mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE) {
            let error = FileTypeError {
                filename: file.filename,
                expected: PDF_MIME_TYPE,
                found: file.mime_type,
            };
            warn!(error = %error, "rejected attachment");
            self.banner = Some(FileTypeBanner {
                error: error.clone(),
                raised_at: Instant::now(),
                ttl: self.banner_ttl,
            });
            return Err(error);
        }

        info!(
            filename = %file.filename,
            size_bytes = file.size_bytes(),
            "document attached"
        );
        self.banner = None;
        self.document = Some(file);
        self.transcript.clear();
        self.transcript.push_assistant(PDF_GREETING);
        Ok(())
    }

    /// Reads `path` and attaches it, guessing the MIME type from the extension.
    pub async fn attach_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read document '{}'", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        self.attach(FileAttachment {
            filename,
            mime_type,
            bytes,
        })?;
        Ok(())
    }

    /// Sends the pending input as a question about the attached document.
    ///
    /// The question lands in the transcript before the request goes out; the
    /// answer (or an apology) is appended once the response is in. Blank input
    /// is ignored, otherwise the text is sent and shown exactly as typed.
    /// If another request holds the pipeline, the question is taken back out
    /// of the transcript and left in the input.
    pub async fn send(&mut self) -> ChatOutcome {
        if self.input.trim().is_empty() {
            return ChatOutcome::Ignored;
        }
        let Some(document) = self.document.clone() else {
            return ChatOutcome::NoDocument;
        };

        let question = std::mem::take(&mut self.input);
        self.transcript.push_user(question.clone());

        let body = RequestBody::Multipart(MultipartBody {
            file: document,
            fields: vec![("message".to_string(), question.clone())],
        });
        match self.pipeline.submit(body).await {
            SubmitOutcome::Succeeded(response) => {
                let reply = response
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| PDF_FALLBACK_REPLY.to_string());
                ChatOutcome::Replied(self.transcript.push_assistant(reply).clone())
            }
            SubmitOutcome::Failed(detail) => {
                self.transcript.push_assistant(PDF_ERROR_REPLY);
                ChatOutcome::Failed(detail)
            }
            SubmitOutcome::AlreadyInFlight => {
                debug!("document question arrived while a request was pending; restoring input");
                self.transcript.pop_last();
                self.input = question;
                ChatOutcome::Busy
            }
            SubmitOutcome::Superseded => ChatOutcome::Superseded,
        }
    }

    /// Drops the document and the conversation.
    pub async fn reset_to_upload(&mut self) {
        self.document = None;
        self.banner = None;
        self.transcript.clear();
        self.input.clear();
        self.pipeline.reset().await;
    }
}
