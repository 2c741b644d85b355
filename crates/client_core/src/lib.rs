//! Client side of the FinWise advisors: form state, backend transport,
//! submission lifecycle, advice rendering, document chat and navigation.

pub mod form;
pub mod navigation;
pub mod render;
pub mod screens;
pub mod submission;
pub mod transcript;
pub mod transport;

pub use form::{FormController, FormModel};
pub use navigation::{nav_items, render_nav_bar, NavItem, RouteStore, BRAND};
pub use render::{render_text, Block, ListStyle, Render, RenderedSection, SectionKind};
pub use screens::{
    ChatOutcome, FinancialAdvisorScreen, FormSubmitOutcome, PdfAdvisorScreen,
    ProductAdvisorScreen,
};
pub use submission::{SubmissionPipeline, SubmissionState, SubmitOutcome};
pub use transcript::{typing_reveal, Transcript, DEFAULT_TYPING_DELAY};
pub use transport::{
    AdviceTransport, FileAttachment, HttpTransport, MultipartBody, RequestBody, DEFAULT_BASE_URL,
    PDF_MIME_TYPE,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
