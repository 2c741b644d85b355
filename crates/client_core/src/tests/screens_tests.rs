use super::*;
use crate::{
    test_support::{http_transport, Gate, ScriptedTransport},
    transport::{FileAttachment, MultipartBody, RequestBody},
};
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{AdviceKind, FinancialSection, PaymentCategory, ProductStep},
    error::ErrorCode,
    protocol::ChatRole,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{oneshot, Mutex};

type Capture<T> = Arc<Mutex<Option<oneshot::Sender<T>>>>;

fn capture<T>() -> (Capture<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (Arc::new(Mutex::new(Some(tx))), rx)
}

fn pdf_attachment(bytes: Vec<u8>) -> FileAttachment {
    FileAttachment {
        filename: "statement.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        bytes,
    }
}

async fn handle_product_advice(
    State(capture): State<Capture<Value>>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    if let Some(tx) = capture.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(json!({
        "advice": {
            "productRecommendations": { "primaryChoice": { "name": "Pixel 8a", "price": 39999 } }
        }
    }))
}

#[derive(Debug, Default)]
struct ReceivedUpload {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
    message: String,
}

async fn handle_pdf_advice(
    State(capture): State<Capture<ReceivedUpload>>,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut upload = ReceivedUpload::default();
    while let Some(field) = multipart.next_field().await.expect("next field") {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.filename = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field.bytes().await.expect("file bytes").to_vec();
            }
            "message" => upload.message = field.text().await.expect("message text"),
            _ => {}
        }
    }
    if let Some(tx) = capture.lock().await.take() {
        let _ = tx.send(upload);
    }
    Json(json!({ "message": "Your statement shows three EMI payments." }))
}

#[tokio::test]
async fn product_submission_posts_form_and_advances() {
    let (tx, payload_rx) = capture();
    let app = Router::new()
        .route("/api/advice/product-advice", post(handle_product_advice))
        .with_state(tx);
    let mut screen = ProductAdvisorScreen::new(http_transport(app).await);

    screen.form_mut().update_field("budget", "1000");
    screen.continue_to_product_details();
    screen.form_mut().update_field("productType", "smartphone");
    screen.form_mut().update_field("location", "Delhi");

    let outcome = screen.submit().await;
    assert!(outcome.response().is_some(), "got {outcome:?}");
    assert_eq!(screen.step(), ProductStep::Recommendations);

    let payload = payload_rx.await.expect("payload");
    assert_eq!(payload["budget"], "1000");
    assert_eq!(payload["productType"], "smartphone");
    assert_eq!(payload["location"], "Delhi");
    assert_eq!(payload["preferredBrands"], json!([]));

    let text = crate::render::render_text(&screen.rendered_advice().await);
    assert!(text.contains("Pixel 8a"));
    assert!(text.contains("₹39999"));
}

#[tokio::test]
async fn incomplete_product_form_is_not_sent() {
    let transport = ScriptedTransport::empty();
    let mut screen = ProductAdvisorScreen::new(transport.clone());
    screen.form_mut().update_field("budget", "1000");
    screen.form_mut().update_field("productType", "laptop");
    screen.form_mut().update_field("location", "   ");

    let outcome = screen.submit().await;
    let detail = outcome.error().expect("validation error");
    assert_eq!(detail.code, ErrorCode::Validation);
    assert_eq!(detail.message, "Location is required");
    assert_eq!(screen.validation_errors().len(), 1);
    assert_eq!(screen.step(), ProductStep::FinancialDetails);
    assert!(transport.requests.lock().await.is_empty());
}

#[tokio::test]
async fn failed_product_submission_stays_on_form() {
    let transport = ScriptedTransport::replying([Err(502)]);
    let mut screen = ProductAdvisorScreen::new(transport);
    screen.form_mut().update_field("budget", "1000");
    screen.form_mut().update_field("productType", "laptop");
    screen.form_mut().update_field("location", "Pune");
    screen.continue_to_product_details();

    let outcome = screen.submit().await;
    assert_eq!(
        outcome.error().map(|detail| detail.message),
        Some("Failed to get product advice. Please try again.".to_string())
    );
    assert_eq!(screen.step(), ProductStep::ProductDetails);
    assert!(screen.rendered_advice().await.is_empty());
}

#[tokio::test]
async fn new_search_clears_everything() {
    let transport = ScriptedTransport::replying([Ok(json!({ "advice": {} }))]);
    let mut screen = ProductAdvisorScreen::new(transport);
    screen.form_mut().update_field("budget", "1000");
    screen.form_mut().update_field("productType", "laptop");
    screen.form_mut().update_field("location", "Pune");
    assert!(screen.submit().await.response().is_some());

    screen.start_new_search().await;
    assert_eq!(screen.step(), ProductStep::FinancialDetails);
    assert_eq!(screen.form().model().get_str("budget"), Some(""));
    assert_eq!(screen.state().await, crate::submission::SubmissionState::Idle);
}

#[tokio::test]
async fn financial_submission_carries_payment_selection() {
    let transport = ScriptedTransport::replying([Ok(json!({ "advice": { "actionSteps": ["Pay"] } }))]);
    let mut screen = FinancialAdvisorScreen::new(transport.clone());
    screen.form_mut().update_field("totalBudget", "85000");
    screen.form_mut().set_active_section(FinancialSection::Payment);
    assert!(screen.toggle_payment_option(PaymentCategory::CreditCards, "hdfc_credit"));
    assert!(screen.toggle_payment_option(PaymentCategory::UpiOptions, "gpay"));
    screen.set_emi_duration(Some(12));

    let outcome = screen.submit().await;
    assert!(outcome.response().is_some());
    assert_eq!(screen.rendered_advice().await.len(), 1);

    let requests = transport.requests.lock().await;
    let (kind, RequestBody::Json(body)) = &requests[0] else {
        panic!("expected a json body");
    };
    assert_eq!(*kind, AdviceKind::FinancialStrategy);
    assert_eq!(body["purchaseType"], "electronics");
    assert_eq!(body["paymentPreferences"]["creditCards"], json!(["hdfc_credit"]));
    assert_eq!(body["paymentPreferences"]["upiOptions"], json!(["gpay"]));
    assert_eq!(body["paymentPreferences"]["emiOptions"], "12");
    assert_eq!(body["settings"]["notifications"], true);
}

#[tokio::test]
async fn financial_form_requires_budget() {
    let transport = ScriptedTransport::empty();
    let mut screen = FinancialAdvisorScreen::new(transport.clone());

    let outcome = screen.submit().await;
    assert!(matches!(outcome, FormSubmitOutcome::Invalid(ref errors) if errors.len() == 1));
    assert_eq!(
        outcome.error().map(|detail| detail.message),
        Some("Total budget is required".to_string())
    );
    assert!(transport.requests.lock().await.is_empty());
}

#[tokio::test]
async fn pdf_question_goes_out_as_multipart() {
    let (tx, upload_rx) = capture();
    let app = Router::new()
        .route("/api/advice/pdf-advice", post(handle_pdf_advice))
        .with_state(tx);
    let mut screen = PdfAdvisorScreen::new(http_transport(app).await);

    screen.attach(pdf_attachment(b"%PDF-1.7 test".to_vec())).expect("attach pdf");
    screen.set_input("  How many EMIs?  ");
    let outcome = screen.send().await;

    let ChatOutcome::Replied(reply) = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert_eq!(reply.content, "Your statement shows three EMI payments.");
    assert!(screen.input().is_empty());

    let upload = upload_rx.await.expect("upload");
    assert_eq!(upload.filename.as_deref(), Some("statement.pdf"));
    assert_eq!(upload.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(upload.bytes, b"%PDF-1.7 test");
    assert_eq!(upload.message, "  How many EMIs?  ");

    let transcript: Vec<_> = screen
        .transcript()
        .entries()
        .iter()
        .map(|entry| (entry.role, entry.content.as_str()))
        .collect();
    assert_eq!(
        transcript,
        vec![
            (ChatRole::Assistant, pdf::PDF_GREETING),
            (ChatRole::User, "  How many EMIs?  "),
            (ChatRole::Assistant, "Your statement shows three EMI payments."),
        ]
    );
}

#[tokio::test]
async fn pdf_reply_falls_back_and_failures_apologise() {
    let transport = ScriptedTransport::replying([Ok(json!({})), Err(500)]);
    let mut screen = PdfAdvisorScreen::new(transport);
    screen.attach(pdf_attachment(vec![0; 16])).expect("attach pdf");

    screen.set_input("Summarise it");
    let first = screen.send().await;
    assert!(matches!(first, ChatOutcome::Replied(ref entry) if entry.content == pdf::PDF_FALLBACK_REPLY));

    screen.set_input("And the fees?");
    let second = screen.send().await;
    assert!(matches!(second, ChatOutcome::Failed(_)));
    assert_eq!(
        screen.transcript().last().map(|entry| entry.content.as_str()),
        Some(pdf::PDF_ERROR_REPLY)
    );
    assert_eq!(screen.transcript().count_role(ChatRole::User), 2);
    assert_eq!(screen.transcript().len(), 5);
}

async fn gated_pdf_advice(State(gate): State<Gate>) -> Json<Value> {
    gate.pass().await;
    Json(json!({ "message": "Done reading." }))
}

#[tokio::test]
async fn pdf_question_while_pending_is_rejected_untouched() {
    let gate = Gate::default();
    let app = Router::new()
        .route("/api/advice/pdf-advice", post(gated_pdf_advice))
        .with_state(gate.clone());
    let mut screen = PdfAdvisorScreen::new(http_transport(app).await);
    screen.attach(pdf_attachment(vec![7; 8])).expect("attach pdf");

    let pending = tokio::spawn({
        let pipeline = screen.pipeline();
        let document = pdf_attachment(vec![7; 8]);
        async move {
            pipeline
                .submit(RequestBody::Multipart(MultipartBody {
                    file: document,
                    fields: vec![("message".to_string(), "first".to_string())],
                }))
                .await
        }
    });
    gate.arrived.notified().await;

    screen.set_input("Second question");
    assert_eq!(screen.send().await, ChatOutcome::Busy);
    assert_eq!(screen.transcript().len(), 1);
    assert_eq!(screen.transcript().count_role(ChatRole::User), 0);
    assert_eq!(screen.input(), "Second question");
    assert_eq!(gate.hits(), 1);

    gate.release.notify_one();
    assert!(matches!(
        pending.await.expect("join"),
        SubmitOutcome::Succeeded(_)
    ));
}

#[tokio::test]
async fn pdf_send_needs_text_and_document() {
    let transport = ScriptedTransport::empty();
    let mut screen = PdfAdvisorScreen::new(transport.clone());

    screen.set_input("anything");
    assert_eq!(screen.send().await, ChatOutcome::NoDocument);

    screen.attach(pdf_attachment(vec![1, 2, 3])).expect("attach pdf");
    screen.set_input("   ");
    assert_eq!(screen.send().await, ChatOutcome::Ignored);
    assert_eq!(screen.transcript().len(), 1);
    assert!(transport.requests.lock().await.is_empty());
}

#[test]
fn non_pdf_is_rejected_with_expiring_banner() {
    let transport = ScriptedTransport::empty();
    let mut screen = PdfAdvisorScreen::new(transport).with_banner_ttl(Duration::from_secs(3));

    let err = screen
        .attach(FileAttachment {
            filename: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: b"hello".to_vec(),
        })
        .expect_err("text files are rejected");
    assert_eq!(err.found, "text/plain");
    assert!(screen.document().is_none());
    assert!(screen.transcript().is_empty());

    let now = Instant::now();
    assert!(screen.banner_at(now).is_some());
    assert!(screen.banner_at(now + Duration::from_secs(4)).is_none());

    screen.dismiss_banner();
    assert!(screen.banner_at(now).is_none());
}

#[tokio::test]
async fn reset_to_upload_closes_chat() {
    let transport = ScriptedTransport::empty();
    let mut screen = PdfAdvisorScreen::new(transport);
    screen
        .attach(pdf_attachment(vec![0; 1024 * 1024 * 3 / 2]))
        .expect("attach pdf");
    assert!(screen.is_chat_open());
    assert_eq!(screen.document_size_label().as_deref(), Some("1.50 MB"));

    screen.reset_to_upload().await;
    assert!(!screen.is_chat_open());
    assert!(screen.transcript().is_empty());
    assert_eq!(screen.document_size_label(), None);
}

#[tokio::test]
async fn attach_path_reads_and_classifies_file() {
    let dir = std::env::temp_dir().join(format!("finwise-attach-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("temp dir");
    let pdf_path = dir.join("report.pdf");
    let txt_path = dir.join("report.txt");
    tokio::fs::write(&pdf_path, b"%PDF-1.4").await.expect("write pdf");
    tokio::fs::write(&txt_path, b"plain").await.expect("write txt");

    let mut screen = PdfAdvisorScreen::new(ScriptedTransport::empty());
    screen.attach_path(&pdf_path).await.expect("pdf attaches");
    assert_eq!(
        screen.document().map(|doc| doc.filename.as_str()),
        Some("report.pdf")
    );

    let err = screen
        .attach_path(&txt_path)
        .await
        .expect_err("txt is rejected");
    assert!(err.downcast_ref::<shared::error::FileTypeError>().is_some());
    assert_eq!(
        screen.document().map(|doc| doc.filename.as_str()),
        Some("report.pdf")
    );

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
