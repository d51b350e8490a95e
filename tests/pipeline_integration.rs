//! End-to-end digest runs against a mock registry.
//!
//! Each test starts a wiremock server that plays both the registry search
//! endpoint and the act document host, then drives the real `RegistryClient`
//! and `LlmSummarizer` with a stub LLM and a recording notifier.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use law_digest::channels::{DeliveryStatus, Notification, Notifier};
use law_digest::error::{DispatchError, LlmError};
use law_digest::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role};
use law_digest::pipeline::{ActPipeline, DispatchOutcome, FALLBACK_SUMMARY, Stage};
use law_digest::pipeline::report::NO_ACTS_TITLE;
use law_digest::registry::{Period, RegistryClient, SearchFilter};
use law_digest::summarizer::{LlmSummarizer, SUMMARY_MAX_CHARS, SummarizerConfig};

/// Stub LLM: answers with a canned summary keyed on the act text it was given.
struct StubLlm {
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }
    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = request
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());

        let content = if prompt.contains("drogach publicznych") {
            "Ustawa zmienia zasady zarządzania drogami publicznymi.".to_string()
        } else {
            // Deliberately over the cap.
            "Rozporządzenie ".repeat(40)
        };
        Ok(CompletionResponse {
            content,
            input_tokens: 100,
            output_tokens: 40,
            finish_reason: FinishReason::Stop,
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }
    async fn send(&self, notification: &Notification) -> Result<DeliveryStatus, DispatchError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(DeliveryStatus::Sent {
            recipients: vec!["legal@example.com".to_string()],
        })
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 25).unwrap()
}

fn item(n: u32, title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "inForce": "IN_FORCE",
        "entryIntoForce": "2025-03-20",
        "announcementDate": "2025-03-19",
        "promulgation": "2025-03-19",
        "keywords": ["drogi"],
        "ELI": format!("DU/2025/{n}"),
        "textPDF": false,
        "textHTML": true
    })
}

async fn mount_document(server: &MockServer, n: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/eli/acts/DU/2025/{n}/text.html")))
        .respond_with(response)
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body><h1>Ustawa</h1><p>{body}</p></body></html>"))
}

/// Build a PDF whose pages show the given strings (empty = blank page).
fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            vec![]
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Staged PDFs left in the temp dir.
fn staged_pdfs() -> Vec<std::path::PathBuf> {
    std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("law-digest-") && n.ends_with(".pdf"))
        })
        .collect()
}

fn pipeline(
    server: &MockServer,
    llm: Arc<StubLlm>,
    notifier: Arc<RecordingNotifier>,
) -> ActPipeline {
    let http = reqwest::Client::new();
    let registry = RegistryClient::with_client(http.clone(), format!("{}/eli", server.uri()));
    let summarizer = LlmSummarizer::new(http, llm, SummarizerConfig::default());
    ActPipeline::new(Arc::new(registry), Arc::new(summarizer), notifier)
}

#[tokio::test]
async fn digest_survives_one_failed_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eli/acts/search"))
        .and(query_param("publisher", "DU"))
        .and(query_param("keyword", "drogi"))
        .and(query_param("dateEffectFrom", "2025-03-18"))
        .and(query_param("dateEffectTo", "2025-03-25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                item(1, "Ustawa o zmianie ustawy o drogach publicznych"),
                item(2, "Obwieszczenie w sprawie tekstu jednolitego"),
                item(3, "Rozporządzenie w sprawie znaków drogowych"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_document(&server, 1, html("Zmiany w ustawie o drogach publicznych.")).await;
    mount_document(&server, 2, ResponseTemplate::new(500)).await;
    mount_document(&server, 3, html("Nowe wzory znaków.")).await;

    let llm = StubLlm::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let filter = SearchFilter::last_week(today()).with_keywords(["drogi"]);

    let state = pipeline(&server, llm.clone(), notifier.clone())
        .run(filter, Period::LastWeek)
        .await
        .unwrap();

    assert_eq!(state.stage, Stage::Done);
    assert_eq!(state.acts.len(), 3);
    assert_eq!(
        state.acts[0].summary,
        "Ustawa zmienia zasady zarządzania drogami publicznymi."
    );
    assert_eq!(state.acts[1].summary, FALLBACK_SUMMARY);
    assert!(state.acts[2].summary.chars().count() <= SUMMARY_MAX_CHARS);
    assert!(state.acts[2].summary.starts_with("Rozporządzenie"));

    // The failed download never reached the model.
    assert_eq!(llm.prompts.lock().unwrap().len(), 2);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("w ostatnim tygodniu"));
    let table = sent[0].table.as_deref().unwrap();
    let first = table.find("drogach publicznych").unwrap();
    let second = table.find("Obwieszczenie").unwrap();
    let third = table.find("znaków drogowych").unwrap();
    assert!(first < second && second < third);
    assert!(table.contains(FALLBACK_SUMMARY));
    assert!(table.contains("/eli/acts/DU/2025/3/text.html"));

    assert_eq!(
        state.dispatch,
        DispatchOutcome::Delivered(DeliveryStatus::Sent {
            recipients: vec!["legal@example.com".to_string()]
        })
    );
    let summary = state.summary();
    assert_eq!((summary.total, summary.summarized, summary.fallbacks), (3, 2, 1));
}

#[tokio::test]
async fn empty_registry_result_sends_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eli/acts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let llm = StubLlm::new();
    let notifier = Arc::new(RecordingNotifier::default());

    let state = pipeline(&server, llm.clone(), notifier.clone())
        .run(SearchFilter::last_week(today()), Period::LastWeek)
        .await
        .unwrap();

    assert_eq!(state.stage, Stage::Done);
    assert!(state.acts.is_empty());
    assert!(llm.prompts.lock().unwrap().is_empty());

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, NO_ACTS_TITLE);
    assert!(sent[0].table.is_none());
}

#[tokio::test]
async fn registry_outage_reads_as_no_acts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eli/acts/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let state = pipeline(&server, StubLlm::new(), notifier.clone())
        .run(SearchFilter::last_month(today()), Period::LastMonth)
        .await
        .unwrap();

    assert_eq!(state.stage, Stage::Done);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, NO_ACTS_TITLE);
    assert!(sent[0].body.contains("w ostatnim miesiącu"));
}

#[tokio::test]
async fn pdf_act_is_extracted_and_summarized() {
    let server = MockServer::start().await;
    let mut pdf_item = item(4, "Ustawa o zmianie ustawy o drogach publicznych");
    pdf_item["textPDF"] = json!(true);
    Mock::given(method("GET"))
        .and(path("/eli/acts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [pdf_item] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eli/acts/DU/2025/4/text.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(build_pdf(&["Zmiany w drogach publicznych", "", "Art. 2"])),
        )
        .expect(1)
        .mount(&server)
        .await;
    // PDF wins over HTML when both are offered.
    mount_document(&server, 4, html("wersja HTML")).await;

    let before = staged_pdfs();
    let llm = StubLlm::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let state = pipeline(&server, llm.clone(), notifier.clone())
        .run(SearchFilter::last_week(today()), Period::LastWeek)
        .await
        .unwrap();

    assert_eq!(state.stage, Stage::Done);
    assert_eq!(
        state.acts[0].summary,
        "Ustawa zmienia zasady zarządzania drogami publicznymi."
    );

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let first = prompts[0].find("Zmiany w drogach publicznych").unwrap();
    let third = prompts[0].find("Art. 2").unwrap();
    assert!(first < third);
    assert!(!prompts[0].contains("wersja HTML"));

    let table = notifier.sent.lock().unwrap()[0].table.clone().unwrap();
    assert!(table.contains("/eli/acts/DU/2025/4/text.pdf"));

    let leftover: Vec<_> = staged_pdfs()
        .into_iter()
        .filter(|p| !before.contains(p))
        .collect();
    assert!(leftover.is_empty(), "staged PDFs not cleaned up: {leftover:?}");
}
