//! Test utilities for integration tests.
//!
//! Provides call-counting mocks for the model and speech vendor, and a
//! router wired to temporary data and public directories.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use tagalong::asset::{AssetCache, AssetService};
use tagalong::catalog::{CharacterCatalog, SceneStore, TourCatalog};
use tagalong::error::UpstreamError;
use tagalong::genai::{GeneratedImage, GenerativeModel, Part, SpeechSynthesizer};
use tagalong::server::{create_router, AppState, RouterConfig};

/// Character with a reference image in every test public dir.
pub const CHEF: &str = "chef-nomi-delgado";

/// Bytes that sniff as PNG.
pub const TEST_PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Bytes that sniff as JPEG.
pub const TEST_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

// =============================================================================
// Mock Generative Model
// =============================================================================

/// A mock model that returns canned output and counts calls.
pub struct MockModel {
    text: Option<String>,
    image: Option<Bytes>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
    last_image_parts: Mutex<Vec<Part>>,
    last_text_prompt: Mutex<Option<String>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            text: Some("Hello there!\n\n\n\nReady to cook?".to_string()),
            image: Some(Bytes::from_static(TEST_PNG)),
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            last_image_parts: Mutex::new(Vec::new()),
            last_text_prompt: Mutex::new(None),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Every text call fails with a 500 from upstream.
    pub fn failing_text(mut self) -> Self {
        self.text = None;
        self
    }

    /// Every image call returns no image part.
    pub fn failing_image(mut self) -> Self {
        self.image = None;
        self
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn last_image_parts(&self) -> Vec<Part> {
        self.last_image_parts.lock().unwrap().clone()
    }

    pub fn last_text_prompt(&self) -> Option<String> {
        self.last_text_prompt.lock().unwrap().clone()
    }
}

fn joined_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|p| match p {
            Part::Text(t) => Some(t.as_str()),
            Part::InlineData { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate_text(&self, parts: Vec<Part>) -> Result<String, UpstreamError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text_prompt.lock().unwrap() = Some(joined_text(&parts));
        self.text.clone().ok_or(UpstreamError::Status {
            status: 500,
            message: "INTERNAL: mock failure".to_string(),
        })
    }

    async fn generate_image(&self, parts: Vec<Part>) -> Result<GeneratedImage, UpstreamError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_image_parts.lock().unwrap() = parts;
        let data = self.image.clone().ok_or(UpstreamError::NoImage)?;
        Ok(GeneratedImage {
            mime_type: "image/png".to_string(),
            data,
        })
    }

    fn text_model(&self) -> &str {
        "mock-text-model"
    }
}

// =============================================================================
// Mock Speech Synthesizer
// =============================================================================

/// Outcome of a mock synthesis call.
#[derive(Clone)]
pub enum SpeechOutcome {
    Audio(Bytes),
    Fail(UpstreamError),
}

pub struct MockSpeech {
    configured: bool,
    outcome: SpeechOutcome,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String)>>,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self {
            configured: true,
            outcome: SpeechOutcome::Audio(Bytes::from_static(b"RIFF0000WAVE")),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn with_outcome(mut self, outcome: SpeechOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(text, voice_id)` of the last call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((text.to_string(), voice_id.to_string()));
        match &self.outcome {
            SpeechOutcome::Audio(bytes) => Ok(bytes.clone()),
            SpeechOutcome::Fail(err) => Err(err.clone()),
        }
    }
}

// =============================================================================
// Test Application
// =============================================================================

/// A router over mocks and temporary directories.
pub struct TestApp {
    pub router: Router,
    pub model: Arc<MockModel>,
    pub speech: Arc<MockSpeech>,
    pub data_dir: TempDir,
    pub public_dir: TempDir,
}

/// Options for [`TestApp`].
pub struct TestAppBuilder {
    model: MockModel,
    speech: MockSpeech,
    generation_enabled: bool,
    with_reference_image: bool,
    data_dir: Option<TempDir>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            model: MockModel::new(),
            speech: MockSpeech::new(),
            generation_enabled: true,
            with_reference_image: true,
            data_dir: None,
        }
    }

    pub fn model(mut self, model: MockModel) -> Self {
        self.model = model;
        self
    }

    pub fn speech(mut self, speech: MockSpeech) -> Self {
        self.speech = speech;
        self
    }

    pub fn generation_disabled(mut self) -> Self {
        self.generation_enabled = false;
        self
    }

    pub fn without_reference_image(mut self) -> Self {
        self.with_reference_image = false;
        self
    }

    /// Reuse an existing data directory, e.g. to simulate a restart.
    pub fn data_dir(mut self, dir: TempDir) -> Self {
        self.data_dir = Some(dir);
        self
    }

    pub fn build(self) -> TestApp {
        let data_dir = self
            .data_dir
            .unwrap_or_else(|| TempDir::new().expect("create data dir"));
        let public_dir = TempDir::new().expect("create public dir");

        if self.with_reference_image {
            let characters = public_dir.path().join("characters");
            std::fs::create_dir_all(&characters).unwrap();
            std::fs::write(characters.join(format!("{}.png", CHEF)), TEST_PNG).unwrap();
        }

        let model = Arc::new(self.model);
        let speech = Arc::new(self.speech);
        let characters = Arc::new(CharacterCatalog::builtin().unwrap());
        let scenes = Arc::new(SceneStore::with_builtin(data_dir.path()).unwrap());
        let tours = Arc::new(TourCatalog::builtin().unwrap());

        let assets = AssetService::new(
            Arc::clone(&model),
            AssetCache::new(data_dir.path(), 1024 * 1024),
            Arc::clone(&characters),
            Arc::clone(&scenes),
            public_dir.path(),
            self.generation_enabled,
        );
        let state = AppState::new(
            Arc::clone(&model),
            Arc::clone(&speech),
            assets,
            characters,
            scenes,
            tours,
        );
        let router = create_router(state, RouterConfig::new().with_tracing(false));

        TestApp {
            router,
            model,
            speech,
            data_dir,
            public_dir,
        }
    }
}

/// Default app: generation enabled, reference image present.
pub fn test_app() -> TestApp {
    TestAppBuilder::new().build()
}

// =============================================================================
// Request Helpers
// =============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> TestResponse {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &TestApp, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Number of files in a directory, zero if it does not exist.
pub fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
