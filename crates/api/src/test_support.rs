//! Shared fakes for the api tests

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    routing::get,
    Router,
};
use crate::{create_router, AppState, HttpConfig, LinkPolicy};
use image::{DynamicImage, ImageFormat};
use inference_engine::{Classifier, InferenceError, LoadError, ModelLoader, Prediction, Predictor};
use reference_lookup::{LookupError, ReferenceLink, ReferenceLookup};
use serde_json::Value;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const BOUNDARY: &str = "aviary-test-boundary";

/// Predictor answering with a fixed label
pub struct StubPredictor {
    label: &'static str,
    calls: AtomicUsize,
}

impl StubPredictor {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for StubPredictor {
    fn predict(&self, _image: &DynamicImage) -> Result<Prediction, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Prediction {
            label: self.label.to_string(),
            confidence: 0.87,
        })
    }

    fn class_count(&self) -> usize {
        1
    }
}

/// Loader that counts invocations and hands out one shared stub predictor
pub struct CountingLoader {
    predictor: Arc<StubPredictor>,
    incompatible: bool,
    loads: AtomicUsize,
}

impl CountingLoader {
    pub fn new(label: &'static str) -> Self {
        Self {
            predictor: Arc::new(StubPredictor::new(label)),
            incompatible: false,
            loads: AtomicUsize::new(0),
        }
    }

    /// Loader that always reports an environment mismatch
    pub fn incompatible() -> Self {
        Self {
            incompatible: true,
            ..Self::new("unused")
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn predictor(&self) -> &Arc<StubPredictor> {
        &self.predictor
    }
}

impl ModelLoader for CountingLoader {
    fn load(&self, directory: &Path, artifact_name: &str) -> Result<Arc<dyn Predictor>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.incompatible {
            return Err(LoadError::EnvironmentIncompatible {
                path: directory.join(artifact_name),
                detail: "Unimplemented(FusedConv)".to_string(),
            });
        }
        Ok(self.predictor.clone())
    }
}

/// Lookup that records every queried term
pub struct RecordingLookup {
    failure: Option<LookupError>,
    terms: Mutex<Vec<String>>,
}

impl RecordingLookup {
    pub fn found() -> Self {
        Self {
            failure: None,
            terms: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: LookupError) -> Self {
        Self {
            failure: Some(error),
            terms: Mutex::new(Vec::new()),
        }
    }

    pub fn terms(&self) -> Vec<String> {
        self.terms.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceLookup for RecordingLookup {
    async fn lookup(&self, term: &str) -> Result<ReferenceLink, LookupError> {
        self.terms.lock().unwrap().push(term.to_string());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(ReferenceLink {
                category_queried: term.to_string(),
                url: format!("https://en.wikipedia.org/wiki/{}", term.replace(' ', "_")),
            }),
        }
    }
}

/// Serve fake artifact bytes with `status` on `/artifact`, counting hits
pub async fn spawn_artifact_host(status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/artifact",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, &b"fake onnx bytes"[..])
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/artifact", addr), hits)
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(32, 24)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// `POST /analyze` with a single multipart field
pub fn analyze_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"bird.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Router over a stub predictor, plus the predictor for call counting
pub fn test_router(
    label: &'static str,
    lookup: Arc<RecordingLookup>,
    link_policy: LinkPolicy,
) -> (Router, Arc<StubPredictor>) {
    let predictor = Arc::new(StubPredictor::new(label));
    let state = AppState::new(
        Classifier::new(predictor.clone()),
        lookup,
        link_policy,
        PathBuf::from("app/view"),
    );
    (create_router(Arc::new(state), &HttpConfig::default()), predictor)
}
