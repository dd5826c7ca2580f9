use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::backend::{AnalysisBackend, ImageAnalysisRequest, TextAnalysisRequest};
use crate::error::AnalysisError;

type Reply<R> = Box<dyn Fn(&R) -> Result<String, AnalysisError> + Send + Sync>;

/// Scripted backend for analyzer tests. Records calls and peak concurrency.
pub(crate) struct MockBackend {
    text: Reply<TextAnalysisRequest>,
    image: Reply<ImageAnalysisRequest>,
    hang: bool,
    pub text_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    in_flight: AtomicUsize,
    pub text_requests: Mutex<Vec<TextAnalysisRequest>>,
    pub image_requests: Mutex<Vec<ImageAnalysisRequest>>,
}

impl MockBackend {
    pub fn replying(
        text: impl Fn(&TextAnalysisRequest) -> Result<String, AnalysisError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            text: Box::new(text),
            image: Box::new(|_| Err(AnalysisError::Unavailable("no image script".into()))),
            hang: false,
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            text_requests: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer the text request with `body`.
    pub fn fixed(body: &str) -> Self {
        let body = body.to_string();
        Self::replying(move |_| Ok(body.clone()))
    }

    pub fn failing() -> Self {
        Self::replying(|_| {
            Err(AnalysisError::Unavailable(
                "server returned 503: overloaded".into(),
            ))
        })
    }

    /// Never completes a text request.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::fixed("{}")
        }
    }

    pub fn with_image(
        mut self,
        image: impl Fn(&ImageAnalysisRequest) -> Result<String, AnalysisError> + Send + Sync + 'static,
    ) -> Self {
        self.image = Box::new(image);
        self
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze_text(&self, request: &TextAnalysisRequest) -> Result<String, AnalysisError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.text_requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let sibling futures in the same join start before this one finishes.
        tokio::task::yield_now().await;
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.text)(request)
    }

    async fn analyze_image(
        &self,
        request: &ImageAnalysisRequest,
    ) -> Result<String, AnalysisError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.image_requests.lock().unwrap().push(request.clone());
        (self.image)(request)
    }
}
