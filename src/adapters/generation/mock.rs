//! Mock generation adapters for tests and local runs.
//!
//! Responses are scripted: queue results (including failures) and they are
//! consumed in order; when the queue is empty a deterministic canned
//! response is produced instead.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::journey::ImageRef;
use crate::domain::personalization::StyleProfile;
use crate::ports::{
    GeneratedText, GenerationContext, GenerationError, ImageGenerator, TextGenerator,
};

/// Scriptable `TextGenerator`.
pub struct MockTextGenerator {
    scripted: Mutex<VecDeque<Result<GeneratedText, GenerationError>>>,
    received: Mutex<Vec<GenerationContext>>,
}

impl MockTextGenerator {
    /// Creates a mock that always answers with the canned response.
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful response.
    pub fn enqueue_text(&self, text: impl Into<String>) {
        self.scripted.lock().unwrap().push_back(Ok(GeneratedText {
            text: text.into(),
            provider: "mock".to_string(),
        }));
    }

    /// Queues a failure.
    pub fn enqueue_error(&self, error: GenerationError) {
        self.scripted.lock().unwrap().push_back(Err(error));
    }

    /// Contexts this mock has been called with, in order.
    pub fn received_contexts(&self) -> Vec<GenerationContext> {
        self.received.lock().unwrap().clone()
    }

    /// Number of calls made against this mock.
    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(
        &self,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError> {
        self.received.lock().unwrap().push(context.clone());

        if let Some(scripted) = self.scripted.lock().unwrap().pop_front() {
            return scripted;
        }

        Ok(GeneratedText {
            text: format!(
                "a gentle landscape holding the feeling of: {}",
                context.diary.chars().take(40).collect::<String>()
            ),
            provider: "mock".to_string(),
        })
    }
}

/// Scriptable `ImageGenerator`.
pub struct MockImageGenerator {
    scripted: Mutex<VecDeque<Result<ImageRef, GenerationError>>>,
    received: Mutex<Vec<String>>,
    counter: Mutex<u32>,
}

impl MockImageGenerator {
    /// Creates a mock that mints sequential image references.
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
            counter: Mutex::new(0),
        }
    }

    /// Queues a successful response.
    pub fn enqueue_image(&self, reference: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Ok(ImageRef::new(reference).expect("non-empty image ref")));
    }

    /// Queues a failure.
    pub fn enqueue_error(&self, error: GenerationError) {
        self.scripted.lock().unwrap().push_back(Err(error));
    }

    /// Prompts this mock has been called with, in order.
    pub fn received_prompts(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Number of calls made against this mock.
    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(
        &self,
        prompt: &str,
        _style: &StyleProfile,
    ) -> Result<ImageRef, GenerationError> {
        self.received.lock().unwrap().push(prompt.to_string());

        if let Some(scripted) = self.scripted.lock().unwrap().pop_front() {
            return scripted;
        }

        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        Ok(ImageRef::new(format!("mock://images/{}.png", *counter)).expect("non-empty"))
    }
}
