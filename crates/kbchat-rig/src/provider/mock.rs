//! Scripted providers for tests.
//!
//! [`MockCompletionModel`] replays a fixed list of tokens and can be told to
//! fail before or during the stream. [`MockEmbeddingModel`] hashes words into
//! a fixed number of buckets, so texts sharing words land close together.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;

use super::{CompletionRequest, TokenStream};
use crate::{Error, Result};

/// Completion model that replays scripted tokens.
///
/// Clones share the request log.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    tokens: Vec<String>,
    fail_after: Option<usize>,
    fail_to_start: bool,
    token_delay: Option<Duration>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletionModel {
    /// Creates a model that streams `tokens` for every request.
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Emits the first `count` tokens and then fails the stream.
    pub fn with_failure_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Fails before the stream starts.
    pub fn with_start_failure(mut self) -> Self {
        self.fail_to_start = true;
        self
    }

    /// Sleeps before each token.
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = Some(delay);
        self
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn stream(&self, request: CompletionRequest) -> Result<TokenStream> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if self.fail_to_start {
            return Err(Error::provider("mock", "failed to start stream"));
        }

        let emitted = self.fail_after.unwrap_or(self.tokens.len());
        let mut items: Vec<Result<String>> = self
            .tokens
            .iter()
            .take(emitted)
            .cloned()
            .map(Ok)
            .collect();
        if self.fail_after.is_some() {
            items.push(Err(Error::provider("mock", "stream interrupted")));
        }

        let stream = futures::stream::iter(items);
        match self.token_delay {
            Some(delay) => Ok(stream
                .then(move |item| async move {
                    tokio::time::sleep(delay).await;
                    item
                })
                .boxed()),
            None => Ok(stream.boxed()),
        }
    }
}

/// Embedding model that hashes words into buckets.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dimensions: usize,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

impl MockEmbeddingModel {
    /// Creates a model producing vectors of `dimensions` entries.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            failing: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a model that fails every request.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(8)
        }
    }

    /// Returns the number of embedding requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            return Err(Error::embedding("mock embedding failure"));
        }

        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for MockEmbeddingModel {
    fn default() -> Self {
        Self::new(64)
    }
}
