//! Model provider seam.
//!
//! The service treats the vision model as an opaque capability: given a chat request
//! (text prompt, optionally with an image), it returns unstructured text.

pub mod openai;

use crate::{error::ProviderError, models::openai::ChatCompletionRequest};
use async_trait::async_trait;

pub use openai::OpenAiCompatibleProvider;

/// Unified interface for the upstream chat model.
///
/// Implementations make exactly one upstream call per invocation and never retry.
#[async_trait]
pub trait VisionProvider: Send + Sync + 'static {
    /// Display name (e.g. "Groq")
    fn name(&self) -> &str;

    /// Send the request and return the text of the first choice.
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, ProviderError>;
}
