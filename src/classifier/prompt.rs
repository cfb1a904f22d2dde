use crate::{
    config::ProviderConfig,
    error::AppError,
    image_utils,
    models::openai::{ChatCompletionRequest, ChatMessage, ContentBlock, ImageUrl, MessageContent},
};

/// Instruction sent alongside every image
pub const CLASSIFICATION_PROMPT: &str = r#"You are a waste expert. Classify the image into:
Plastic, Paper, Metal, Glass, Organic, Other

Return ONLY JSON:
{
  "class": "Plastic",
  "confidence": 0.95,
  "reasoning": "Clear plastic bottle with label"
}
"#;

/// Prompt used by the connectivity probe
pub const PROBE_PROMPT: &str = "Hi";

/// Build the multimodal classification request for one uploaded image.
///
/// Fails with `InvalidInput` when the content type is not `image/*` or the payload is
/// empty; nothing is sent in that case.
pub fn build_classification_request(
    image: &[u8],
    content_type: Option<&str>,
    settings: &ProviderConfig,
) -> Result<ChatCompletionRequest, AppError> {
    let media_type = image_utils::image_media_type(content_type)?;
    image_utils::validate_image_bytes(image)?;

    let content = MessageContent::Blocks(vec![
        ContentBlock::Text {
            text: CLASSIFICATION_PROMPT.to_string(),
        },
        ContentBlock::ImageUrl {
            image_url: ImageUrl {
                url: image_utils::encode_data_url(image, &media_type),
            },
        },
    ]);

    Ok(ChatCompletionRequest {
        model: settings.vision_model.clone(),
        messages: vec![ChatMessage::user(content)],
        max_tokens: Some(settings.max_tokens),
        temperature: Some(settings.temperature),
    })
}

/// Build the trivial text-only request used by `GET /test`
pub fn build_probe_request(settings: &ProviderConfig) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: settings.probe_model.clone(),
        messages: vec![ChatMessage::user(MessageContent::Text(
            PROBE_PROMPT.to_string(),
        ))],
        max_tokens: Some(settings.probe_max_tokens),
        temperature: None,
    }
}
