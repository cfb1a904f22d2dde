use crate::error::AppError;
use base64::{engine::general_purpose, Engine as _};

/// Validate an upload's declared content type and return its bare media type.
///
/// `"image/PNG; name=x"` becomes `"image/png"`. Anything not starting with `image/` is rejected.
pub fn image_media_type(content_type: Option<&str>) -> Result<String, AppError> {
    let content_type = content_type.unwrap_or_default();

    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if !media_type.starts_with("image/") {
        return Err(AppError::InvalidInput("Must be an image".to_string()));
    }
    Ok(media_type)
}

/// Encode raw image bytes as a base64 data URL (`data:<mime>;base64,<data>`)
pub fn encode_data_url(data: &[u8], media_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        general_purpose::STANDARD.encode(data)
    )
}

/// Reject uploads with no payload
pub fn validate_image_bytes(data: &[u8]) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded image is empty".to_string()));
    }
    Ok(())
}
