use crate::{
    classifier::{build_classification_request, interpret, ClassificationResult},
    error::AppError,
    handlers::AppState,
    image_utils, metrics,
};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

struct Upload {
    content_type: Option<String>,
    bytes: Bytes,
}

/// Handle `POST /classify`
///
/// Non-image uploads are rejected with 400 before the provider is called. Any provider
/// failure becomes a 500 "AI Error"; a malformed model reply never does.
pub async fn handle_classify(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassificationResult>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let upload = read_upload(&mut multipart)
        .await
        .and_then(|upload| {
            let request = build_classification_request(
                &upload.bytes,
                upload.content_type.as_deref(),
                &state.settings,
            )?;
            Ok((upload, request))
        })
        .inspect_err(|_| metrics::record_rejected_upload());
    let (upload, request) = upload?;

    tracing::info!(
        request_id = %request_id,
        content_type = upload.content_type.as_deref().unwrap_or_default(),
        size_bytes = upload.bytes.len(),
        model = %state.settings.vision_model,
        "Handling classification request"
    );

    let reply = state.provider.complete(request).await.map_err(|e| {
        metrics::record_upstream_error(e.kind());
        AppError::from(e)
    })?;

    let interpretation = interpret(&reply);
    let result = state
        .pricing
        .resolve(&interpretation.classification, &state.settings.vision_model);

    metrics::record_classification(
        interpretation.classification.category.as_str(),
        result.recyclable,
        interpretation.tier.as_str(),
        start.elapsed(),
    );

    tracing::info!(
        request_id = %request_id,
        category = %interpretation.classification.category,
        tier = interpretation.tier.as_str(),
        confidence = result.confidence,
        price_per_kg = result.price_per_kg,
        duration_ms = start.elapsed().as_millis(),
        "Completed classification request"
    );

    Ok(Json(result))
}

/// Find the upload field, checking its content type before reading the body
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        image_utils::image_media_type(content_type.as_deref())?;

        let bytes = field.bytes().await?;
        return Ok(Upload {
            content_type,
            bytes,
        });
    }

    Err(AppError::InvalidInput(format!(
        "Missing '{}' field in upload",
        UPLOAD_FIELD
    )))
}
