use thiserror::Error;
use types::{VideoRecord, keys};
use vod_app::error_handler::ErrorSink;

use crate::media_info::{self, MediaInfoError};
use crate::profile::{self, Source};
use crate::store::{MetadataStore, StoreError};

#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("event has no guid")]
    MissingGuid,
    #[error("no metadata stored for guid {0}")]
    NotFound(String),
    #[error("malformed media info: {0}")]
    MalformedMetadata(#[from] MediaInfoError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Merges the stored metadata for the incoming guid into `incoming`.
async fn load<S: MetadataStore>(
    store: &S,
    incoming: VideoRecord,
) -> Result<VideoRecord, ProfilerError> {
    let guid = incoming.guid().ok_or(ProfilerError::MissingGuid)?.to_string();

    let stored = store
        .get(&guid)
        .await?
        .ok_or_else(|| ProfilerError::NotFound(guid.clone()))?;

    Ok(VideoRecord::merge(incoming, stored))
}

/// Adds source dimensions, encoding profile, frame capture size and job
/// template to a merged record.
fn enrich(mut record: VideoRecord) -> Result<VideoRecord, ProfilerError> {
    let dimensions = media_info::parse(record.get_str(keys::SRC_MEDIAINFO))?;
    record.insert(keys::SRC_HEIGHT, dimensions.height);
    record.insert(keys::SRC_WIDTH, dimensions.width);
    record.insert(keys::SRC_ROTATION, dimensions.rotation);

    let source = Source {
        height: dimensions.height,
        width: dimensions.width,
        rotation: dimensions.rotation,
        input_rotate: record.input_rotate(),
    };

    let decision =
        profile::decide(&source, record.get_bool(keys::FRAME_CAPTURE));

    record.insert(keys::ENCODING_PROFILE, decision.profile.height());

    if let Some((height, width)) = decision.frame_capture {
        record.insert(keys::FRAME_CAPTURE_HEIGHT, height);
        record.insert(keys::FRAME_CAPTURE_WIDTH, width);
    }

    if record.job_template().is_some() {
        record.insert(keys::IS_CUSTOM_TEMPLATE, true);
    } else {
        let template_key = decision.profile.template_key(decision.rotated);

        match record.get_str(template_key).map(str::to_string) {
            Some(template) => {
                tracing::info!("Chosen template: {}", template);
                record.insert(keys::JOB_TEMPLATE, template);
            }
            None => {
                tracing::warn!("no job template configured in {}", template_key);
                record.remove(keys::JOB_TEMPLATE);
            }
        }

        record.insert(keys::IS_CUSTOM_TEMPLATE, false);
    }

    Ok(record)
}

/// Enriches `event` with its stored metadata and the encoding decision,
/// reporting any failure to `errors` before returning it. Once the stored
/// metadata is merged in, the merged record is what gets reported.
pub async fn handle<S: MetadataStore, E: ErrorSink>(
    store: &S,
    errors: &E,
    event: VideoRecord,
) -> Result<VideoRecord, ProfilerError> {
    tracing::info!(
        "REQUEST: {}",
        serde_json::to_string(&event).unwrap_or_default()
    );

    let reported = serde_json::Value::from(event.clone());

    let result = match load(store, event).await {
        Ok(merged) => {
            let reported = serde_json::Value::from(merged.clone());
            enrich(merged).map_err(|e| (reported, e))
        }
        Err(e) => Err((reported, e)),
    };

    match result {
        Ok(record) => {
            tracing::info!(
                "RESPONSE: {}",
                serde_json::to_string(&record).unwrap_or_default()
            );
            Ok(record)
        }
        Err((reported, e)) => {
            tracing::error!("failed to resolve profile: {}", e);
            errors.report(&reported, &e.to_string()).await;
            Err(e)
        }
    }
}
