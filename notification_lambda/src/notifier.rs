use aws_lambda_events::event::sqs::SqsEvent;
use serde_json::Value;
use thiserror::Error;
use types::{VideoRecord, WorkflowStatus, keys};
use vod_app::error_handler::ErrorSink;

use crate::api::{Delivery, NotificationApi, TransportError};
use crate::payload::{self, TargetError};
use crate::queue::{
    AcknowledgmentError, MessageReceipt, QueueAcknowledger, QueueMessage,
};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("workflow for {guid} is not complete: {status}")]
    WorkflowIncomplete { guid: String, status: String },
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),
    #[error("notification transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to acknowledge messages: {0}")]
    Acknowledgment(#[from] AcknowledgmentError),
}

fn parse_body(message: &QueueMessage) -> Result<VideoRecord, NotificationError> {
    let body = message.body.as_deref().ok_or_else(|| {
        NotificationError::MalformedMessage(format!(
            "message {} has no body",
            message.message_id
        ))
    })?;

    serde_json::from_str(body).map_err(|e| {
        NotificationError::MalformedMessage(format!(
            "message {}: {}",
            message.message_id, e
        ))
    })
}

/// Scrubs `record` and sends it to the API on behalf of its owner.
async fn deliver<A: NotificationApi>(
    api: &A,
    mut record: VideoRecord,
) -> Result<Delivery, NotificationError> {
    let target = payload::prepare(&mut record)?;

    Ok(api.notify(&target, &record).await?)
}

/// Notifies the API about every completed workflow in `messages` and removes
/// the accepted ones from the queue.
///
/// A message that cannot be parsed or whose workflow is not complete aborts
/// the batch without deleting anything, so the whole batch is redelivered.
/// Any other failure only skips its own message, which stays on the queue.
pub async fn process_batch<A: NotificationApi, Q: QueueAcknowledger>(
    api: &A,
    queue: &Q,
    messages: &[QueueMessage],
) -> Result<Vec<MessageReceipt>, NotificationError> {
    let mut delivered = Vec::new();

    for message in messages {
        let record = parse_body(message)?;

        if record.workflow_status() != Some(WorkflowStatus::Complete) {
            return Err(NotificationError::WorkflowIncomplete {
                guid: record.guid().unwrap_or_default().to_string(),
                status: record
                    .get_str(keys::WORKFLOW_STATUS)
                    .unwrap_or("missing")
                    .to_string(),
            });
        }

        match deliver(api, record).await {
            Ok(Delivery::Accepted) => delivered.push(message.receipt()),
            Ok(Delivery::Rejected(body)) => {
                tracing::warn!(
                    "Could not fetch data from API: {} :: {}",
                    message.message_id,
                    body
                );
            }
            Err(e) => {
                tracing::error!(
                    "skipping message {}: {}",
                    message.message_id,
                    e
                );
            }
        }
    }

    if !delivered.is_empty() {
        queue.delete_batch(&delivered).await?;
    }

    Ok(delivered)
}

/// Runs [`process_batch`] over an SQS event and reports any failure to
/// `errors` before returning it.
pub async fn handle<A: NotificationApi, Q: QueueAcknowledger, E: ErrorSink>(
    api: &A,
    queue: &Q,
    errors: &E,
    event: Value,
) -> Result<Value, NotificationError> {
    tracing::info!("REQUEST: {}", event);

    let result = match serde_json::from_value::<SqsEvent>(event.clone()) {
        Ok(sqs_event) => {
            let messages: Vec<QueueMessage> = sqs_event
                .records
                .into_iter()
                .map(QueueMessage::from)
                .collect();
            process_batch(api, queue, &messages).await
        }
        Err(e) => Err(NotificationError::MalformedMessage(e.to_string())),
    };

    match result {
        Ok(delivered) => {
            tracing::info!("delivered {} notifications", delivered.len());
            Ok(event)
        }
        Err(e) => {
            tracing::error!("failed to process notifications: {}", e);
            errors.report(&event, &e.to_string()).await;
            Err(e)
        }
    }
}
