use aws_lambda_events::event::sqs::SqsMessage;
use aws_sdk_sqs::{
    Client as SqsClient,
    types::{BatchResultErrorEntry, DeleteMessageBatchRequestEntry},
};
use thiserror::Error;

/// SQS accepts at most this many entries per `DeleteMessageBatch` call.
const DELETE_BATCH_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum AcknowledgmentError {
    #[error("invalid delete entry: {0}")]
    InvalidEntry(String),
    #[error("SQS error: {0}")]
    Sqs(String),
}

/// A received queue message, reduced to what the notifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: Option<String>,
}

impl From<SqsMessage> for QueueMessage {
    fn from(message: SqsMessage) -> Self {
        Self {
            message_id: message.message_id.unwrap_or_default(),
            receipt_handle: message.receipt_handle.unwrap_or_default(),
            body: message.body,
        }
    }
}

impl QueueMessage {
    #[must_use]
    pub fn receipt(&self) -> MessageReceipt {
        MessageReceipt {
            id: self.message_id.clone(),
            receipt_handle: self.receipt_handle.clone(),
        }
    }
}

/// Identifies a delivered message to delete from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceipt {
    pub id: String,
    pub receipt_handle: String,
}

/// Removal of processed messages from the notification queue.
pub trait QueueAcknowledger {
    fn delete_batch(
        &self,
        receipts: &[MessageReceipt],
    ) -> impl Future<Output = Result<(), AcknowledgmentError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqsAcknowledger {
    client: SqsClient,
    queue_url: String,
}

impl SqsAcknowledger {
    #[must_use]
    pub const fn new(client: SqsClient, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

/// Builds the `DeleteMessageBatch` entries for `receipts`, one batch per
/// call SQS will accept.
pub fn delete_requests(
    receipts: &[MessageReceipt],
) -> Result<Vec<Vec<DeleteMessageBatchRequestEntry>>, AcknowledgmentError> {
    receipts
        .chunks(DELETE_BATCH_LIMIT)
        .map(|chunk| {
            chunk
                .iter()
                .map(|receipt| {
                    DeleteMessageBatchRequestEntry::builder()
                        .id(&receipt.id)
                        .receipt_handle(&receipt.receipt_handle)
                        .build()
                        .map_err(|e| {
                            AcknowledgmentError::InvalidEntry(e.to_string())
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// Logs the entries SQS could not delete and returns how many there were.
/// They are left for the queue to redeliver.
fn warn_failed(failed: &[BatchResultErrorEntry]) -> usize {
    for entry in failed {
        tracing::warn!(
            "failed to delete message {}: {} {}",
            entry.id(),
            entry.code(),
            entry.message().unwrap_or_default()
        );
    }

    failed.len()
}

impl QueueAcknowledger for SqsAcknowledger {
    async fn delete_batch(
        &self,
        receipts: &[MessageReceipt],
    ) -> Result<(), AcknowledgmentError> {
        for entries in delete_requests(receipts)? {
            let requested = entries.len();

            let output = self
                .client
                .delete_message_batch()
                .queue_url(&self.queue_url)
                .set_entries(Some(entries))
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        "SQS DeleteMessageBatch error for {}: {:?}",
                        self.queue_url,
                        e
                    );
                    AcknowledgmentError::Sqs(e.to_string())
                })?;

            let failed = warn_failed(output.failed());

            tracing::info!(
                "deleted {} of {} messages",
                requested.saturating_sub(failed),
                requested
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lambda_events::event::sqs::SqsEvent;
    use serde_json::json;

    #[test]
    fn test_messages_from_sqs_event() {
        let event: SqsEvent = serde_json::from_value(json!({
            "Records": [
                {
                    "messageId": "12345",
                    "receiptHandle": "AQEB5+CQNlfA2LTbo",
                    "body": "{\"guid\":\"abc\"}",
                    "attributes": {},
                    "messageAttributes": {},
                    "md5OfBody": "7f6ab085437ec9c741dd96152b5177b3",
                    "eventSource": "aws:sqs",
                    "eventSourceARN": "arn:aws:sqs:us-east-1:123456789012:notify",
                    "awsRegion": "us-east-1"
                }
            ]
        }))
        .unwrap();

        let messages: Vec<QueueMessage> =
            event.records.into_iter().map(QueueMessage::from).collect();

        assert_eq!(
            messages,
            vec![QueueMessage {
                message_id: "12345".to_string(),
                receipt_handle: "AQEB5+CQNlfA2LTbo".to_string(),
                body: Some("{\"guid\":\"abc\"}".to_string()),
            }]
        );
        assert_eq!(
            messages[0].receipt(),
            MessageReceipt {
                id: "12345".to_string(),
                receipt_handle: "AQEB5+CQNlfA2LTbo".to_string(),
            }
        );
    }

    fn receipts(count: usize) -> Vec<MessageReceipt> {
        (0..count)
            .map(|i| MessageReceipt {
                id: format!("m{i}"),
                receipt_handle: format!("m{i}-handle"),
            })
            .collect()
    }

    #[test]
    fn test_delete_requests_chunk_sizes() {
        for (count, expected) in [
            (0, vec![]),
            (1, vec![1]),
            (10, vec![10]),
            (11, vec![10, 1]),
            (25, vec![10, 10, 5]),
        ] {
            let sizes: Vec<usize> = delete_requests(&receipts(count))
                .unwrap()
                .iter()
                .map(Vec::len)
                .collect();

            assert_eq!(sizes, expected, "{count} receipts");
        }
    }

    #[test]
    fn test_delete_requests_keep_order_and_handles() {
        let requests = delete_requests(&receipts(11)).unwrap();

        assert_eq!(requests[0][0].id(), "m0");
        assert_eq!(requests[0][0].receipt_handle(), "m0-handle");
        assert_eq!(requests[1][0].id(), "m10");
        assert_eq!(requests[1][0].receipt_handle(), "m10-handle");
    }

    #[test]
    fn test_warn_failed_counts_entries() {
        let failed = vec![
            BatchResultErrorEntry::builder()
                .id("m3")
                .code("ReceiptHandleIsInvalid")
                .sender_fault(true)
                .build()
                .unwrap(),
        ];

        assert_eq!(warn_failed(&failed), 1);
        assert_eq!(warn_failed(&[]), 0);
    }
}
