use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::gate::{AccessGate, Decision, DenyReason, SubscriptionChecker};
use crate::quota::QuotaStore;

use super::reply;

/// Media types the bot accepts for conversion.
const SUPPORTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "image/jpeg",
    "image/png",
    "video/mp4",
    "audio/mpeg",
];

#[derive(Debug, Error)]
#[error("conversion failed: {0}")]
pub struct ConvertError(#[from] pub anyhow::Error);

#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(#[from] pub anyhow::Error);

/// A file as received from the messaging layer.
#[derive(Debug, Clone)]
pub struct IncomingDocument {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A converted file ready to send back.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// One inbound message carrying an (optional) document to convert.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub user_id: i64,
    pub document: Option<IncomingDocument>,
}

/// Opaque format-conversion routine, file in, file out.
pub trait Converter: Send + Sync {
    fn convert(
        &self,
        input: &IncomingDocument,
    ) -> impl Future<Output = Result<ConvertedFile, ConvertError>> + Send;
}

/// Sends replies and documents back to the requester. Whether the document
/// send succeeds decides whether quota is spent.
pub trait Delivery: Send + Sync {
    fn send_document(
        &self,
        user_id: i64,
        file: &ConvertedFile,
        caption: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    fn send_text(
        &self,
        user_id: i64,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

impl<T: Delivery> Delivery for Arc<T> {
    fn send_document(
        &self,
        user_id: i64,
        file: &ConvertedFile,
        caption: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
        (**self).send_document(user_id, file, caption)
    }

    fn send_text(
        &self,
        user_id: i64,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
        (**self).send_text(user_id, text)
    }
}

/// How a request ended, as seen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Refused by the access gate before any conversion work.
    Denied(DenyReason),
    /// The message carried no usable document; nothing was converted.
    Rejected,
    /// Converted and delivered; one unit of quota was consumed.
    Delivered,
    /// Conversion or delivery failed; quota was not consumed.
    Failed,
}

/// Per-request pipeline around the access gate: authorize, convert,
/// deliver, and only then consume quota. One pass per request, no retries.
pub struct Dispatcher<S, C, D> {
    gate: AccessGate<S>,
    quota: Arc<QuotaStore>,
    converter: C,
    delivery: D,
    channel_username: String,
}

impl<S, C, D> Dispatcher<S, C, D>
where
    S: SubscriptionChecker,
    C: Converter,
    D: Delivery,
{
    pub fn new(
        gate: AccessGate<S>,
        quota: Arc<QuotaStore>,
        converter: C,
        delivery: D,
        channel_username: String,
    ) -> Self {
        Self {
            gate,
            quota,
            converter,
            delivery,
            channel_username,
        }
    }

    /// `/start` greeting: subscription-gated, does not touch quota.
    pub async fn handle_start(&self, user_id: i64) {
        let text = match self.gate.authorize(user_id).await {
            Decision::Denied(DenyReason::NotSubscribed) => {
                reply::subscribe_prompt(&self.channel_username)
            }
            _ => reply::welcome(self.quota.limit()),
        };
        self.reply(user_id, &text).await;
    }

    pub async fn handle(&self, request: ConversionRequest) -> RequestOutcome {
        let user_id = request.user_id;

        match self.gate.authorize(user_id).await {
            Decision::Allowed => {}
            Decision::Denied(reason) => {
                let text = match reason {
                    DenyReason::NotSubscribed => reply::subscribe_prompt(&self.channel_username),
                    DenyReason::QuotaExhausted => {
                        reply::quota_exhausted(&self.channel_username, self.quota.limit())
                    }
                };
                self.reply(user_id, &text).await;
                return RequestOutcome::Denied(reason);
            }
        }

        let Some(document) = request.document else {
            self.reply(user_id, reply::missing_document()).await;
            return RequestOutcome::Rejected;
        };

        if !SUPPORTED_MIME_TYPES.contains(&document.mime_type.as_str()) {
            self.reply(user_id, reply::unsupported_file()).await;
            return RequestOutcome::Rejected;
        }

        let converted = match self.converter.convert(&document).await {
            Ok(file) => file,
            Err(err) => {
                error!(user_id, error = %err, "conversion failed");
                self.reply(user_id, reply::conversion_failed()).await;
                return RequestOutcome::Failed;
            }
        };

        if let Err(err) = self
            .delivery
            .send_document(user_id, &converted, "Done!")
            .await
        {
            error!(user_id, error = %err, "failed to deliver converted file");
            self.reply(user_id, reply::conversion_failed()).await;
            return RequestOutcome::Failed;
        }

        // Quota is spent only on a fully delivered conversion, so a failed
        // conversion never costs the user an attempt.
        self.quota.consume(user_id);
        info!(user_id, file = %converted.file_name, "conversion delivered");
        RequestOutcome::Delivered
    }

    async fn reply(&self, user_id: i64, text: &str) {
        if let Err(err) = self.delivery.send_text(user_id, text).await {
            warn!(user_id, error = %err, "failed to send reply");
        }
    }
}
