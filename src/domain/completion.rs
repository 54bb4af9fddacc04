use super::status::TransactionStatus;
use crate::error::Result;
use serde::Serialize;
use url::Url;

pub const DEEP_LINK_BASE: &str = "bematore://payment/complete";
pub const COMPLETION_MESSAGE_TYPE: &str = "payment_complete";

/// Payload handed to the host app when the user finishes on the status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionPayload {
    pub transaction_id: String,
    pub status: TransactionStatus,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    transaction_id: &'a str,
    status: TransactionStatus,
}

impl CompletionPayload {
    pub fn new(transaction_id: impl Into<String>, status: TransactionStatus) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status,
        }
    }

    /// JSON string posted over a host message channel.
    pub fn to_message(&self) -> Result<String> {
        let message = CompletionMessage {
            kind: COMPLETION_MESSAGE_TYPE,
            transaction_id: &self.transaction_id,
            status: self.status,
        };
        Ok(serde_json::to_string(&message)?)
    }

    pub fn to_deep_link(&self) -> Result<Url> {
        let mut url = Url::parse(DEEP_LINK_BASE)?;
        url.query_pairs_mut()
            .append_pair("transaction_id", &self.transaction_id)
            .append_pair("status", self.status.as_str());
        Ok(url)
    }
}
