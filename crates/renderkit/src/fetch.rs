//! Simulated data sources for demo pages

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Payload returned by a page's content-fetch callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Content-fetch callback - the only data boundary for a page
///
/// The demo sources below return constants or timestamped strings; a real
/// data source (API call, database query) would replace them without
/// changing the freshness policy.
pub type FetchFn = Arc<dyn Fn() -> BoxFuture<'static, Result<Message>> + Send + Sync>;

/// Fetch callback returning a fixed message
pub fn static_message(text: impl Into<String>) -> FetchFn {
    let text = text.into();
    Arc::new(move || {
        let message = Message::new(text.clone());
        Box::pin(async move { Ok(message) })
    })
}

/// Fetch callback stamping each message with the fetch time
///
/// The timestamp makes regeneration visible: every invocation produces a
/// different message.
pub fn timestamped_message(prefix: impl Into<String>) -> FetchFn {
    let prefix = prefix.into();
    Arc::new(move || {
        let prefix = prefix.clone();
        Box::pin(async move {
            let timestamp = Utc::now().to_rfc3339();
            Ok(Message::new(format!("{} Timestamp: {}", prefix, timestamp)))
        })
    })
}
