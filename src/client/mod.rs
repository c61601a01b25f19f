// File: ./src/client/mod.rs
pub mod cert;
pub mod core;
pub mod middleware;

use crate::error::FetchError;
use crate::model::record::DeadlineRecord;
use std::future::Future;

pub use crate::client::core::{RemoteClient, decode_payload};

/// Anything that can deliver the dynamic deadline records of a render cycle.
pub trait DeadlineSource: Send + Sync {
    fn fetch_deadlines(
        &self,
    ) -> impl Future<Output = Result<Vec<DeadlineRecord>, FetchError>> + Send;
}
