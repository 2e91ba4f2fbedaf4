pub mod client;
pub mod models;

pub use client::{ApiConfig, Endpoints, HttpEhrClient};
pub use models::{CreateKind, CreateRequest, ListKind, OrderRecord, RemoteAck, VitalSign};

use crate::error::DeskError;
use serde_json::Value;

/// Remote EHR operations used by the desk.
///
/// Implementations are called from worker threads.
pub trait EhrApi: Send + Sync {
    /// Create an entity. Errors carry the server message when there is one.
    fn create(&self, request: &CreateRequest) -> Result<RemoteAck, DeskError>;

    /// Read the raw records of a list for a patient.
    fn fetch(&self, list: ListKind, patient: &str) -> anyhow::Result<Vec<Value>>;

    /// Whether lists are read from a server. The desk skips list loads
    /// when this is `false`.
    fn is_remote(&self) -> bool {
        true
    }
}

/// Backend used when no server is configured: creates succeed locally and
/// there is nothing to read.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineApi;

impl EhrApi for OfflineApi {
    fn create(&self, request: &CreateRequest) -> Result<RemoteAck, DeskError> {
        tracing::info!("offline: {} kept locally", request.kind.label());
        Ok(RemoteAck::default())
    }

    fn fetch(&self, _list: ListKind, _patient: &str) -> anyhow::Result<Vec<Value>> {
        Ok(Vec::new())
    }

    fn is_remote(&self) -> bool {
        false
    }
}
