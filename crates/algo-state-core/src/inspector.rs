/// Fetches application state from algod and decodes it
use crate::address::decode_address;
use crate::boxes::BoxEntry;
use crate::client::AlgodClient;
use crate::config::NodeConfig;
use crate::decoder::{decode_base64, decode_state};
use crate::error::NodeError;
use crate::types::*;
use chrono::Utc;
use tracing::debug;

/// State inspector for reading global, local and box state of an application
pub struct StateInspector {
    client: AlgodClient,
}

impl StateInspector {
    pub fn new(client: AlgodClient) -> Self {
        Self { client }
    }

    /// Create inspector connected to the local sandbox
    pub fn sandbox() -> Self {
        Self::new(AlgodClient::sandbox())
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(AlgodClient::from_config(config))
    }

    pub fn client(&self) -> &AlgodClient {
        &self.client
    }

    /// Decoded global state of an application
    pub async fn global_state(&self, app_id: u64, raw: bool) -> Result<DecodedState, NodeError> {
        let info = self.client.application_info(app_id).await?;
        Ok(decode_state(&info.params.global_state, raw)?)
    }

    /// Decoded local state of an account opted into an application.
    /// An account that is not opted in yields `NotFound`.
    pub async fn local_state(
        &self,
        address: &str,
        app_id: u64,
        raw: bool,
    ) -> Result<DecodedState, NodeError> {
        decode_address(address)?;
        let info = self.client.account_application_info(address, app_id).await?;
        let local = info.app_local_state.ok_or_else(|| {
            NodeError::NotFound(format!(
                "account {} has no local state for application {}",
                address, app_id
            ))
        })?;
        Ok(decode_state(&local.key_value, raw)?)
    }

    pub async fn box_entry(&self, app_id: u64, name: &[u8]) -> Result<BoxEntry, NodeError> {
        let response = self.client.application_box_by_name(app_id, name).await?;
        Ok(BoxEntry::from_response(&response)?)
    }

    /// Raw names of all boxes of an application
    pub async fn box_names(&self, app_id: u64) -> Result<Vec<Vec<u8>>, NodeError> {
        let response = self.client.application_boxes(app_id).await?;
        let names = response
            .boxes
            .iter()
            .map(|b| decode_base64(&b.name, "box name"))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(app_id, boxes = names.len(), "listed boxes");
        Ok(names)
    }

    /// Global state together with creator and fetch time
    pub async fn snapshot(&self, app_id: u64, raw: bool) -> Result<AppSnapshot, NodeError> {
        let info = self.client.application_info(app_id).await?;
        let global = decode_state(&info.params.global_state, raw)?;

        Ok(AppSnapshot {
            app_id: info.id,
            creator: info.params.creator,
            fetched_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            global,
        })
    }
}
