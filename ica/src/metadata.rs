//! ICS-27 channel version metadata.

use interstake_types::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::IcaError;

/// The JSON document carried as the channel version when opening an
/// interchain account channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcaMetadata {
    pub version: String,
    pub controller_connection_id: ConnectionId,
    /// Filled in by the host during the handshake.
    #[serde(default)]
    pub address: String,
    pub encoding: String,
    pub tx_type: String,
}

impl IcaMetadata {
    pub const ENCODING_PROTO3: &'static str = "proto3";
    pub const TX_TYPE_SDK_MULTI_MSG: &'static str = "sdk_multi_msg";

    pub fn new(version: impl Into<String>, controller_connection_id: ConnectionId) -> Self {
        Self {
            version: version.into(),
            controller_connection_id,
            address: String::new(),
            encoding: Self::ENCODING_PROTO3.to_string(),
            tx_type: Self::TX_TYPE_SDK_MULTI_MSG.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, IcaError> {
        serde_json::to_string(self).map_err(|e| IcaError::Metadata(e.to_string()))
    }
}
