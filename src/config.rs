//! Controller configuration.
//!
//! One flat struct with production defaults. Hosts that embed the
//! controller override fields before handing the config to
//! [`SessionController::new`](crate::session::controller::SessionController::new).

use crate::channel::SERVICE_UUID;

/// Static configuration for one controller instance.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// 128-bit service UUID used to filter discovery advertisements.
    pub service_uuid: u128,
    /// Cloud endpoint receiving relayed device uploads.
    pub relay_url: String,
    /// Pre-shared key injected into every relayed payload as `apiKey`.
    pub relay_api_key: String,
    /// Transport marker injected into every relayed payload as
    /// `connectionType`.
    pub connection_type: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            service_uuid: SERVICE_UUID,
            relay_url: "https://api.fieldsense.io/v1/readings".into(),
            relay_api_key: "fs-relay-7f3a91d2c04b".into(),
            connection_type: "app-ble".into(),
        }
    }
}
