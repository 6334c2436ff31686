//! JSON-RPC 2.0 envelope shapes and the fixed method-name table. Decoding
//! the incoming envelope (and distinguishing a request from a malformed
//! notification) is the communicator's job (`nexus-core`); this module only
//! owns the values that travel on the wire.

use serde::Serialize;

/// The only API version this agent advertises. No negotiation exists.
pub const API_VERSION: u32 = 1;

/// Exactly the method names the communicator recognizes (§4.4).
pub mod method {
    pub const GET_API_VERSION: &str = "getApiVersionAsync";
    pub const SET_CONTEXT: &str = "setContextAsync";
    pub const GET_CATALOG_REGISTRATIONS: &str = "getCatalogRegistrationsAsync";
    pub const GET_CATALOG: &str = "getCatalogAsync";
    pub const GET_TIME_RANGE: &str = "getTimeRangeAsync";
    pub const GET_AVAILABILITY: &str = "getAvailabilityAsync";
    pub const READ_SINGLE: &str = "readSingleAsync";
    pub const CANCEL_REQUEST: &str = "$/cancelRequest";
    pub const PROGRESS: &str = "$/progress";
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseOk {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    pub result: serde_json::Value,
}

impl ResponseOk {
    pub fn new(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0", id, result }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseErr {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    pub error: RpcError,
}

impl ResponseErr {
    /// Every per-call error in this protocol uses the fixed code `-1`.
    pub fn new(id: serde_json::Value, message: impl Into<String>) -> Self {
        Self { jsonrpc: "2.0", id, error: RpcError { code: -1, message: message.into() } }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Vec<serde_json::Value>,
}

impl Notification {
    pub fn log(level_name: &str, message: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "log",
            params: vec![
                serde_json::Value::String(level_name.to_owned()),
                serde_json::Value::String(message.to_owned()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_ok_serializes_with_jsonrpc_and_echoed_id() {
        let resp = ResponseOk::new(serde_json::json!(1), serde_json::json!({"apiVersion": 1}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert_eq!(value["result"]["apiVersion"], 1);
    }

    #[test]
    fn response_err_uses_fixed_code() {
        let resp = ResponseErr::new(serde_json::json!(2), "Unknown method 'frobnicate'.");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["error"]["code"], -1);
        assert_eq!(value["error"]["message"], "Unknown method 'frobnicate'.");
    }

    #[test]
    fn log_notification_has_no_id_field() {
        let note = Notification::log("Information", "hi");
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "log");
        assert_eq!(value["params"][0], "Information");
    }
}
