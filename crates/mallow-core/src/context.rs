//! Request-scoped data types.
//!
//! [`RequestId`] identifies a request in logs and error envelopes.
//! [`Payloads`] is the typed record through which the deserialization stage
//! hands the decoded body to the handler, and the handler hands its result to
//! the serialization stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Default name of the inbound slot.
pub const DEFAULT_INBOUND_KEY: &str = "json";

/// Default name of the outbound slot.
pub const DEFAULT_OUTBOUND_KEY: &str = "result";

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use mallow_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The inbound and outbound payload slots of one request.
///
/// Each slot has a configurable name (`json` and `result` by default) so
/// handlers that address the slots by name keep working when the names are
/// changed in configuration.
///
/// # Example
///
/// ```
/// use mallow_core::Payloads;
/// use serde_json::json;
///
/// let mut payloads = Payloads::new();
/// payloads.set_outbound(json!({"id": 12}));
///
/// assert_eq!(payloads.get("result"), Some(&json!({"id": 12})));
/// assert!(payloads.get("json").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Payloads {
    inbound_key: String,
    outbound_key: String,
    inbound: Option<Value>,
    outbound: Option<Value>,
}

impl Payloads {
    /// Creates empty slots with the default names.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keys(DEFAULT_INBOUND_KEY, DEFAULT_OUTBOUND_KEY)
    }

    /// Creates empty slots with custom names.
    #[must_use]
    pub fn with_keys(inbound_key: impl Into<String>, outbound_key: impl Into<String>) -> Self {
        Self {
            inbound_key: inbound_key.into(),
            outbound_key: outbound_key.into(),
            inbound: None,
            outbound: None,
        }
    }

    /// Renames both slots, keeping their contents.
    pub fn rename(&mut self, inbound_key: &str, outbound_key: &str) {
        if self.inbound_key != inbound_key {
            self.inbound_key = inbound_key.to_string();
        }
        if self.outbound_key != outbound_key {
            self.outbound_key = outbound_key.to_string();
        }
    }

    /// Returns the name of the inbound slot.
    #[must_use]
    pub fn inbound_key(&self) -> &str {
        &self.inbound_key
    }

    /// Returns the name of the outbound slot.
    #[must_use]
    pub fn outbound_key(&self) -> &str {
        &self.outbound_key
    }

    /// Returns the deserialized request body, if any.
    #[must_use]
    pub fn inbound(&self) -> Option<&Value> {
        self.inbound.as_ref()
    }

    /// Stores the deserialized request body.
    pub fn set_inbound(&mut self, value: Value) {
        self.inbound = Some(value);
    }

    /// Removes and returns the deserialized request body.
    pub fn take_inbound(&mut self) -> Option<Value> {
        self.inbound.take()
    }

    /// Returns the handler result awaiting serialization, if any.
    #[must_use]
    pub fn outbound(&self) -> Option<&Value> {
        self.outbound.as_ref()
    }

    /// Stores the handler result to be serialized into the response.
    pub fn set_outbound(&mut self, value: Value) {
        self.outbound = Some(value);
    }

    /// Removes and returns the handler result.
    pub fn take_outbound(&mut self) -> Option<Value> {
        self.outbound.take()
    }

    /// Looks a slot up by its configured name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key == self.inbound_key {
            self.inbound()
        } else if key == self.outbound_key {
            self.outbound()
        } else {
            None
        }
    }
}

impl Default for Payloads {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_request_id_display() {
        let uuid = Uuid::now_v7();
        let id = RequestId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_payloads_start_empty() {
        let payloads = Payloads::new();
        assert!(payloads.inbound().is_none());
        assert!(payloads.outbound().is_none());
        assert_eq!(payloads.inbound_key(), "json");
        assert_eq!(payloads.outbound_key(), "result");
    }

    #[test]
    fn test_payloads_lookup_by_custom_key() {
        let mut payloads = Payloads::with_keys("body", "reply");
        payloads.set_inbound(json!({"name": "Camus"}));
        payloads.set_outbound(json!([1, 2, 3]));

        assert_eq!(payloads.get("body"), Some(&json!({"name": "Camus"})));
        assert_eq!(payloads.get("reply"), Some(&json!([1, 2, 3])));
        assert!(payloads.get("json").is_none());
        assert!(payloads.get("result").is_none());
    }

    #[test]
    fn test_payloads_rename_keeps_values() {
        let mut payloads = Payloads::new();
        payloads.set_inbound(json!(1));
        payloads.rename("body", "reply");

        assert_eq!(payloads.get("body"), Some(&json!(1)));
        assert_eq!(payloads.outbound_key(), "reply");
    }

    #[test]
    fn test_payloads_take() {
        let mut payloads = Payloads::new();
        payloads.set_outbound(json!("done"));

        assert_eq!(payloads.take_outbound(), Some(json!("done")));
        assert!(payloads.outbound().is_none());
        assert!(payloads.take_inbound().is_none());
    }
}
