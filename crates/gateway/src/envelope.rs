use serde::{Deserialize, Serialize};

/// The two-field response body returned for every request.
///
/// Wire compatibility: codes and messages are fixed strings clients may
/// match on, including the inconsistent `SMSgate`/`SMSGate` casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: String,
    pub message: String,
}

impl Envelope {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Message accepted and handed to the transport.
    pub fn sent() -> Self {
        Self::new("SMSgate", "Sent!")
    }

    /// Root-path greeting.
    pub fn welcome() -> Self {
        Self::new("SMSGate", "Welcome to SMSGate!")
    }

    /// Password missing or wrong.
    pub fn forbidden() -> Self {
        Self::new("Forbidden", "Bad password.")
    }

    /// Unknown path or wrong method on the send endpoint.
    pub fn not_found() -> Self {
        Self::new("404", "Aw, man. :(")
    }

    /// Request body could not be parsed; carries the parser's error text.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("Internal Server Error", message)
    }
}
