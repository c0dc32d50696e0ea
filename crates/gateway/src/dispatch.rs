//! Pure routing core: one request in, exactly one outcome out.
//!
//! Kept free of HTTP machinery so the decision table can be unit tested
//! without a listener; `server.rs` maps outcomes to status codes and
//! envelopes.

use std::collections::HashMap;

use smsgate_config::GatewayConfig;

use crate::auth::check_password;

/// What the gateway decided to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Valid send request: hand `(phone, message)` to the transport,
    /// respond 200.
    Dispatched { phone: String, message: String },
    /// Root-path greeting, any method. 200.
    Welcome,
    /// Password required and absent or wrong. 403.
    Forbidden,
    /// Unknown path, or the send path with the wrong method. 404.
    NotFound,
}

/// Route a parsed request.
///
/// `params` is the merged query + body parameter map. Absent `phone` and
/// `message` parameters become empty strings, never an error.
pub fn dispatch(
    config: &GatewayConfig,
    method: &http::Method,
    path: &str,
    params: &HashMap<String, String>,
) -> Outcome {
    if path == config.path {
        if !config.method.matches(method) {
            return Outcome::NotFound;
        }
        if !check_password(&config.password, params.get("password").map(String::as_str)) {
            return Outcome::Forbidden;
        }
        let param = |key: &str| params.get(key).cloned().unwrap_or_default();
        return Outcome::Dispatched {
            phone: param("phone"),
            message: param("message"),
        };
    }

    if path == "/" {
        return Outcome::Welcome;
    }

    Outcome::NotFound
}
