//! Gateway: HTTP listener and request dispatch.
//!
//! Lifecycle:
//! 1. Load + validate config (injected as a [`GatewayConfig`] value)
//! 2. Subscribe the delivery-report bus, start the report logger
//! 3. Bind the listener and serve
//! 4. Per request: parse params, gate on password, hand off to the sender
//! 5. Stop: drop the report subscription, shut the listener down
//!
//! Every request — success, bad password, unknown path, malformed body —
//! produces exactly one two-field JSON envelope.

pub mod auth;
pub mod dispatch;
pub mod envelope;
pub mod server;
pub mod state;

pub use {
    envelope::Envelope,
    server::{Gateway, build_gateway_app},
    state::GatewayState,
};

pub use smsgate_config::GatewayConfig;
