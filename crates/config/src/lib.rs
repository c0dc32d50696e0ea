//! Configuration for the SMSGate gateway.
//!
//! Schema types live in [`schema`], file discovery and load/save in
//! [`loader`], and `${ENV_VAR}` substitution in [`env_subst`].

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config, save_config},
    schema::{GatewayConfig, PasswordConfig, ReceiveMethod, SmsGateConfig},
};
