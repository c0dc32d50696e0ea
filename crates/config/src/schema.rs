//! Config schema types for the gateway.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsGateConfig {
    pub gateway: GatewayConfig,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address to bind the listener to.
    pub bind: String,

    /// Listener port.
    pub port: u16,

    /// The one path the gateway treats as the send endpoint.
    pub path: String,

    /// HTTP method accepted on the send endpoint.
    pub method: ReceiveMethod,

    pub password: PasswordConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            path: "/send".into(),
            method: ReceiveMethod::Post,
            password: PasswordConfig::default(),
        }
    }
}

/// Password gating for the send endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Whether requests must carry a `password` parameter.
    pub required: bool,

    /// Expected password value. Compared case-sensitively.
    pub value: String,
}

/// Method the send endpoint accepts. Config files say "GET" or "POST".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceiveMethod {
    Get,
    Post,
}

impl Default for ReceiveMethod {
    fn default() -> Self {
        Self::Post
    }
}

impl ReceiveMethod {
    pub fn matches(&self, method: &http::Method) -> bool {
        match self {
            Self::Get => method == http::Method::GET,
            Self::Post => method == http::Method::POST,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SmsGateConfig::default();
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.path, "/send");
        assert_eq!(config.gateway.method, ReceiveMethod::Post);
        assert!(!config.gateway.password.required);
        assert_eq!(config.gateway.password.value, "");
    }

    #[test]
    fn method_matches() {
        assert!(ReceiveMethod::Post.matches(&http::Method::POST));
        assert!(!ReceiveMethod::Post.matches(&http::Method::GET));
        assert!(ReceiveMethod::Get.matches(&http::Method::GET));
        assert!(!ReceiveMethod::Get.matches(&http::Method::PUT));
    }

    #[test]
    fn method_serde_uppercase() {
        let toml_str = "path = \"/sms\"\nmethod = \"GET\"\n";
        let config: GatewayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.method, ReceiveMethod::Get);
        assert_eq!(config.path, "/sms");

        let out = toml::to_string(&config).unwrap();
        assert!(out.contains("method = \"GET\""));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = "[gateway.password]\nrequired = true\nvalue = \"secret\"\n";
        let config: SmsGateConfig = toml::from_str(toml_str).unwrap();
        assert!(config.gateway.password.required);
        assert_eq!(config.gateway.password.value, "secret");
        assert_eq!(config.gateway.path, "/send");
    }
}
