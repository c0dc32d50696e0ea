use std::sync::Arc;

use tokio::sync::RwLock;

use {smsgate_config::GatewayConfig, smsgate_sms::MessageSender};

/// Shared gateway runtime state, wrapped in Arc for use across async tasks.
///
/// The config is an injected value, not an ambient global: handlers read a
/// snapshot per request, and [`GatewayState::refresh_config`] is the one
/// way to pick up changes.
pub struct GatewayState {
    config: RwLock<GatewayConfig>,
    sender: Arc<dyn MessageSender>,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, sender: Arc<dyn MessageSender>) -> Arc<Self> {
        Arc::new(Self {
            config: RwLock::new(config),
            sender,
        })
    }

    /// Snapshot of the current config.
    pub async fn config(&self) -> GatewayConfig {
        self.config.read().await.clone()
    }

    /// Replace the config. In-flight requests keep the snapshot they read.
    pub async fn refresh_config(&self, config: GatewayConfig) {
        *self.config.write().await = config;
    }

    pub fn sender(&self) -> Arc<dyn MessageSender> {
        Arc::clone(&self.sender)
    }
}

#[cfg(test)]
mod tests {
    use smsgate_sms::MemorySender;

    use super::*;

    #[tokio::test]
    async fn refresh_replaces_snapshot() {
        let state = GatewayState::new(GatewayConfig::default(), Arc::new(MemorySender::new()));
        assert_eq!(state.config().await.path, "/send");

        let mut updated = GatewayConfig::default();
        updated.path = "/sms".into();
        state.refresh_config(updated).await;
        assert_eq!(state.config().await.path, "/sms");
    }
}
