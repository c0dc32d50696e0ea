use {anyhow::Result, async_trait::async_trait, tokio::sync::mpsc::UnboundedSender, tracing::info};

use crate::report::{DeliveryReport, ReportStage, ReportStatus};

/// Outbound message transport. Each backend implements this.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Hand a message to the transport.
    ///
    /// Fire-and-forget from the gateway's point of view: errors returned
    /// here are logged by the caller, never surfaced to the HTTP client.
    /// Acknowledgements arrive later on the report bus.
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

// ── Built-in senders ─────────────────────────────────────────────────────────

/// Default backend when no real transport is wired: logs the outbound
/// message and immediately acknowledges both stages on the report bus.
pub struct LogSender {
    reports: Option<UnboundedSender<DeliveryReport>>,
}

impl LogSender {
    pub fn new(reports: Option<UnboundedSender<DeliveryReport>>) -> Self {
        Self { reports }
    }

    fn publish(&self, to: &str, stage: ReportStage) {
        if let Some(tx) = &self.reports {
            // Receiver gone means the gateway stopped; nothing to do.
            let _ = tx.send(DeliveryReport {
                phone: to.to_string(),
                stage,
                status: ReportStatus::Ok,
            });
        }
    }
}

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        info!(to, len = body.len(), "outbound message");
        self.publish(to, ReportStage::Sent);
        self.publish(to, ReportStage::Delivered);
        Ok(())
    }
}

/// Records every `(to, body)` pair. Used by gateway tests to assert what
/// was dispatched.
#[derive(Default)]
pub struct MemorySender {
    sent: tokio::sync::Mutex<Vec<(String, String)>>,
}

impl MemorySender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessageSender for MemorySender {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}
