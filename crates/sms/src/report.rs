//! Out-of-band delivery acknowledgements.
//!
//! Transports report each message twice: once when it was handed to the
//! network (`Sent`) and once when the destination confirmed receipt
//! (`Delivered`). Reports flow over an unbounded channel and are only ever
//! logged; nothing upstream waits on them.

use std::sync::Mutex;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{error, info};

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Sent,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Ok,
    /// Transport-specific failure code.
    Error(i32),
}

/// A single acknowledgement from the transport, keyed by destination.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub phone: String,
    pub stage: ReportStage,
    pub status: ReportStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportBusError {
    #[error("report bus already subscribed")]
    AlreadySubscribed,
}

// ── Bus ──────────────────────────────────────────────────────────────────────

/// Channel connecting transports (publishers) to the gateway's report
/// logger (the single subscriber).
///
/// The receiving half can be claimed exactly once; a restarted gateway gets
/// a fresh bus rather than a second subscription on the old one.
pub struct ReportBus {
    tx: UnboundedSender<DeliveryReport>,
    rx: Mutex<Option<UnboundedReceiver<DeliveryReport>>>,
}

impl Default for ReportBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Handle transports use to publish reports.
    pub fn publisher(&self) -> UnboundedSender<DeliveryReport> {
        self.tx.clone()
    }

    /// Claim the receiving half. Errors on the second call.
    pub fn subscribe(&self) -> Result<UnboundedReceiver<DeliveryReport>, ReportBusError> {
        self.rx
            .lock()
            .unwrap()
            .take()
            .ok_or(ReportBusError::AlreadySubscribed)
    }
}

// ── Logging loop ─────────────────────────────────────────────────────────────

/// Drain the report channel, logging each acknowledgement. Runs until every
/// publisher handle is dropped.
pub async fn log_reports(mut rx: UnboundedReceiver<DeliveryReport>) {
    while let Some(report) = rx.recv().await {
        log_report(&report);
    }
}

fn log_report(report: &DeliveryReport) {
    match (report.stage, report.status) {
        (ReportStage::Sent, ReportStatus::Ok) => {
            info!(phone = %report.phone, "Sent OK");
        },
        (ReportStage::Delivered, ReportStatus::Ok) => {
            info!(phone = %report.phone, "Delivered OK");
        },
        (ReportStage::Sent, ReportStatus::Error(code)) => {
            error!(phone = %report.phone, code, "Sent Error");
        },
        (ReportStage::Delivered, ReportStatus::Error(code)) => {
            error!(phone = %report.phone, code, "Delivered Error");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_exactly_once() {
        let bus = ReportBus::new();
        assert!(bus.subscribe().is_ok());
        assert!(matches!(
            bus.subscribe(),
            Err(ReportBusError::AlreadySubscribed)
        ));
    }

    #[tokio::test]
    async fn reports_flow_through() {
        let bus = ReportBus::new();
        let mut rx = bus.subscribe().unwrap();

        let tx = bus.publisher();
        tx.send(DeliveryReport {
            phone: "+15551234567".into(),
            stage: ReportStage::Sent,
            status: ReportStatus::Ok,
        })
        .unwrap();

        let report = rx.recv().await.unwrap();
        assert_eq!(report.phone, "+15551234567");
        assert_eq!(report.stage, ReportStage::Sent);
        assert_eq!(report.status, ReportStatus::Ok);
    }

    #[tokio::test]
    async fn logging_loop_ends_when_publishers_drop() {
        let bus = ReportBus::new();
        let rx = bus.subscribe().unwrap();
        drop(bus);
        // No publishers left: the loop must return rather than hang.
        log_reports(rx).await;
    }
}
