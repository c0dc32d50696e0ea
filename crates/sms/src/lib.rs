//! Message transport capability.
//!
//! The gateway hands `(destination, body)` pairs to a [`MessageSender`] and
//! never looks back: delivery acknowledgements arrive out-of-band as
//! [`report::DeliveryReport`] values on the report bus and are logged, not
//! joined to the originating HTTP request.

pub mod report;
pub mod sender;

pub use {
    report::{DeliveryReport, ReportBus, ReportStage, ReportStatus},
    sender::{LogSender, MemorySender, MessageSender},
};
