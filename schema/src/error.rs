use thiserror::Error;

use crate::{HospitalName, OrderId};

/// Conditions raised by order intake and launch scheduling
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// Malformed priority or timestamp; the order never enters the queue
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// The destination could not be resolved to a distance; rejected at intake
    #[error("unknown hospital `{0}`")]
    UnknownHospital(HospitalName),

    /// Malformed fleet availability snapshot; the tick is aborted untouched
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An order removal referenced an order that is no longer queued.
    /// Never expected under serialized access and treated as fatal.
    #[error("order {0} is not queued")]
    NotFound(OrderId),
}
