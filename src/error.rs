use thiserror::Error;

use crate::schedule::Day;

/// Validation failures raised at the boundary of the availability API.
///
/// None of these involve I/O; a caller recovers by re-issuing a correct call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("not a valid day: {0}")]
    UnknownDay(String),

    #[error("payload is missing day {0}")]
    MissingDay(Day),

    #[error("slot index {index} outside catalog of {len} slots")]
    OutOfRange { index: usize, len: usize },

    #[error("encoded value {value:#x} has bits beyond the {width} slots of a day")]
    InvalidEncoding { value: u64, width: usize },

    #[error("not a valid time slot: {0}")]
    UnknownSlot(String),

    #[error("{slots} slots per day do not fit in a {max}-bit day encoding")]
    CatalogTooWide { slots: usize, max: usize },

    #[error("invalid slot catalog: {0}")]
    InvalidCatalog(String),
}
