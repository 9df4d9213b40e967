use thiserror::Error;

use crate::ical::expand::ConversionError;
use crate::ical::parse::ParseError;

/// RFC parsing and expansion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error(transparent)]
    ConversionError(#[from] ConversionError),

    #[error("Recurrence rule error: {0}")]
    RecurrenceError(String),

    #[error(transparent)]
    CoreError(#[from] calfeed_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
