use std::{error::Error, fmt};

/// The error type returned when deserialization fails.
///
/// The wire format carries no redundancy, so all that can be reported is
/// that the incoming bitstream did not match the expected shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerdeErr;

impl fmt::Display for SerdeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bitstream did not match the expected shape")
    }
}

impl Error for SerdeErr {}
