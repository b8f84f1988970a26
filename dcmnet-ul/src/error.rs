//! Errors produced by PDU decoding and the association state machine.
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("underlying dataset codec error: {source}"))]
    Core { source: dcmnet_core::Error },

    #[snafu(display("unknown PDU type byte {pdu_type:#04x}"))]
    UnknownPduType { pdu_type: u8 },

    #[snafu(display("PDU body truncated: expected {expected} bytes, item declared {declared}"))]
    TruncatedItem { expected: usize, declared: usize },

    #[snafu(display("malformed PDU: {message}"))]
    Malformed { message: String },

    #[snafu(display("association rejected: {reason}"))]
    Rejected { reason: String },

    #[snafu(display("association aborted by peer"))]
    AbortedByPeer,

    #[snafu(display("no presentation context was accepted for abstract syntax {abstract_syntax}"))]
    NoAcceptedPresentationContext { abstract_syntax: String },

    #[snafu(display("operation invalid in association state {state}"))]
    InvalidState { state: String },

    #[snafu(display("I/O error: {source}"))]
    Io { source: std::io::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<dcmnet_core::Error> for Error {
    fn from(source: dcmnet_core::Error) -> Self {
        Error::Core { source }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}
