//! Errors raised while acting as an SCP.
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("association error: {source}"))]
    Association { source: dcmnet_ul::Error },

    #[snafu(display("command set error: {source}"))]
    Dimse { source: dcmnet_dimse::Error },

    #[snafu(display("dataset codec error: {source}"))]
    Core { source: dcmnet_core::Error },

    #[snafu(display("negotiated presentation context {pc_id} has no known transfer syntax"))]
    UnknownNegotiatedTransferSyntax { pc_id: u8 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<dcmnet_ul::Error> for Error {
    fn from(source: dcmnet_ul::Error) -> Self {
        Error::Association { source }
    }
}

impl From<dcmnet_dimse::Error> for Error {
    fn from(source: dcmnet_dimse::Error) -> Self {
        Error::Dimse { source }
    }
}

impl From<dcmnet_core::Error> for Error {
    fn from(source: dcmnet_core::Error) -> Self {
        Error::Core { source }
    }
}
