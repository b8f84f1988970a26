//! Errors raised while acting as an SCU.
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

    #[snafu(display("transcoding error: {source}"))]
    Transcode { source: dcmnet_transcode::Error },

    #[snafu(display("no presentation context was accepted for {abstract_syntax}"))]
    NoAcceptedContext { abstract_syntax: String },

    #[snafu(display("peer returned failure status {status:#06x}: {detail}"))]
    FailureStatus { status: u16, detail: String },
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

impl From<dcmnet_transcode::Error> for Error {
    fn from(source: dcmnet_transcode::Error) -> Self {
        Error::Transcode { source }
    }
}
