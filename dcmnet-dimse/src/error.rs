//! Errors produced while building or parsing DIMSE command sets.
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("underlying dataset codec error: {source}"))]
    Core { source: dcmnet_core::Error },

    #[snafu(display("command set is missing required element {tag}"))]
    MissingElement { tag: String },

    #[snafu(display("command field {code:#06x} is not a recognized DIMSE command"))]
    UnknownCommandField { code: u16 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<dcmnet_core::Error> for Error {
    fn from(source: dcmnet_core::Error) -> Self {
        Error::Core { source }
    }
}
