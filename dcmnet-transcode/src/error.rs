//! Errors produced while transcoding pixel data between transfer syntaxes.
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("no codec registered for transfer syntax {uid}"))]
    NoCodec { uid: String },

    #[snafu(display("codec error: {source}"))]
    Codec { source: dcmnet_registry::CodecError },

    #[snafu(display("data set has no Pixel Data element to transcode"))]
    NoPixelData,

    #[snafu(display("Image Pixel module attribute {tag} is missing or cannot be transcoded without it"))]
    MissingPixelAttribute { tag: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<dcmnet_registry::CodecError> for Error {
    fn from(source: dcmnet_registry::CodecError) -> Self {
        Error::Codec { source }
    }
}
