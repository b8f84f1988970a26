//! Error types shared across the byte stream and dataset codec.
use snafu::Snafu;

/// Errors raised by [`crate::bytestream::ByteStream`] and low-level decoding.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    /// attempted to read {requested} bytes at offset {offset}, but only {available} remain
    #[snafu(display(
        "attempted to read {requested} bytes at offset {offset}, but only {available} remain"
    ))]
    Truncated {
        requested: usize,
        available: usize,
        offset: usize,
    },

    /// an odd-length value of {length} bytes was found for VR {vr} at tag {tag}
    #[snafu(display("odd-length value of {length} bytes for VR {vr} at tag {tag}"))]
    OddLength {
        tag: crate::tag::Tag,
        vr: &'static str,
        length: u32,
    },

    /// the file did not begin with the DICM magic after the preamble
    BadMeta,

    /// unrecognized transfer syntax UID `{uid}`
    #[snafu(display("unrecognized transfer syntax UID `{uid}`"))]
    UnknownTransferSyntax { uid: String },

    /// malformed dataset: {message}
    #[snafu(display("malformed dataset: {message}"))]
    Malformed { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
