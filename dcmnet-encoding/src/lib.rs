//! Transfer syntax descriptors and text helpers.
pub mod text;
pub mod transfer_syntax;

pub use transfer_syntax::{Codec, TransferSyntax};
