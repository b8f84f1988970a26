//! Core primitives for the DICOM upper-layer/DIMSE stack.
//!
//! This crate has no knowledge of transfer syntaxes, PDUs, or network I/O -
//! it only defines the tag/VR/length vocabulary, the byte stream used by
//! every codec above it, and the in-memory dataset representation.

pub mod bytestream;
pub mod dataelement;
pub mod dataset;
pub mod error;
pub mod length;
pub mod tag;
pub mod value;

pub use bytestream::{ByteStream, Endian};
pub use dataelement::DataElement;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use length::Length;
pub use tag::Tag;
pub use value::Value;
pub use vr::VR;

pub mod vr;
