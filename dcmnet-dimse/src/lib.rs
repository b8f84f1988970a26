//! DIMSE command message layer (spec §4.E): builds and parses the
//! Implicit VR Little Endian command sets for C-ECHO, C-FIND, C-MOVE, and
//! C-STORE, independent of how their bytes are actually transported.
pub mod command;
pub mod error;
pub mod message;
pub mod status;

pub use command::{CommandField, Priority};
pub use error::{Error, Result};
pub use status::{Status, SubOperationCounts};
