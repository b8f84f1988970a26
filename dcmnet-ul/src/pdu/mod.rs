//! PDU data model (`types`) and wire codec (`codec`), spec §3/§4.C.
pub mod codec;
pub mod types;

pub use codec::{read_pdu, read_pdu_from_reader, write_pdu, write_pdu_to_writer};
pub use types::*;
