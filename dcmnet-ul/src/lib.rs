//! The DICOM Upper-Layer Protocol (spec §4.C/§4.D): PDU framing and the
//! association state machine that drives it over a `TcpStream`.
pub mod association;
pub mod error;
pub mod pdu;

pub use error::{Error, Result};

/// Default application context name, spec §4.D.
pub const DEFAULT_APPLICATION_CONTEXT_NAME: &str = "1.2.840.10008.3.1.1.1";
/// Default implementation class UID advertised in User Information.
pub const DEFAULT_IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.10.90.999";
/// Default implementation version name advertised in User Information.
pub const DEFAULT_IMPLEMENTATION_VERSION: &str = "OBD-Dicom";
/// Default maximum PDU length proposed by either side, spec §4.D.
pub const DEFAULT_MAX_PDU_LENGTH: u32 = 16384;
/// DICOM Upper Layer protocol version, spec §3.
pub const PROTOCOL_VERSION: u16 = 1;
