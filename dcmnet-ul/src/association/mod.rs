//! The association state machine (spec §4.D): negotiates presentation
//! contexts over a `TcpStream`, then carries DIMSE messages as fragmented
//! P-DATA-TF PDVs until release or abort.
mod client;
mod pdata;
mod server;

pub use client::{ClientAssociation, ClientAssociationOptions};
pub use pdata::DimseMessage;
pub use server::{IncomingAssociation, ServerAssociationOptions};

/// Where the association currently stands, spec §4.D state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationState {
    Idle,
    AwaitingAssociateAc,
    Established,
    Releasing,
    Aborted,
    Closed,
}
