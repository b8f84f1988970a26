//! The transfer-syntax half of the registry: UID lookup plus the ability to
//! mark a pluggable syntax as actually supported once its codec module has
//! registered (see [`crate::codec`]).
use dcmnet_encoding::transfer_syntax::{by_uid, TransferSyntax};

/// Look up a transfer syntax descriptor by UID, tolerating a producer's
/// stray trailing byte (spec §9 open question).
pub fn get(uid: &str) -> Option<&'static TransferSyntax> {
    by_uid(uid)
}

/// Default transfer syntaxes proposed by an SCU when the caller does not
/// specify any (spec §4.G): Implicit VR Little Endian first (always
/// understood), then JPEG Lossless SV1.
pub fn default_proposed() -> Vec<&'static str> {
    vec![
        dcmnet_encoding::transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN.uid,
        dcmnet_encoding::transfer_syntax::JPEG_LOSSLESS_SV1.uid,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_is_non_empty_and_known() {
        for uid in default_proposed() {
            assert!(get(uid).is_some());
        }
    }
}
