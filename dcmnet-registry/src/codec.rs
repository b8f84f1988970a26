//! The pixel-codec registry (spec §4.F "Codec registry").
//!
//! JPEG/JPEG2000/JPEG-LS codecs are external collaborators (spec §1); this
//! module only defines the registration surface a codec module plugs into,
//! plus the `RLE_LOSSLESS` and uncompressed-native entries the transcoder
//! can rely on without any optional dependency.
use snafu::Snafu;
use std::collections::HashMap;
use std::sync::{Once, RwLock};

/// Errors a registered codec may raise while decoding or encoding a frame.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum CodecError {
    /// the compressed input was malformed: {message}
    #[snafu(display("malformed compressed frame: {message}"))]
    Malformed { message: String },

    /// the output buffer was the wrong size: expected {expected}, got {got}
    #[snafu(display("output buffer size mismatch: expected {expected}, got {got}"))]
    SizeMismatch { expected: usize, got: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;

/// A decode/encode pair for one transfer syntax's pixel-data encoding.
///
/// `decode` turns one compressed frame fragment into a native pixel buffer
/// of the given exact size. `encode` does the reverse, appending the
/// compressed bytes for one native frame to `out`. `ratio_hint` is an
/// optional caller-suggested target compression ratio for lossy codecs.
pub trait PixelCodec: Send + Sync {
    fn decode(&self, compressed: &[u8], out: &mut [u8]) -> CodecResult<()>;

    fn encode(
        &self,
        raw: &[u8],
        width: u16,
        height: u16,
        samples_per_pixel: u16,
        bits_allocated: u16,
        out: &mut Vec<u8>,
        ratio_hint: Option<f32>,
    ) -> CodecResult<()>;
}

/// An identity codec for encapsulated-but-uncompressed syntaxes (e.g. RLE
/// is handled by [`crate::rle`] instead); mostly useful in tests.
pub struct IdentityCodec;

impl PixelCodec for IdentityCodec {
    fn decode(&self, compressed: &[u8], out: &mut [u8]) -> CodecResult<()> {
        if compressed.len() != out.len() {
            return SizeMismatchSnafu {
                expected: out.len(),
                got: compressed.len(),
            }
            .fail();
        }
        out.copy_from_slice(compressed);
        Ok(())
    }

    fn encode(
        &self,
        raw: &[u8],
        _width: u16,
        _height: u16,
        _samples_per_pixel: u16,
        _bits_allocated: u16,
        out: &mut Vec<u8>,
        _ratio_hint: Option<f32>,
    ) -> CodecResult<()> {
        out.extend_from_slice(raw);
        Ok(())
    }
}

static REGISTRY: RwLock<Option<HashMap<String, &'static dyn PixelCodec>>> = RwLock::new(None);
static BUILTINS: Once = Once::new();

/// Register a codec for a transfer syntax UID. An optional external
/// JPEG/JPEG2000/JPEG-LS codec module calls this once at process startup
/// (spec §9 "pluggable codecs") to add itself alongside the built-ins.
pub fn register(uid: &str, codec: &'static dyn PixelCodec) {
    let mut guard = REGISTRY.write().expect("registry lock poisoned");
    guard.get_or_insert_with(HashMap::new).insert(uid.to_string(), codec);
}

/// Fetch the codec registered for a transfer syntax UID, if any. Lazily
/// registers this crate's built-in codecs (spec §4.F: RLE Lossless) on
/// first use, so callers don't need to remember a separate init step.
pub fn get(uid: &str) -> Option<&'static dyn PixelCodec> {
    BUILTINS.call_once(crate::register_builtin_codecs);
    let guard = REGISTRY.read().expect("registry lock poisoned");
    guard.as_ref()?.get(uid).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    static IDENTITY: IdentityCodec = IdentityCodec;

    #[test]
    fn register_then_fetch() {
        register("1.2.3.test.codec", &IDENTITY);
        assert!(get("1.2.3.test.codec").is_some());
        assert!(get("1.2.3.unregistered").is_none());
    }

    #[test]
    fn identity_round_trips() {
        let mut out = vec![0u8; 4];
        IDENTITY.decode(&[1, 2, 3, 4], &mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
        let mut enc = Vec::new();
        IDENTITY.encode(&out, 2, 2, 1, 8, &mut enc, None).unwrap();
        assert_eq!(enc, vec![1, 2, 3, 4]);
    }
}
