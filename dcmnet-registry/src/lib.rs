//! Process-wide transfer-syntax and pixel-codec registries (spec §4.F, §5).
pub mod codec;
pub mod rle;
pub mod transfer_syntax;

pub use codec::{CodecError, CodecResult, PixelCodec};
pub use transfer_syntax::default_proposed;
pub use transfer_syntax::get as get_transfer_syntax;

/// Register the codecs this crate ships with (currently RLE Lossless).
/// [`codec::get`] calls this lazily on first use, so applications only need
/// to call it themselves if they also register optional JPEG/JPEG2000 codec
/// modules (spec §9 "pluggable codecs") and want those available before the
/// first codec lookup.
pub fn register_builtin_codecs() {
    static RLE: rle::RleLosslessCodec = rle::RleLosslessCodec;
    codec::register(dcmnet_encoding::transfer_syntax::RLE_LOSSLESS.uid, &RLE);
}
