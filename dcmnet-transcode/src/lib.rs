//! Pixel data transcoding between transfer syntaxes (spec §4.F).
//!
//! This module only re-encodes Pixel Data itself. Re-encoding numeric
//! value bytes for an endianness change elsewhere in the data set (e.g.
//! Explicit VR Big Endian, retired since DICOM 2016) is out of scope: every
//! transfer syntax this crate actually decompresses or compresses is
//! little-endian, so the gap only matters for a syntax nobody uses in
//! practice.
pub mod error;
pub mod pixel;

pub use error::{Error, Result};

use dcmnet_core::{DataElement, Dataset, Value, VR};
use dcmnet_encoding::transfer_syntax::TransferSyntax;
use error::{NoCodecSnafu, NoPixelDataSnafu};
use pixel::{PixelParams, ICON_IMAGE_SEQUENCE, OVERLAY_DATA, PIXEL_DATA, PLANAR_CONFIGURATION};
use snafu::OptionExt;

/// Re-encode `dataset`'s Pixel Data (if present) from `current`'s encoding
/// to `target`'s, and flip the data set's own VR/endian mode to match
/// `target`. A no-op if the two transfer syntaxes are the same UID.
pub fn transcode(dataset: &mut Dataset, current: &TransferSyntax, target: &TransferSyntax) -> Result<()> {
    if current.uid == target.uid {
        return Ok(());
    }
    tracing::debug!(current = current.uid, target = target.uid, "transcoding pixel data");
    transcode_recursive(dataset, current, target)?;
    dataset.explicit_vr = target.explicit_vr;
    dataset.big_endian = target.big_endian;
    Ok(())
}

fn transcode_recursive(dataset: &mut Dataset, current: &TransferSyntax, target: &TransferSyntax) -> Result<()> {
    for element in dataset.iter_mut() {
        if element.tag() == ICON_IMAGE_SEQUENCE || element.tag() == OVERLAY_DATA {
            continue;
        }
        if element.vr() == VR::SQ {
            if let Value::Sequence(items) = element.value_mut() {
                for item in items.iter_mut() {
                    transcode_recursive(item, current, target)?;
                    item.explicit_vr = target.explicit_vr;
                    item.big_endian = target.big_endian;
                }
            }
        }
    }

    if dataset.get(PIXEL_DATA).is_none() {
        return Ok(());
    }
    let params = pixel::read_params(dataset)?;
    transcode_pixel_data(dataset, &params, current, target)
}

fn transcode_pixel_data(dataset: &mut Dataset, params: &PixelParams, current: &TransferSyntax, target: &TransferSyntax) -> Result<()> {
    let native = match (current.encapsulated, target.encapsulated) {
        (false, false) => {
            let element = dataset.get(PIXEL_DATA).context(NoPixelDataSnafu)?;
            let bytes = element.value().as_primitive().map(|b| b.to_vec()).unwrap_or_default();
            normalize_planar(bytes, params)
        }
        (true, false) => {
            let compressed_frames = take_fragment_frames(dataset)?;
            let codec = dcmnet_registry::codec::get(current.uid).context(NoCodecSnafu { uid: current.uid.to_string() })?;
            let frame_len = params.frame_len();
            let mut out = Vec::with_capacity(frame_len * compressed_frames.len());
            for frame in &compressed_frames {
                let mut buf = vec![0u8; frame_len];
                codec.decode(frame, &mut buf)?;
                out.extend_from_slice(&buf);
            }
            normalize_planar(out, params)
        }
        (true, true) => {
            let compressed_frames = take_fragment_frames(dataset)?;
            let decoder = dcmnet_registry::codec::get(current.uid).context(NoCodecSnafu { uid: current.uid.to_string() })?;
            let frame_len = params.frame_len();
            let mut decoded = Vec::with_capacity(frame_len * compressed_frames.len());
            for frame in &compressed_frames {
                let mut buf = vec![0u8; frame_len];
                decoder.decode(frame, &mut buf)?;
                decoded.extend_from_slice(&buf);
            }
            normalize_planar(decoded, params)
        }
        (false, true) => {
            let element = dataset.get(PIXEL_DATA).context(NoPixelDataSnafu)?;
            element.value().as_primitive().map(|b| b.to_vec()).unwrap_or_default()
        }
    };

    if target.encapsulated {
        let encoder = dcmnet_registry::codec::get(target.uid).context(NoCodecSnafu { uid: target.uid.to_string() })?;
        let frame_len = params.frame_len();
        let mut fragments = vec![Vec::new()]; // zero-length Basic Offset Table
        for frame in native.chunks(frame_len) {
            let mut encoded = Vec::new();
            encoder.encode(frame, params.columns, params.rows, params.samples_per_pixel, params.bits_allocated, &mut encoded, None)?;
            fragments.push(encoded);
        }
        set_pixel_value(dataset, Value::Fragments(fragments), params);
    } else {
        set_pixel_value(dataset, Value::Primitive(DataElement::pad_value(VR::OW, native)), params);
        set_planar_configuration(dataset, 0);
    }
    Ok(())
}

fn normalize_planar(frame_buffer: Vec<u8>, params: &PixelParams) -> Vec<u8> {
    if params.planar_configuration == 0 || params.samples_per_pixel <= 1 {
        return frame_buffer;
    }
    let frame_len = params.frame_len();
    let mut out = Vec::with_capacity(frame_buffer.len());
    for frame in frame_buffer.chunks(frame_len) {
        out.extend(pixel::planar_to_interleaved(frame, params));
    }
    out
}

fn take_fragment_frames(dataset: &Dataset) -> Result<Vec<Vec<u8>>> {
    let element = dataset.get(PIXEL_DATA).context(NoPixelDataSnafu)?;
    let Value::Fragments(items) = element.value() else {
        return NoPixelDataSnafu.fail();
    };
    // item 0 is the Basic Offset Table; treat every remaining item as one
    // frame's worth of compressed data (the common single-fragment-per-frame case).
    Ok(items.iter().skip(1).cloned().collect())
}

fn set_pixel_value(dataset: &mut Dataset, value: Value, params: &PixelParams) {
    let vr = if matches!(value, Value::Fragments(_)) {
        VR::OB
    } else if params.bits_allocated > 8 {
        VR::OW
    } else {
        VR::OB
    };
    if let Some(element) = dataset.get_mut(PIXEL_DATA) {
        let tag = element.tag();
        let endian = element.endian();
        *element = DataElement::new(tag, vr, value, endian);
    }
}

fn set_planar_configuration(dataset: &mut Dataset, value: u16) {
    if let Some(element) = dataset.get_mut(PLANAR_CONFIGURATION) {
        let tag = element.tag();
        let endian = element.endian();
        *element = DataElement::new(tag, VR::US, Value::Primitive(value.to_le_bytes().to_vec()), endian);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmnet_core::bytestream::Endian;
    use dcmnet_core::Tag;
    use dcmnet_encoding::transfer_syntax::{EXPLICIT_VR_LITTLE_ENDIAN, RLE_LOSSLESS};

    fn sample_dataset(rows: u16, columns: u16, pixels: Vec<u8>) -> Dataset {
        let mut ds = Dataset::new(true, false);
        let push_us = |ds: &mut Dataset, tag: Tag, value: u16| {
            ds.push(DataElement::new(tag, VR::US, Value::Primitive(value.to_le_bytes().to_vec()), Endian::Little));
        };
        push_us(&mut ds, pixel::ROWS, rows);
        push_us(&mut ds, pixel::COLUMNS, columns);
        push_us(&mut ds, pixel::SAMPLES_PER_PIXEL, 1);
        push_us(&mut ds, pixel::BITS_ALLOCATED, 8);
        push_us(&mut ds, PLANAR_CONFIGURATION, 0);
        ds.push(DataElement::new(PIXEL_DATA, VR::OB, Value::Primitive(pixels), Endian::Little));
        ds
    }

    #[test]
    fn same_transfer_syntax_is_a_no_op() {
        let mut ds = sample_dataset(2, 2, vec![1, 2, 3, 4]);
        let before = ds.clone();
        transcode(&mut ds, &EXPLICIT_VR_LITTLE_ENDIAN, &EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert_eq!(ds, before);
    }

    #[test]
    fn compress_then_decompress_round_trips_pixels() {
        dcmnet_registry::register_builtin_codecs();
        let mut ds = sample_dataset(2, 2, vec![10, 20, 30, 40]);
        transcode(&mut ds, &EXPLICIT_VR_LITTLE_ENDIAN, &RLE_LOSSLESS).unwrap();
        assert!(matches!(ds.get(PIXEL_DATA).unwrap().value(), Value::Fragments(_)));

        transcode(&mut ds, &RLE_LOSSLESS, &EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
        let bytes = ds.get(PIXEL_DATA).unwrap().value().as_primitive().unwrap();
        assert_eq!(bytes, &vec![10, 20, 30, 40]);
    }
}
