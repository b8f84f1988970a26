//! RLE Lossless (1.2.840.10008.1.2.5) pixel codec.
//!
//! Unlike the JPEG family, RLE Lossless uses a simple byte-oriented PackBits
//! scheme (DICOM PS3.5 Annex G) rather than an external library, so it is
//! implemented directly here instead of through the pluggable registry.
//! Only 8-bits-allocated, single- or multi-sample images are supported;
//! 16-bit images split each sample across two RLE segments (MSB/LSB) and
//! are out of scope for this transcoder.
use crate::codec::{CodecResult, MalformedSnafu, PixelCodec, SizeMismatchSnafu};
use snafu::ensure;

/// The 64-byte RLE header: a segment count followed by 15 big-endian u32
/// offsets (padded with zeroes beyond the segment count).
const HEADER_LEN: usize = 64;

fn read_header(fragment: &[u8]) -> CodecResult<(usize, Vec<u32>)> {
    ensure!(
        fragment.len() >= HEADER_LEN,
        MalformedSnafu {
            message: "RLE fragment shorter than the 64-byte header"
        }
    );
    let count = u32::from_le_bytes(fragment[0..4].try_into().unwrap()) as usize;
    ensure!(
        count <= 15,
        MalformedSnafu {
            message: "RLE segment count exceeds 15"
        }
    );
    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        let at = 4 + i * 4;
        offsets.push(u32::from_le_bytes(fragment[at..at + 4].try_into().unwrap()));
    }
    Ok((count, offsets))
}

fn packbits_decode(segment: &[u8], expected_len: usize) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut i = 0;
    while i < segment.len() && out.len() < expected_len {
        let n = segment[i] as i8;
        i += 1;
        if n >= 0 {
            let count = n as usize + 1;
            let end = (i + count).min(segment.len());
            out.extend_from_slice(&segment[i..end]);
            i = end;
        } else if n != -128 {
            let count = 1 - n as isize;
            if i >= segment.len() {
                break;
            }
            let byte = segment[i];
            i += 1;
            out.extend(std::iter::repeat(byte).take(count as usize));
        }
        // n == -128 is a no-op per the PackBits spec
    }
    out.truncate(expected_len);
    Ok(out)
}

fn packbits_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        // count a run of identical bytes
        let mut run = 1;
        while i + run < data.len() && data[i + run] == data[i] && run < 128 {
            run += 1;
        }
        if run >= 2 {
            out.push((1 - run as i32) as u8);
            out.push(data[i]);
            i += run;
        } else {
            // accumulate a literal run
            let start = i;
            let mut len = 1;
            i += 1;
            while i < data.len() && len < 128 {
                // stop the literal run before a repeat of 2+ starts
                if i + 1 < data.len() && data[i] == data[i + 1] {
                    break;
                }
                len += 1;
                i += 1;
            }
            out.push((len - 1) as u8);
            out.extend_from_slice(&data[start..start + len]);
        }
    }
    out
}

/// The RLE Lossless codec, for 8-bit single-segment-per-sample frames.
pub struct RleLosslessCodec;

impl PixelCodec for RleLosslessCodec {
    fn decode(&self, compressed: &[u8], out: &mut [u8]) -> CodecResult<()> {
        let (count, mut offsets) = read_header(compressed)?;
        offsets.push(compressed.len() as u32);
        ensure!(
            count > 0,
            MalformedSnafu {
                message: "RLE fragment has no segments"
            }
        );
        let samples = count;
        let per_sample_len = out.len() / samples;
        ensure!(
            out.len() % samples == 0,
            SizeMismatchSnafu {
                expected: per_sample_len * samples,
                got: out.len(),
            }
        );
        for (sample, chunk) in out.chunks_mut(per_sample_len).enumerate() {
            let start = offsets[sample] as usize;
            let end = offsets[sample + 1] as usize;
            ensure!(
                end <= compressed.len() && start <= end,
                MalformedSnafu {
                    message: "RLE segment offsets out of range"
                }
            );
            let decoded = packbits_decode(&compressed[start..end], per_sample_len)?;
            chunk.copy_from_slice(&decoded);
        }
        Ok(())
    }

    fn encode(
        &self,
        raw: &[u8],
        _width: u16,
        _height: u16,
        samples_per_pixel: u16,
        bits_allocated: u16,
        out: &mut Vec<u8>,
        _ratio_hint: Option<f32>,
    ) -> CodecResult<()> {
        ensure!(
            bits_allocated == 8,
            MalformedSnafu {
                message: "RLE encode only supports 8 bits allocated"
            }
        );
        let samples = samples_per_pixel.max(1) as usize;
        ensure!(
            raw.len() % samples == 0,
            SizeMismatchSnafu {
                expected: raw.len(),
                got: raw.len(),
            }
        );
        let per_sample_len = raw.len() / samples;
        let segments: Vec<Vec<u8>> = raw
            .chunks(per_sample_len)
            .map(packbits_encode)
            .collect();

        let mut header = vec![0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&(segments.len() as u32).to_le_bytes());
        let mut offset = HEADER_LEN as u32;
        for (i, seg) in segments.iter().enumerate() {
            header[4 + i * 4..8 + i * 4].copy_from_slice(&offset.to_le_bytes());
            offset += seg.len() as u32;
        }
        out.extend_from_slice(&header);
        for seg in segments {
            out.extend_from_slice(&seg);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;

    #[test]
    fn packbits_round_trip() {
        let data = vec![1u8, 1, 1, 1, 2, 3, 4, 5, 5, 5, 5, 5, 5];
        let encoded = packbits_encode(&data);
        let decoded = packbits_decode(&encoded, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn single_sample_round_trip() {
        let raw = vec![10u8, 10, 10, 20, 30, 40, 40, 40, 40];
        let codec = RleLosslessCodec;
        let mut compressed = Vec::new();
        codec
            .encode(&raw, 3, 3, 1, 8, &mut compressed, None)
            .unwrap();
        let mut out = vec![0u8; raw.len()];
        codec.decode(&compressed, &mut out).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn multi_sample_round_trip() {
        // 2x2 RGB, planar (one segment per sample plane)
        let raw: Vec<u8> = vec![1, 2, 3, 4, 10, 20, 30, 40, 100, 110, 120, 130];
        let codec = RleLosslessCodec;
        let mut compressed = Vec::new();
        codec
            .encode(&raw, 2, 2, 3, 8, &mut compressed, None)
            .unwrap();
        let mut out = vec![0u8; raw.len()];
        codec.decode(&compressed, &mut out).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn rejects_16_bit_encode() {
        let codec = RleLosslessCodec;
        let mut out = Vec::new();
        let err = codec.encode(&[0, 0], 1, 1, 1, 16, &mut out, None);
        assert!(matches!(err, Err(CodecError::Malformed { .. })));
    }
}
