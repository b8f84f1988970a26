//! Image Pixel module attributes (group 0028) needed to frame pixel data
//! for codec decode/encode, spec §4.F.
use crate::error::{MissingPixelAttributeSnafu, Result};
use dcmnet_core::{DataElement, Dataset, Tag};
use snafu::OptionExt;

pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

/// Icon/overlay pixel sub-sequences, spec §4.F: never transcoded alongside
/// the main Pixel Data element.
pub const ICON_IMAGE_SEQUENCE: Tag = Tag(0x0088, 0x0200);
pub const OVERLAY_DATA: Tag = Tag(0x6003, 0x1010);

#[derive(Debug, Clone, Copy)]
pub struct PixelParams {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub planar_configuration: u16,
    pub number_of_frames: u32,
}

impl PixelParams {
    pub fn bytes_per_sample(&self) -> usize {
        if self.bits_allocated > 8 {
            2
        } else {
            1
        }
    }

    pub fn frame_len(&self) -> usize {
        self.rows as usize * self.columns as usize * self.samples_per_pixel as usize * self.bytes_per_sample()
    }
}

fn required_ushort(ds: &Dataset, tag: Tag, name: &'static str) -> Result<u16> {
    let v = ds.get(tag).map(DataElement::as_ushort).filter(|v| *v != 0);
    v.context(MissingPixelAttributeSnafu { tag: name })
}

pub fn read_params(ds: &Dataset) -> Result<PixelParams> {
    let rows = required_ushort(ds, ROWS, "(0028,0010) Rows")?;
    let columns = required_ushort(ds, COLUMNS, "(0028,0011) Columns")?;
    let samples_per_pixel = ds.get(SAMPLES_PER_PIXEL).map(DataElement::as_ushort).unwrap_or(1);
    let bits_allocated = ds.get(BITS_ALLOCATED).map(DataElement::as_ushort).unwrap_or(8);
    let planar_configuration = ds.get(PLANAR_CONFIGURATION).map(DataElement::as_ushort).unwrap_or(0);
    let number_of_frames = ds
        .get(NUMBER_OF_FRAMES)
        .and_then(|e| e.as_string().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);

    Ok(PixelParams { rows, columns, samples_per_pixel, bits_allocated, planar_configuration, number_of_frames })
}

/// Convert one frame from plane-separated (`R...R G...G B...B`) to
/// pixel-interleaved (`RGB RGB ...`) layout. Spec §4.F only requires this
/// direction: native Pixel Data is always written pixel-interleaved.
pub fn planar_to_interleaved(frame: &[u8], params: &PixelParams) -> Vec<u8> {
    let samples = params.samples_per_pixel as usize;
    if samples <= 1 {
        return frame.to_vec();
    }
    let bps = params.bytes_per_sample();
    let pixels = params.rows as usize * params.columns as usize;
    let mut out = vec![0u8; frame.len()];
    for pixel in 0..pixels {
        for sample in 0..samples {
            let src = (sample * pixels + pixel) * bps;
            let dst = (pixel * samples + sample) * bps;
            out[dst..dst + bps].copy_from_slice(&frame[src..src + bps]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_to_interleaved_reorders_rgb_planes() {
        let params = PixelParams { rows: 1, columns: 2, samples_per_pixel: 3, bits_allocated: 8, planar_configuration: 1, number_of_frames: 1 };
        // R0 R1 | G0 G1 | B0 B1
        let planar = vec![1, 2, 10, 20, 100, 200];
        let interleaved = planar_to_interleaved(&planar, &params);
        assert_eq!(interleaved, vec![1, 10, 100, 2, 20, 200]);
    }

    #[test]
    fn single_sample_is_unchanged() {
        let params = PixelParams { rows: 1, columns: 4, samples_per_pixel: 1, bits_allocated: 8, planar_configuration: 0, number_of_frames: 1 };
        let data = vec![9, 8, 7, 6];
        assert_eq!(planar_to_interleaved(&data, &params), data);
    }
}
