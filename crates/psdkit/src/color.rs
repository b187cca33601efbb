/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion of decoded planes to interleaved RGBA
//!
//! Planes hold one sample per pixel in the document colour mode, sixteen
//! bit samples are reduced to their high byte. Missing planes read as zero.
use alloc::vec;
use alloc::vec::Vec;

use crate::constants::{ColorModes, CHANNEL_TRANSPARENCY, CHANNEL_USER_MASK};
use crate::document::Document;
use crate::layer::{Layer, Mask};

/// D65 reference white
const REFERENCE_WHITE: [f64; 3] = [0.950_47, 1.0, 1.088_83];

const LAB_EPSILON: f64 = 0.008_856;

const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.2406, -1.5372, -0.4986],
    [-0.9689, 1.8758, 0.0415],
    [0.0557, -0.204, 1.057]
];

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
#[inline(always)]
fn clamp_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Ink fractions to RGB, every argument is in `0.0..=1.0`
#[inline(always)]
fn cmyk_fraction_to_rgb(c: f64, m: f64, y: f64, k: f64) -> [u8; 3] {
    let convert = |ink: f64| clamp_u8(255.0 * (1.0 - (ink * (1.0 - k) + k)));

    [convert(c), convert(m), convert(y)]
}

/// Convert CMYK ink amounts to RGB
///
/// Zero is no ink, 255 full coverage, so `(0, 0, 0, 0)` is white and
/// `(0, 0, 0, 255)` black.
///
/// PSD planes store the inverse of this, the conversion of stored samples
/// is done by [`layer_to_rgba`] and [`merged_to_rgba`].
pub fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let ink = |x: u8| f64::from(x) / 256.0;

    cmyk_fraction_to_rgb(ink(c), ink(m), ink(y), ink(k))
}

#[inline(always)]
fn stored_ink(sample: u8) -> f64 {
    1.0 - f64::from(sample) / 256.0
}

#[inline(always)]
fn lab_f_inverse(t: f64) -> f64 {
    let cube = t * t * t;

    if cube <= LAB_EPSILON {
        (t - 16.0 / 116.0) / 7.787
    } else {
        cube
    }
}

#[inline(always)]
fn gamma_encode(linear: f64) -> f64 {
    if linear <= 0.003_130_8 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert a Lab sample as stored in PSD planes to sRGB
///
/// `l` covers lightness 0 to 100, `a` and `b` are offset by 128.
pub fn lab_to_rgb(l: u8, a: u8, b: u8) -> [u8; 3] {
    let l = f64::from(l) / 2.56;
    let a = f64::from(a) - 128.0;
    let b = f64::from(b) - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let xyz = [
        lab_f_inverse(fx) * REFERENCE_WHITE[0],
        lab_f_inverse(fy) * REFERENCE_WHITE[1],
        lab_f_inverse(fz) * REFERENCE_WHITE[2]
    ];

    let mut out = [0; 3];

    for (pixel, row) in out.iter_mut().zip(XYZ_TO_RGB.iter()) {
        let linear = row[0] * xyz[0] + row[1] * xyz[1] + row[2] * xyz[2];

        *pixel = clamp_u8(gamma_encode(linear) * 255.0);
    }
    out
}

/// Number of planes making up the colour of one pixel
const fn color_channels(mode: ColorModes) -> usize {
    match mode {
        ColorModes::Bitmap
        | ColorModes::Grayscale
        | ColorModes::DuoTone
        | ColorModes::IndexedColor => 1,
        ColorModes::RGB | ColorModes::LabColor | ColorModes::MultiChannel => 3,
        ColorModes::CMYK => 4
    }
}

/// Reads pixels out of a set of colour planes
struct PixelSource<'a> {
    mode:    ColorModes,
    palette: &'a [u8],
    /// bytes per sample
    step:    usize,
    planes:  Vec<&'a [u8]>
}

impl<'a> PixelSource<'a> {
    #[inline]
    fn sample(&self, plane: usize, pos: usize) -> u8 {
        self.planes
            .get(plane)
            .and_then(|x| x.get(pos * self.step))
            .copied()
            .unwrap_or(0)
    }

    fn color(&self, pos: usize) -> [u8; 3] {
        match self.mode {
            ColorModes::Grayscale | ColorModes::DuoTone => {
                let v = self.sample(0, pos);
                [v, v, v]
            }
            ColorModes::IndexedColor => {
                let index = usize::from(self.sample(0, pos));
                let entry = |offset: usize| self.palette.get(index + offset).copied().unwrap_or(0);

                [entry(0), entry(256), entry(512)]
            }
            ColorModes::RGB => [self.sample(0, pos), self.sample(1, pos), self.sample(2, pos)],
            ColorModes::CMYK => cmyk_fraction_to_rgb(
                stored_ink(self.sample(0, pos)),
                stored_ink(self.sample(1, pos)),
                stored_ink(self.sample(2, pos)),
                stored_ink(self.sample(3, pos))
            ),
            ColorModes::MultiChannel => cmyk_fraction_to_rgb(
                stored_ink(self.sample(0, pos)),
                stored_ink(self.sample(1, pos)),
                stored_ink(self.sample(2, pos)),
                0.0
            ),
            ColorModes::LabColor => {
                lab_to_rgb(self.sample(0, pos), self.sample(1, pos), self.sample(2, pos))
            }
            ColorModes::Bitmap => [255; 3]
        }
    }
}

/// Coverage of the layer mask at a pixel of the layer rectangle
///
/// Pixels outside the mask rectangle are fully covered.
fn mask_coverage(mask: &Mask, layer: &Layer, x: usize, y: usize, step: usize) -> u8 {
    let (mut mx, mut my) = (x as i64, y as i64);

    if mask.position_is_relative() {
        mx -= i64::from(mask.left);
        my -= i64::from(mask.top);
    } else {
        mx += i64::from(layer.left) - i64::from(mask.left);
        my += i64::from(layer.top) - i64::from(mask.top);
    }
    if mx < 0 || my < 0 || mx >= mask.width() as i64 || my >= mask.height() as i64 {
        return 255;
    }
    let index = (my as usize * mask.width() + mx as usize) * step;

    mask.pixels.get(index).copied().unwrap_or(255)
}

/// Render a layer to interleaved RGBA8, `width * height * 4` bytes
///
/// Alpha comes from the transparency channel and is scaled by the user
/// mask when the layer has one. Returns `None` for layers covering no
/// pixels.
pub fn layer_to_rgba(document: &Document, layer: &Layer) -> Option<Vec<u8>> {
    if layer.is_empty() {
        return None;
    }
    let width = layer.width();
    let step = document.depth.size_of();

    let source = PixelSource {
        mode: document.color_mode,
        palette: &document.color_mode_data,
        step,
        planes: (0..color_channels(document.color_mode))
            .map(|id| layer.channel(id as i16).map_or(&[][..], |x| x.pixels.as_slice()))
            .collect()
    };
    let alpha = layer.channel(CHANNEL_TRANSPARENCY).map(|x| x.pixels.as_slice());
    let mask = layer
        .mask
        .as_ref()
        .filter(|_| layer.channel(CHANNEL_USER_MASK).is_some());

    let mut output = vec![0; width * layer.height() * 4];

    for (y, row) in output.chunks_exact_mut(width * 4).enumerate() {
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            let pos = y * width + x;
            let [r, g, b] = source.color(pos);

            let mut a = alpha.map_or(255, |p| p.get(pos * step).copied().unwrap_or(255));

            if let Some(mask) = mask {
                let coverage = mask_coverage(mask, layer, x, y, step);
                a = ((u32::from(a) * u32::from(coverage)) / 255) as u8;
            }
            pixel.copy_from_slice(&[r, g, b, a]);
        }
    }
    Some(output)
}

/// Render the merged image to interleaved RGBA8
///
/// The first plane after the colour planes is used as alpha, except for
/// multichannel documents where every plane is an ink. Returns `None` when
/// the merged image was not decoded.
pub fn merged_to_rgba(document: &Document) -> Option<Vec<u8>> {
    if document.merged.is_empty() || document.width == 0 || document.height == 0 {
        return None;
    }
    let count = color_channels(document.color_mode);
    let step = document.depth.size_of();

    let source = PixelSource {
        mode: document.color_mode,
        palette: &document.color_mode_data,
        step,
        planes: document.merged.iter().take(count).map(Vec::as_slice).collect()
    };
    let alpha = match document.color_mode {
        ColorModes::MultiChannel => None,
        _ => document.merged.get(count)
    };

    let mut output = vec![0; document.width * document.height * 4];

    for (pos, pixel) in output.chunks_exact_mut(4).enumerate() {
        let [r, g, b] = source.color(pos);
        let a = alpha.map_or(255, |p| p.get(pos * step).copied().unwrap_or(255));

        pixel.copy_from_slice(&[r, g, b, a]);
    }
    Some(output)
}
