/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

/// `8BPS` read as a big endian u32
pub const PSD_IDENTIFIER_BE: u32 = 0x38425053;

/// Signature in front of every layer record blend key and most resources
pub const SIGNATURE_8BIM: [u8; 4] = *b"8BIM";
/// Alternate resource signature written by some (ImageReady) documents
pub const SIGNATURE_MESA: [u8; 4] = *b"MeSa";
/// Extra data signature used by large document style blocks
pub const SIGNATURE_8B64: [u8; 4] = *b"8B64";

/// Largest channel count a document header may declare
pub const MAX_CHANNELS: u16 = 24;

/// Channel id of the transparency plane
pub const CHANNEL_TRANSPARENCY: i16 = -1;
/// Channel id of the user supplied layer mask
pub const CHANNEL_USER_MASK: i16 = -2;

/// Image resource ids this library gives a typed meaning
pub mod resource_ids {
    pub const RESOLUTION_INFO: u16 = 1005;
    pub const ALPHA_CHANNEL_NAMES: u16 = 1006;
    /// Photoshop 4 thumbnail, pixels stored BGR
    pub const THUMBNAIL_LEGACY: u16 = 1033;
    pub const THUMBNAIL: u16 = 1036;
    pub const XMP_METADATA: u16 = 1060;
}

/// Document colour modes
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ColorModes {
    Bitmap = 0,
    Grayscale = 1,
    IndexedColor = 2,
    RGB = 3,
    CMYK = 4,
    MultiChannel = 7,
    DuoTone = 8,
    LabColor = 9
}

impl ColorModes {
    pub fn from_int(int: u16) -> Option<ColorModes> {
        use crate::constants::ColorModes::{
            Bitmap, DuoTone, Grayscale, IndexedColor, LabColor, MultiChannel, CMYK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(IndexedColor),
            3 => Some(RGB),
            4 => Some(CMYK),
            7 => Some(MultiChannel),
            8 => Some(DuoTone),
            9 => Some(LabColor),
            _ => None
        }
    }

    /// True for modes whose colour mode data section carries a palette
    /// or duotone specification
    pub const fn has_color_mode_data(self) -> bool {
        matches!(self, ColorModes::IndexedColor | ColorModes::DuoTone)
    }
}

/// Channel and image data compression
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompressionMethod {
    NoCompression = 0,
    RLE = 1,
    Zip = 2,
    ZipPrediction = 3
}

impl CompressionMethod {
    pub fn from_int(int: u16) -> Option<CompressionMethod> {
        match int {
            0 => Some(Self::NoCompression),
            1 => Some(Self::RLE),
            2 => Some(Self::Zip),
            3 => Some(Self::ZipPrediction),
            _ => None
        }
    }
}
