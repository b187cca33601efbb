/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer records
//!
//! A layer record is a rectangle, a channel table, blend information and a
//! length prefixed block holding the mask, blending ranges, name and a
//! chain of keyed extra data records.
//!
//! Channel pixel data is stored separately, after all records, and is
//! attached with [`Layer::load_pixel_data`].
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use bitflags::bitflags;
use psdkit_core::bit_depth::BitDepth;
use psdkit_core::bytestream::ByteReader;
use psdkit_core::log::trace;
use psdkit_core::options::DecoderOptions;

use crate::constants::{
    CompressionMethod, CHANNEL_TRANSPARENCY, CHANNEL_USER_MASK, SIGNATURE_8B64, SIGNATURE_8BIM
};
use crate::effects::{parse_effects, LayerEffects};
use crate::errors::{recoverable, PsdDecodeErrors};
use crate::rle;
use crate::text::{parse_text_descriptor, TextInfo};

bitflags! {
    /// Flags byte of a layer record
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct LayerFlags: u8 {
        const PROTECT_TRANSPARENCY = 0x01;
        /// Set when the layer is hidden
        const HIDDEN = 0x02;
        const OBSOLETE = 0x04;
        /// Bit 4 carries meaning
        const VERSION5_OR_LATER = 0x08;
        /// The layer is a group marker, its pixels mean nothing
        const PIXEL_DATA_IRRELEVANT = 0x10;
    }
}

bitflags! {
    /// Flags byte of a layer mask record
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct MaskFlags: u8 {
        /// Mask position is relative to the layer
        const POSITION_RELATIVE = 0x01;
        const DISABLED = 0x02;
        /// Invert the mask when blending
        const INVERT = 0x04;
        const FROM_RENDERING = 0x08;
        const HAS_PARAMETERS = 0x10;
    }
}

bitflags! {
    /// Contents of a `lspf` record
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct ProtectionFlags: u32 {
        const TRANSPARENCY = 0x01;
        const COMPOSITE = 0x02;
        const POSITION = 0x04;
    }
}

/// One colour, alpha or mask plane of a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// 0, 1, 2... colour planes in colour mode order, -1 transparency,
    /// -2 user mask
    pub id:          i16,
    /// Declared length of the channel block, compression field included
    pub length:      u32,
    /// `None` until data is loaded or when the method is unknown
    pub compression: Option<CompressionMethod>,
    /// Compressed channel block as stored
    pub data:        Vec<u8>,
    /// Decompressed plane, `rows * columns` bytes
    pub pixels:      Vec<u8>
}

/// User mask of a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub top:           i32,
    pub left:          i32,
    pub bottom:        i32,
    pub right:         i32,
    pub default_color: u8,
    pub flags:         MaskFlags,
    /// Decompressed mask plane, copied from channel -2
    pub pixels:        Vec<u8>
}

impl Mask {
    pub const fn width(&self) -> usize {
        (self.right as i64 - self.left as i64) as usize
    }
    pub const fn height(&self) -> usize {
        (self.bottom as i64 - self.top as i64) as usize
    }
    pub const fn position_is_relative(&self) -> bool {
        self.flags.contains(MaskFlags::POSITION_RELATIVE)
    }
}

/// A keyed extra data record as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraData {
    /// `8BIM` or `8B64`
    pub signature: [u8; 4],
    pub key:       [u8; 4],
    pub data:      Vec<u8>
}

/// Type field of a section divider (`lsct`) record
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SectionDividerKind {
    Other,
    OpenFolder,
    ClosedFolder,
    /// Hidden marker closing a group
    BoundingDivider,
    Unknown(u32)
}

impl SectionDividerKind {
    pub const fn from_int(value: u32) -> SectionDividerKind {
        match value {
            0 => Self::Other,
            1 => Self::OpenFolder,
            2 => Self::ClosedFolder,
            3 => Self::BoundingDivider,
            _ => Self::Unknown(value)
        }
    }
}

/// Decoded `lsct` / `lsdk` record
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SectionDivider {
    pub kind:       SectionDividerKind,
    /// Blend mode of the group, present in longer records
    pub blend_mode: Option<[u8; 4]>
}

impl SectionDivider {
    fn parse(data: &[u8]) -> Result<SectionDivider, PsdDecodeErrors> {
        let mut reader = ByteReader::new(data);
        let kind = SectionDividerKind::from_int(reader.read_u32()?);
        let mut blend_mode = None;

        if reader.has(8) {
            let signature = reader.read_fixed_bytes::<4>()?;

            if signature != SIGNATURE_8BIM {
                return Err(PsdDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
            }
            blend_mode = Some(reader.read_fixed_bytes::<4>()?);
        }
        Ok(SectionDivider { kind, blend_mode })
    }
}

/// Colour tag shown in the layers panel (`lclr`)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SheetColor {
    NoColor,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    Gray,
    Unknown(u16)
}

impl SheetColor {
    pub const fn from_int(value: u16) -> SheetColor {
        match value {
            0 => Self::NoColor,
            1 => Self::Red,
            2 => Self::Orange,
            3 => Self::Yellow,
            4 => Self::Green,
            5 => Self::Blue,
            6 => Self::Violet,
            7 => Self::Gray,
            _ => Self::Unknown(value)
        }
    }
}

/// A single layer
///
/// Layers are stored bottom most first. Nesting is not part of the record,
/// see [`build_layer_tree`](crate::tree::build_layer_tree).
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub top:             i32,
    pub left:            i32,
    pub bottom:          i32,
    pub right:           i32,
    pub channels:        Vec<Channel>,
    pub blend_mode:      [u8; 4],
    pub opacity:         u8,
    pub clipping:        bool,
    pub flags:           LayerFlags,
    pub mask:            Option<Mask>,
    pub blending_ranges: Vec<u8>,
    /// Pascal string name, replaced by the `luni` record when present
    pub name:            String,
    pub extra_data:      Vec<ExtraData>,
    pub text:            Option<TextInfo>,
    /// Set by a `lrFX` or `lfx2` record
    pub has_effects:     bool,
    pub effects:         Option<LayerEffects>,
    pub section_divider: Option<SectionDivider>,
    pub color_tag:       Option<SheetColor>,
    pub protection:      Option<ProtectionFlags>
}

impl Layer {
    pub const fn width(&self) -> usize {
        (self.right as i64 - self.left as i64) as usize
    }
    pub const fn height(&self) -> usize {
        (self.bottom as i64 - self.top as i64) as usize
    }
    /// Returns true if the layer covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
    pub const fn is_visible(&self) -> bool {
        !self.flags.contains(LayerFlags::HIDDEN)
    }
    /// Returns true for layers opening a group
    pub const fn is_group_marker(&self) -> bool {
        self.flags.contains(LayerFlags::PIXEL_DATA_IRRELEVANT)
    }
    pub const fn is_text_layer(&self) -> bool {
        self.text.is_some()
    }
    /// Find a channel by id
    pub fn channel(&self, id: i16) -> Option<&Channel> {
        self.channels.iter().find(|x| x.id == id)
    }
    pub fn has_transparency(&self) -> bool {
        self.channel(CHANNEL_TRANSPARENCY).is_some()
    }
    /// Find an extra data record by key
    pub fn extra(&self, key: &[u8; 4]) -> Option<&ExtraData> {
        self.extra_data.iter().find(|x| &x.key == key)
    }

    /// Read one layer record
    ///
    /// A bad blend signature is fatal, a malformed extra data record is
    /// logged and skipped unless the decoder is in strict mode. The cursor
    /// always ends at the end of the record's extra data block.
    pub fn parse(reader: &mut ByteReader, options: &DecoderOptions) -> Result<Layer, PsdDecodeErrors> {
        let top = reader.read_i32()?;
        let left = reader.read_i32()?;
        let bottom = reader.read_i32()?;
        let right = reader.read_i32()?;

        check_bounds(top, left, bottom, right, options)?;

        let channel_count = reader.read_u16()?;
        let mut channels = Vec::with_capacity(usize::from(channel_count));

        for _ in 0..channel_count {
            let id = reader.read_i16()?;
            let length = reader.read_u32()?;

            channels.push(Channel {
                id,
                length,
                compression: None,
                data: Vec::new(),
                pixels: Vec::new()
            });
        }

        let signature = reader.read_fixed_bytes::<4>()?;

        if signature != SIGNATURE_8BIM {
            return Err(PsdDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
        }
        let blend_mode = reader.read_fixed_bytes::<4>()?;
        let opacity = reader.read_u8()?;
        let clipping = reader.read_u8()? != 0;
        let flags = LayerFlags::from_bits_retain(reader.read_u8()?);
        // filler
        reader.skip(1)?;

        let extra_length = reader.read_u32()? as usize;
        let mut extra = reader.sub_reader(extra_length)?;

        let mask = parse_mask(&mut extra, options)?;

        let ranges_length = extra.read_u32()? as usize;
        let blending_ranges = extra.read_bytes(ranges_length)?.to_vec();

        let name = extra.read_pascal_string_aligned(4)?;

        let mut layer = Layer {
            top,
            left,
            bottom,
            right,
            channels,
            blend_mode,
            opacity,
            clipping,
            flags,
            mask,
            blending_ranges,
            name,
            extra_data: Vec::new(),
            text: None,
            has_effects: false,
            effects: None,
            section_divider: None,
            color_tag: None,
            protection: None
        };

        while !extra.is_eof() {
            match read_extra_data(&mut extra) {
                Ok(record) => {
                    if let Err(err) = layer.apply_extra_data(&record) {
                        recoverable(options, err, "Could not interpret layer extra data")?;
                    }
                    layer.extra_data.push(record);
                }
                Err(err) => {
                    recoverable(options, err, "Malformed layer extra data, skipping rest")?;
                    break;
                }
            }
        }

        trace!(
            "Layer {:?}: {}x{} at ({},{}), {} channels",
            layer.name,
            layer.width(),
            layer.height(),
            layer.left,
            layer.top,
            layer.channels.len()
        );

        Ok(layer)
    }

    /// Give a typed meaning to the records this library understands
    fn apply_extra_data(&mut self, record: &ExtraData) -> Result<(), PsdDecodeErrors> {
        match &record.key {
            b"TySh" => {
                self.text = Some(parse_text_descriptor(&record.data));
            }
            b"luni" => {
                let name = parse_unicode_name(&record.data)?;

                if !name.is_empty() {
                    self.name = name;
                }
            }
            b"lrFX" => {
                self.has_effects = true;
                self.effects = Some(parse_effects(&record.data)?);
            }
            b"lfx2" => {
                self.has_effects = true;
            }
            b"lsct" | b"lsdk" => {
                self.section_divider = Some(SectionDivider::parse(&record.data)?);
            }
            b"lclr" => {
                let color = ByteReader::new(&record.data).read_u16()?;
                self.color_tag = Some(SheetColor::from_int(color));
            }
            b"lspf" => {
                let flags = ByteReader::new(&record.data).read_u32()?;
                self.protection = Some(ProtectionFlags::from_bits_retain(flags));
            }
            _ => ()
        }
        Ok(())
    }

    /// Read and decompress this layer's channel blocks
    ///
    /// Blocks are consumed in declared channel order. Colour and alpha
    /// planes use the layer rectangle, the user mask plane uses the mask
    /// rectangle. A block extending past the end of data is fatal.
    pub fn load_pixel_data(
        &mut self, reader: &mut ByteReader, depth: BitDepth, options: &DecoderOptions
    ) -> Result<(), PsdDecodeErrors> {
        let layer_size = (self.height(), depth.columns(self.width()));
        let mask_size = self
            .mask
            .as_ref()
            .map_or((0, 0), |x| (x.height(), depth.columns(x.width())));

        for channel in self.channels.iter_mut() {
            let block = reader.read_bytes(channel.length as usize)?;
            channel.data = block.to_vec();

            if !options.get_decode_layer_pixels() {
                continue;
            }
            let (rows, columns) = if channel.id == CHANNEL_USER_MASK {
                mask_size
            } else {
                layer_size
            };
            let (compression, pixels) = decode_channel_block(block, rows, columns, options)?;

            channel.compression = compression;
            channel.pixels = pixels;
        }

        if let Some(mask) = self.mask.as_mut() {
            if mask.width() > 0 {
                if let Some(channel) = self.channels.iter().find(|x| x.id == CHANNEL_USER_MASK) {
                    mask.pixels = channel.pixels.clone();
                }
            }
        }
        Ok(())
    }
}

fn check_bounds(
    top: i32, left: i32, bottom: i32, right: i32, options: &DecoderOptions
) -> Result<(), PsdDecodeErrors> {
    if bottom < top || right < left {
        return Err(PsdDecodeErrors::InvalidLayerBounds);
    }
    let width = (i64::from(right) - i64::from(left)) as usize;
    let height = (i64::from(bottom) - i64::from(top)) as usize;

    if width > options.get_max_width() {
        return Err(PsdDecodeErrors::LargeDimensions(
            options.get_max_width(),
            width
        ));
    }
    if height > options.get_max_height() {
        return Err(PsdDecodeErrors::LargeDimensions(
            options.get_max_height(),
            height
        ));
    }
    Ok(())
}

/// Read the mask sub record, a zero length means no mask
fn parse_mask(
    reader: &mut ByteReader, options: &DecoderOptions
) -> Result<Option<Mask>, PsdDecodeErrors> {
    let length = reader.read_u32()? as usize;

    if length == 0 {
        return Ok(None);
    }
    // 20 or 36 bytes, the longer form repeats flags and rectangle for the
    // real user mask, which is not used here
    let mut data = reader.sub_reader(length)?;

    let top = data.read_i32()?;
    let left = data.read_i32()?;
    let bottom = data.read_i32()?;
    let right = data.read_i32()?;

    check_bounds(top, left, bottom, right, options)?;

    let default_color = data.read_u8()?;
    let flags = MaskFlags::from_bits_retain(data.read_u8()?);

    Ok(Some(Mask {
        top,
        left,
        bottom,
        right,
        default_color,
        flags,
        pixels: Vec::new()
    }))
}

/// Read a signature, key and length prefixed record
pub(crate) fn read_extra_data(reader: &mut ByteReader) -> Result<ExtraData, PsdDecodeErrors> {
    let signature = reader.read_fixed_bytes::<4>()?;

    if signature != SIGNATURE_8BIM && signature != SIGNATURE_8B64 {
        return Err(PsdDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
    }
    let key = reader.read_fixed_bytes::<4>()?;
    let length = reader.read_u32()? as usize;
    let data = reader.read_bytes(length)?.to_vec();

    Ok(ExtraData {
        signature,
        key,
        data
    })
}

/// Decode a `luni` record, a u32 count of UTF-16 code units followed by
/// the units, trailing NULs removed
fn parse_unicode_name(data: &[u8]) -> Result<String, PsdDecodeErrors> {
    let mut reader = ByteReader::new(data);
    let count = reader.read_u32()? as usize;
    let units = reader
        .read_bytes(count.saturating_mul(2))?
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    let name = char::decode_utf16(units)
        .map(|x| x.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect::<String>();

    Ok(String::from(name.trim_end_matches('\0')))
}

/// Decompress one channel block into a `rows * columns` plane
///
/// Blocks shorter than the compression field produce a zeroed plane.
/// Corrupt or unsupported data is a recoverable problem, the plane keeps
/// whatever was decoded before the problem.
pub(crate) fn decode_channel_block(
    block: &[u8], rows: usize, columns: usize, options: &DecoderOptions
) -> Result<(Option<CompressionMethod>, Vec<u8>), PsdDecodeErrors> {
    let size = rows
        .checked_mul(columns)
        .ok_or(PsdDecodeErrors::Generic("Channel plane size overflows"))?;
    let mut pixels = vec![0; size];

    if block.len() < 2 {
        return Ok((None, pixels));
    }
    let mut reader = ByteReader::new(block);
    let code = reader.read_u16()?;
    let compression = CompressionMethod::from_int(code);

    match compression {
        Some(CompressionMethod::NoCompression) => {
            let available = reader.remaining_bytes();
            let length = available.len().min(pixels.len());

            pixels[..length].copy_from_slice(&available[..length]);

            if length < pixels.len() {
                recoverable(
                    options,
                    PsdDecodeErrors::Generic("Raw channel data is shorter than its rectangle"),
                    "Short raw channel"
                )?;
            }
        }
        Some(CompressionMethod::RLE) => {
            // row byte counts, not needed for sequential decoding
            let result = reader
                .skip(rows.saturating_mul(2))
                .map_err(PsdDecodeErrors::from)
                .and_then(|_| rle::decode_rows(&mut reader, &mut pixels, rows, columns));

            if let Err(err) = result {
                recoverable(options, err, "Corrupt RLE channel data")?;
            }
        }
        Some(CompressionMethod::Zip | CompressionMethod::ZipPrediction) => {
            recoverable(
                options,
                PsdDecodeErrors::UnknownCompression(code),
                "ZIP compressed channel data is not supported, plane left empty"
            )?;
        }
        None => {
            recoverable(
                options,
                PsdDecodeErrors::UnknownCompression(code),
                "Unknown channel compression, plane left empty"
            )?;
        }
    }
    Ok((compression, pixels))
}
