/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The PSD document loader
//!
//! A PSD file is a fixed header followed by four length prefixed sections,
//! colour mode data, image resources, layer and mask information and the
//! merged image, which runs to the end of the file.
//!
//! Sections are read strictly in order against a single cursor.
use alloc::vec;
use alloc::vec::Vec;

use psdkit_core::bit_depth::BitDepth;
use psdkit_core::bytestream::ByteReader;
use psdkit_core::log::trace;
use psdkit_core::options::DecoderOptions;

use crate::constants::{ColorModes, CompressionMethod, MAX_CHANNELS, PSD_IDENTIFIER_BE};
use crate::document::Document;
use crate::errors::{recoverable, PsdDecodeErrors};
use crate::layer::{read_extra_data, ExtraData, Layer};
use crate::resources::parse_resources;
use crate::rle;

/// Size of the fixed file header
const HEADER_SIZE: usize = 26;

/// Smallest tagged block, signature, key and length
const MIN_TAGGED_BLOCK: usize = 12;

/// A Photoshop document reader
///
/// Decodes the whole layered document, not only the merged image.
///
/// # Example
/// ```no_run
/// use psdkit::PsdDecoder;
///
/// let data = std::fs::read("image.psd").unwrap();
/// let document = PsdDecoder::new(&data).decode().unwrap();
///
/// for node in document.layer_tree() {
///     println!("{} {}", node.layer.name, node.children.len());
/// }
/// ```
pub struct PsdDecoder<'a> {
    stream:         ByteReader<'a>,
    options:        DecoderOptions,
    decoded_header: bool,
    width:          usize,
    height:         usize,
    channel_count:  u16,
    depth:          BitDepth,
    color_mode:     Option<ColorModes>
}

impl<'a> PsdDecoder<'a> {
    /// Create a new decoder reading a PSD file from `data`
    pub fn new(data: &'a [u8]) -> PsdDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with options that influence decoding routines
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PsdDecoder<'a> {
        PsdDecoder {
            stream: ByteReader::new(data),
            options,
            decoded_header: false,
            width: 0,
            height: 0,
            channel_count: 0,
            depth: BitDepth::Eight,
            color_mode: None
        }
    }

    /// Decode the fixed file header
    ///
    /// Confirms this is a version 1 PSD file and extracts dimensions,
    /// channel count, depth and colour mode. Every failure here is fatal.
    pub fn decode_headers(&mut self) -> Result<(), PsdDecodeErrors> {
        if self.decoded_header {
            return Ok(());
        }
        let magic = self.stream.read_u32()?;

        if magic != PSD_IDENTIFIER_BE {
            return Err(PsdDecodeErrors::WrongMagicBytes(magic));
        }
        let version = self.stream.read_u16()?;

        if version != 1 {
            return Err(PsdDecodeErrors::UnsupportedFileType(version));
        }
        // reserved
        self.stream.skip(6)?;

        let channel_count = self.stream.read_u16()?;

        if channel_count == 0 || channel_count > MAX_CHANNELS {
            return Err(PsdDecodeErrors::UnsupportedChannelCount(channel_count));
        }

        let height = self.stream.read_u32()? as usize;
        let width = self.stream.read_u32()? as usize;

        if width > self.options.get_max_width() {
            return Err(PsdDecodeErrors::LargeDimensions(
                self.options.get_max_width(),
                width
            ));
        }
        if height > self.options.get_max_height() {
            return Err(PsdDecodeErrors::LargeDimensions(
                self.options.get_max_height(),
                height
            ));
        }
        if width == 0 || height == 0 {
            return Err(PsdDecodeErrors::ZeroDimensions);
        }

        let depth = self.stream.read_u16()?;
        let depth = BitDepth::from_int(depth).ok_or(PsdDecodeErrors::UnsupportedBitDepth(depth))?;

        let color_mode = self.stream.read_u16()?;
        let color_mode =
            ColorModes::from_int(color_mode).ok_or(PsdDecodeErrors::UnknownColorMode(color_mode))?;

        self.width = width;
        self.height = height;
        self.channel_count = channel_count;
        self.depth = depth;
        self.color_mode = Some(color_mode);
        self.decoded_header = true;

        trace!("Image width: {}", self.width);
        trace!("Image height: {}", self.height);
        trace!("Channels: {}", self.channel_count);
        trace!("Bit depth: {:?}", self.depth);
        trace!("Color mode: {:?}", color_mode);

        Ok(())
    }

    /// Width and height of the document, `None` before the headers are
    /// decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_header {
            return Some((self.width, self.height));
        }
        None
    }

    pub const fn bit_depth(&self) -> Option<BitDepth> {
        if self.decoded_header {
            return Some(self.depth);
        }
        None
    }

    pub const fn color_mode(&self) -> Option<ColorModes> {
        self.color_mode
    }

    /// Decode the whole document
    ///
    /// Structural problems (header, a section or channel block running past
    /// the end of data, a layer record without its blend signature) are
    /// fatal. Problems inside optional records are logged and skipped
    /// unless the decoder is in strict mode.
    pub fn decode(&mut self) -> Result<Document, PsdDecodeErrors> {
        self.decode_headers()?;
        self.stream.set_position(HEADER_SIZE);

        let color_mode = self.color_mode.ok_or("Color mode not decoded")?;

        let mut document = Document {
            width: self.width,
            height: self.height,
            depth: self.depth,
            channels: self.channel_count,
            color_mode,
            color_mode_data: Vec::new(),
            resources: Vec::new(),
            layers: Vec::new(),
            absolute_alpha: false,
            global_mask: Vec::new(),
            global_extra_data: Vec::new(),
            merged_compression: None,
            merged: Vec::new()
        };

        let length = self.stream.read_u32()? as usize;
        trace!("Color mode data length: {length}");
        document.color_mode_data = self.stream.read_bytes(length)?.to_vec();

        let length = self.stream.read_u32()? as usize;
        trace!("Image resources length: {length}");
        let mut resources = self.stream.sub_reader(length)?;
        document.resources = parse_resources(&mut resources, &self.options)?;

        let length = self.stream.read_u32()? as usize;
        trace!("Layer and mask information length: {length}");
        let mut section = self.stream.sub_reader(length)?;
        self.decode_layer_and_mask(&mut section, &mut document)?;

        if self.options.get_decode_merged_image() {
            self.decode_merged(&mut document)?;
        }
        Ok(document)
    }

    fn decode_layer_and_mask(
        &self, section: &mut ByteReader, document: &mut Document
    ) -> Result<(), PsdDecodeErrors> {
        if section.is_eof() {
            return Ok(());
        }
        let length = section.read_u32()? as usize;
        trace!("Layer info length: {length}");

        if length > 0 {
            let mut info = section.sub_reader(length)?;
            let (layers, absolute_alpha) = self.read_layers(&mut info)?;

            document.layers = layers;
            document.absolute_alpha = absolute_alpha;
        }

        if section.is_eof() {
            return Ok(());
        }
        let length = section.read_u32()? as usize;
        trace!("Global layer mask length: {length}");
        document.global_mask = section.read_bytes(length)?.to_vec();

        document.global_extra_data = self.read_global_blocks(section)?;

        if document.layers.is_empty() {
            if let Some(block) = document.global_extra_data.iter().find(|x| &x.key == b"Lr16") {
                trace!("Reading layers from the 16 bit layer block");

                let mut info = ByteReader::new(&block.data);
                let (layers, absolute_alpha) = self.read_layers(&mut info)?;

                document.layers = layers;
                document.absolute_alpha = absolute_alpha;
            }
        }
        Ok(())
    }

    /// Read layer records followed by their channel data
    fn read_layers(&self, reader: &mut ByteReader) -> Result<(Vec<Layer>, bool), PsdDecodeErrors> {
        if reader.is_eof() {
            return Ok((Vec::new(), false));
        }
        let count = reader.read_i16()?;
        // a negative count flags the first alpha channel as merged transparency
        let absolute_alpha = count < 0;
        let count = usize::from(count.unsigned_abs());

        trace!("Layer count: {count}, absolute alpha: {absolute_alpha}");

        let mut layers = Vec::with_capacity(count);

        for _ in 0..count {
            layers.push(Layer::parse(reader, &self.options)?);
        }
        for layer in layers.iter_mut() {
            layer.load_pixel_data(reader, self.depth, &self.options)?;
        }
        Ok((layers, absolute_alpha))
    }

    /// Tagged blocks trailing the global layer mask
    fn read_global_blocks(&self, section: &mut ByteReader) -> Result<Vec<ExtraData>, PsdDecodeErrors> {
        let mut blocks = Vec::new();

        // anything shorter than a block header is padding
        while section.remaining() >= MIN_TAGGED_BLOCK {
            match read_extra_data(section) {
                Ok(block) => {
                    trace!(
                        "Global tagged block {:?}, {} bytes",
                        core::str::from_utf8(&block.key),
                        block.data.len()
                    );
                    blocks.push(block);
                }
                Err(err) => {
                    recoverable(&self.options, err, "Malformed global tagged block, skipping rest")?;
                    break;
                }
            }
        }
        Ok(blocks)
    }

    /// Read the merged composite, one plane per document channel
    fn decode_merged(&mut self, document: &mut Document) -> Result<(), PsdDecodeErrors> {
        let code = self.stream.read_u16()?;
        let compression = CompressionMethod::from_int(code);

        trace!("Merged image compression: {:?}", compression);

        let rows = self.height;
        let columns = self.depth.columns(self.width);
        let channels = usize::from(self.channel_count);

        let mut planes = Vec::with_capacity(channels);

        match compression {
            Some(CompressionMethod::NoCompression) => {
                for _ in 0..channels {
                    planes.push(self.stream.read_bytes(rows * columns)?.to_vec());
                }
            }
            Some(CompressionMethod::RLE) => {
                // row byte counts of every channel, decoding is sequential
                self.stream.skip(channels * rows * 2)?;

                for _ in 0..channels {
                    let mut plane = vec![0; rows * columns];
                    rle::decode_rows(&mut self.stream, &mut plane, rows, columns)?;
                    planes.push(plane);
                }
            }
            _ => return Err(PsdDecodeErrors::UnknownCompression(code))
        }

        document.merged_compression = compression;
        document.merged = planes;

        Ok(())
    }
}
