/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Writes PSD files from a small description

use psdkit::rle::encode_row;
use psdkit_core::bytestream::ByteWriter;
use serde::Deserialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Raw,
    Rle
}

impl Compression {
    const fn code(self) -> u16 {
        match self {
            Compression::Raw => 0,
            Compression::Rle => 1
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TestChannel {
    pub id:     i16,
    /// Pixels are generated from this seed unless given
    #[serde(default)]
    pub seed:   u32,
    #[serde(default)]
    pub pixels: Option<Vec<u8>>
}

#[derive(Clone, Debug, Deserialize)]
pub struct TestMask {
    /// top, left, bottom, right
    pub rect:  [i32; 4],
    #[serde(default)]
    pub flags: u8
}

#[derive(Clone, Debug, Deserialize)]
pub struct TestLayer {
    pub name:         String,
    /// top, left, bottom, right
    #[serde(default)]
    pub rect:         [i32; 4],
    #[serde(default)]
    pub flags:        u8,
    #[serde(default)]
    pub opacity:      Option<u8>,
    #[serde(default)]
    pub compression:  Compression,
    #[serde(default)]
    pub channels:     Vec<TestChannel>,
    #[serde(default)]
    pub mask:         Option<TestMask>,
    /// Written as a `luni` record
    #[serde(default)]
    pub unicode_name: Option<String>,
    /// Extra data records as key and raw bytes
    #[serde(default)]
    pub records:      Vec<(String, Vec<u8>)>
}

#[derive(Clone, Debug, Deserialize)]
pub struct TestDocument {
    pub name:            String,
    pub width:           u32,
    pub height:          u32,
    #[serde(default = "default_depth")]
    pub depth:           u16,
    pub mode:            u16,
    pub channels:        u16,
    #[serde(default)]
    pub compression:     Compression,
    #[serde(default)]
    pub color_mode_data: Vec<u8>,
    /// Image resources as id and payload
    #[serde(default)]
    pub resources:       Vec<(u16, Vec<u8>)>,
    #[serde(default)]
    pub negative_count:  bool,
    #[serde(default)]
    pub layers:          Vec<TestLayer>,
    /// Merged planes, generated when missing
    #[serde(default)]
    pub merged:          Option<Vec<Vec<u8>>>,
    /// Expected tree, see `render_tree`
    #[serde(default)]
    pub tree:            String,
    #[serde(default)]
    pub comment:         Option<String>
}

const fn default_depth() -> u16 {
    8
}

/// Deterministic test pixels
pub fn pattern(seed: u32, length: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);

    (0..length)
        .map(|x| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            // runs of four, so RLE has something to do
            if (x / 4) % 2 == 0 {
                (seed as u8).wrapping_add((x / 4) as u8)
            } else {
                (state >> 16) as u8
            }
        })
        .collect()
}

impl TestChannel {
    pub fn pixels_for(&self, length: usize) -> Vec<u8> {
        self.pixels.clone().unwrap_or_else(|| pattern(self.seed, length))
    }
}

impl TestLayer {
    pub const fn width(&self) -> usize {
        (self.rect[3] - self.rect[1]) as usize
    }
    pub const fn height(&self) -> usize {
        (self.rect[2] - self.rect[0]) as usize
    }

    /// Rows and bytes per row of a channel's plane
    pub fn plane_size(&self, channel: &TestChannel, bytes_per_sample: usize) -> (usize, usize) {
        match (&self.mask, channel.id) {
            (Some(mask), -2) => (
                (mask.rect[2] - mask.rect[0]) as usize,
                (mask.rect[3] - mask.rect[1]) as usize * bytes_per_sample
            ),
            _ => (self.height(), self.width() * bytes_per_sample)
        }
    }
}

impl TestDocument {
    pub const fn bytes_per_sample(&self) -> usize {
        if self.depth == 16 {
            2
        } else {
            1
        }
    }

    pub fn plane_length(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_sample()
    }

    /// Merged plane `index`
    pub fn merged_plane(&self, index: u16) -> Vec<u8> {
        match self.merged.as_ref().and_then(|x| x.get(usize::from(index))) {
            Some(plane) => plane.clone(),
            None => pattern(1000 + u32::from(index), self.plane_length())
        }
    }

    /// Channel pixels of a layer as they should decode
    pub fn layer_pixels(&self, layer: &TestLayer, channel: &TestChannel) -> Vec<u8> {
        let (rows, columns) = layer.plane_size(channel, self.bytes_per_sample());
        channel.pixels_for(rows * columns)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();

        writer.write_all(b"8BPS");
        writer.write_u16_be(1);
        writer.write_all(&[0; 6]);
        writer.write_u16_be(self.channels);
        writer.write_u32_be(self.height);
        writer.write_u32_be(self.width);
        writer.write_u16_be(self.depth);
        writer.write_u16_be(self.mode);

        writer.write_u32_be(self.color_mode_data.len() as u32);
        writer.write_all(&self.color_mode_data);

        let resources = self.resource_section();
        writer.write_u32_be(resources.len() as u32);
        writer.write_all(&resources);

        let section = self.layer_and_mask();
        writer.write_u32_be(section.len() as u32);
        writer.write_all(&section);

        writer.write_u16_be(self.compression.code());

        let planes: Vec<Vec<u8>> = (0..self.channels).map(|x| self.merged_plane(x)).collect();
        let columns = self.width as usize * self.bytes_per_sample();

        match self.compression {
            Compression::Raw => {
                for plane in &planes {
                    writer.write_all(plane);
                }
            }
            Compression::Rle => {
                let packed: Vec<Vec<u8>> = planes
                    .iter()
                    .flat_map(|x| x.chunks_exact(columns))
                    .map(encode_row)
                    .collect();

                for row in &packed {
                    writer.write_u16_be(row.len() as u16);
                }
                for row in &packed {
                    writer.write_all(row);
                }
            }
        }
        writer.into_inner()
    }

    fn resource_section(&self) -> Vec<u8> {
        let mut section = ByteWriter::new();

        for (id, data) in &self.resources {
            section.write_all(b"8BIM");
            section.write_u16_be(*id);
            section.write_pascal_string(b"", 2);
            section.write_u32_be(data.len() as u32);
            section.write_all(data);
            if data.len() % 2 == 1 {
                section.write_u8(0);
            }
        }
        section.into_inner()
    }

    fn layer_and_mask(&self) -> Vec<u8> {
        let mut section = ByteWriter::new();

        if self.layers.is_empty() {
            section.write_u32_be(0);
        } else {
            let mut info = self.layer_info();
            if info.len() % 2 == 1 {
                info.push(0);
            }
            section.write_u32_be(info.len() as u32);
            section.write_all(&info);
        }
        // global layer mask
        section.write_u32_be(0);
        section.into_inner()
    }

    fn layer_info(&self) -> Vec<u8> {
        let mut info = ByteWriter::new();
        let count = self.layers.len() as i16;

        info.write_i16_be(if self.negative_count { -count } else { count });

        let blocks: Vec<Vec<Vec<u8>>> = self
            .layers
            .iter()
            .map(|layer| {
                layer
                    .channels
                    .iter()
                    .map(|channel| self.channel_block(layer, channel))
                    .collect()
            })
            .collect();

        for (layer, blocks) in self.layers.iter().zip(&blocks) {
            write_layer_record(&mut info, layer, blocks);
        }
        for block in blocks.iter().flatten() {
            info.write_all(block);
        }
        info.into_inner()
    }

    fn channel_block(&self, layer: &TestLayer, channel: &TestChannel) -> Vec<u8> {
        let (rows, columns) = layer.plane_size(channel, self.bytes_per_sample());
        let pixels = channel.pixels_for(rows * columns);

        let mut block = ByteWriter::new();
        block.write_u16_be(layer.compression.code());

        match layer.compression {
            Compression::Raw => block.write_all(&pixels),
            Compression::Rle => {
                if columns > 0 {
                    let packed: Vec<Vec<u8>> = pixels.chunks_exact(columns).map(encode_row).collect();

                    for row in &packed {
                        block.write_u16_be(row.len() as u16);
                    }
                    for row in &packed {
                        block.write_all(row);
                    }
                }
            }
        }
        block.into_inner()
    }
}

fn write_layer_record(writer: &mut ByteWriter, layer: &TestLayer, blocks: &[Vec<u8>]) {
    for edge in layer.rect {
        writer.write_i32_be(edge);
    }
    writer.write_u16_be(layer.channels.len() as u16);

    for (channel, block) in layer.channels.iter().zip(blocks) {
        writer.write_i16_be(channel.id);
        writer.write_u32_be(block.len() as u32);
    }
    writer.write_all(b"8BIMnorm");
    writer.write_u8(layer.opacity.unwrap_or(255));
    // clipping, flags, filler
    writer.write_u8(0);
    writer.write_u8(layer.flags);
    writer.write_u8(0);

    let mut extra = ByteWriter::new();

    match &layer.mask {
        Some(mask) => {
            extra.write_u32_be(20);
            for edge in mask.rect {
                extra.write_i32_be(edge);
            }
            extra.write_all(&[255, mask.flags, 0, 0]);
        }
        None => extra.write_u32_be(0)
    }
    // blending ranges
    extra.write_u32_be(0);
    extra.write_pascal_string(layer.name.as_bytes(), 4);

    if let Some(name) = &layer.unicode_name {
        let units: Vec<u16> = name.encode_utf16().collect();
        let mut data = ByteWriter::new();

        data.write_u32_be(units.len() as u32);
        for unit in units {
            data.write_u16_be(unit);
        }
        write_record(&mut extra, b"luni", data.as_slice());
    }
    for (key, data) in &layer.records {
        let mut code = [b' '; 4];
        for (out, byte) in code.iter_mut().zip(key.bytes()) {
            *out = byte;
        }
        write_record(&mut extra, &code, data);
    }

    let extra = extra.into_inner();
    writer.write_u32_be(extra.len() as u32);
    writer.write_all(&extra);
}

pub fn write_record(writer: &mut ByteWriter, key: &[u8; 4], data: &[u8]) {
    writer.write_all(b"8BIM");
    writer.write_all(key);
    writer.write_u32_be(data.len() as u32);
    writer.write_all(data);
}
