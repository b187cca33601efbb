/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Text layer properties
//!
//! A `TySh` record carries a binary descriptor with an embedded
//! engine data blob, a loosely structured text document that looks like
//!
//! ```text
//! /Text (þÿ..utf16..)
//! /Justification 2
//! /FontSize 24.0
//! /FillColor << /Type 1 /Values [ 1.0 0.2 0.4 0.6 ] >>
//! /FontSet [ << /Name (þÿ..utf16..) >> ]
//! ```
//!
//! Fields are located by scanning forward for their markers, so they are
//! read in the order they appear in the payload. Every reader here is
//! lenient, malformed values become empty strings or `0.0`.
use alloc::string::String;
use alloc::vec::Vec;

use psdkit_core::bytestream::ByteReader;

/// Paragraph alignment of a text layer
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
    Center
}

impl Justification {
    pub const fn from_int(value: u8) -> Justification {
        match value {
            1 => Justification::Right,
            2 => Justification::Center,
            _ => Justification::Left
        }
    }
}

/// Fill colour of a text run, each component in `0.0..=1.0`
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TextColor {
    pub alpha: f32,
    pub red:   f32,
    pub green: f32,
    pub blue:  f32
}

impl TextColor {
    /// Convert to 8 bit RGBA
    pub fn to_rgba8(self) -> [u8; 4] {
        let scale = |x: f32| (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [
            scale(self.red),
            scale(self.green),
            scale(self.blue),
            scale(self.alpha)
        ]
    }
}

/// Properties of a text layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextInfo {
    pub text:          String,
    pub font_name:     String,
    pub font_size:     f32,
    pub fill_color:    TextColor,
    pub justification: Justification,
    pub warp_style:    String,
    /// Affine transform `xx, xy, yx, yy, tx, ty` placing the text
    pub transform:     Option<[f64; 6]>
}

/// Parse the payload of a `TySh` record
///
/// This never fails, fields that cannot be found keep their defaults.
pub fn parse_text_descriptor(payload: &[u8]) -> TextInfo {
    let mut info = TextInfo {
        transform: read_transform(payload),
        ..TextInfo::default()
    };
    let mut reader = ByteReader::new(payload);

    if reader.seek_to(b"/Text") {
        info.text = read_descriptor_string(&mut reader);
    }

    if reader.seek_to(b"/Justification") {
        skip_spaces(&mut reader);
        let code = reader.read_u8().unwrap_or(b'0');
        info.justification = Justification::from_int(code.wrapping_sub(b'0'));
    }

    if reader.seek_to(b"/FontSize ") {
        info.font_size = reader.read_descriptor_float();
    }

    if reader.seek_to(b"/FillColor") && reader.seek_to(b"/Values [ ") {
        let alpha = reader.read_descriptor_float();
        let red = reader.read_descriptor_float();
        let green = reader.read_descriptor_float();
        let blue = reader.read_descriptor_float();

        info.fill_color = TextColor {
            alpha,
            red,
            green,
            blue
        };
    }

    if reader.seek_to(b"/FontSet ") && reader.seek_to(b"/Name") {
        info.font_name = read_descriptor_string(&mut reader);
    }
    // the first occurrence is the key of the warp descriptor,
    // the second the enum type id preceding the value
    if reader.seek_to(b"warpStyle") && reader.seek_to(b"warpStyle") {
        info.warp_style = read_descriptor_id(&mut reader).unwrap_or_default();
    }
    info
}

/// Read the six transform doubles at the start of a `TySh` payload
fn read_transform(payload: &[u8]) -> Option<[f64; 6]> {
    let mut reader = ByteReader::new(payload);

    if reader.read_u16().ok()? != 1 {
        return None;
    }
    let mut transform = [0.0; 6];

    for value in transform.iter_mut() {
        *value = f64::from_bits(reader.read_u64().ok()?);
    }
    Some(transform)
}

fn skip_spaces(reader: &mut ByteReader) {
    while reader.peek_u8() == Some(b' ') {
        let _ = reader.read_u8();
    }
}

/// Read a parenthesised engine data string
///
/// The string may start with a `FE FF` byte order mark, in which case it is
/// UTF-16 big endian, otherwise bytes are taken as Latin-1. A backslash
/// escapes the next byte, an unescaped `)` ends the string.
pub fn read_descriptor_string(reader: &mut ByteReader) -> String {
    skip_spaces(reader);

    if reader.peek_u8() != Some(b'(') {
        return String::new();
    }
    let _ = reader.read_u8();

    let mut bytes = Vec::new();
    let mut terminated = false;

    while let Ok(byte) = reader.read_u8() {
        match byte {
            b'\\' => match reader.read_u8() {
                Ok(escaped) => bytes.push(escaped),
                Err(_) => break
            },
            b')' => {
                terminated = true;
                break;
            }
            _ => bytes.push(byte)
        }
    }
    if !terminated {
        return String::new();
    }
    decode_string_bytes(&bytes)
}

fn decode_string_bytes(bytes: &[u8]) -> String {
    let mut string = match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

            char::decode_utf16(units)
                .map(|x| x.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect::<String>()
        }
        _ => bytes.iter().map(|x| char::from(*x)).collect()
    };
    let trimmed = string.trim_end_matches('\0').len();
    string.truncate(trimmed);
    string
}

/// Read a descriptor class or enum id, a u32 length followed by that
/// many bytes, with a length of zero meaning a four character code
fn read_descriptor_id(reader: &mut ByteReader) -> Option<String> {
    let length = match reader.read_u32().ok()? {
        0 => 4,
        length => length as usize
    };
    let bytes = reader.read_bytes(length).ok()?;
    Some(bytes.iter().map(|x| char::from(*x)).collect())
}
