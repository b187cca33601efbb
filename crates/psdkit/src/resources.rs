/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image resources
//!
//! The resources section is a list of `8BIM` blocks, each carrying an id,
//! a Pascal string name and a length prefixed payload padded to an even
//! size. A few ids are given a typed meaning, everything else is kept raw.
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use psdkit_core::bytestream::ByteReader;
use psdkit_core::log::{trace, warn};
use psdkit_core::options::DecoderOptions;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::constants::{resource_ids, SIGNATURE_8BIM, SIGNATURE_MESA};
use crate::errors::{recoverable, PsdDecodeErrors};

/// Namespace prefix of the Photoshop XMP schema
const PHOTOSHOP_NS_PREFIX: &[u8] = b"photoshop";

/// Resolution info (1005)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolutionInfo {
    /// Horizontal resolution in pixels per inch
    pub h_res:       f32,
    /// 1 = pixels per inch, 2 = pixels per cm
    pub h_res_unit:  u16,
    pub width_unit:  u16,
    pub v_res:       f32,
    pub v_res_unit:  u16,
    pub height_unit: u16
}

impl ResolutionInfo {
    fn parse(data: &[u8]) -> Result<ResolutionInfo, PsdDecodeErrors> {
        let mut reader = ByteReader::new(data);
        // 16.16 fixed point
        let fixed = |x: u32| x as f32 / 65536.0;

        Ok(ResolutionInfo {
            h_res:       fixed(reader.read_u32()?),
            h_res_unit:  reader.read_u16()?,
            width_unit:  reader.read_u16()?,
            v_res:       fixed(reader.read_u32()?),
            v_res_unit:  reader.read_u16()?,
            height_unit: reader.read_u16()?
        })
    }
}

/// Embedded preview image (1033, 1036)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Set for the Photoshop 4 variant whose pixels are BGR
    pub legacy_bgr:      bool,
    /// 1 = JFIF, 0 = raw RGB
    pub format:          u32,
    pub width:           u32,
    pub height:          u32,
    /// Padded row size
    pub width_bytes:     u32,
    pub total_size:      u32,
    pub compressed_size: u32,
    pub bits_per_pixel:  u16,
    pub planes:          u16,
    /// Image data, usually a JFIF stream
    pub data:            Vec<u8>
}

impl Thumbnail {
    fn parse(data: &[u8], legacy_bgr: bool) -> Result<Thumbnail, PsdDecodeErrors> {
        let mut reader = ByteReader::new(data);

        Ok(Thumbnail {
            legacy_bgr,
            format: reader.read_u32()?,
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            width_bytes: reader.read_u32()?,
            total_size: reader.read_u32()?,
            compressed_size: reader.read_u32()?,
            bits_per_pixel: reader.read_u16()?,
            planes: reader.read_u16()?,
            data: reader.remaining_bytes().to_vec()
        })
    }
}

/// XMP packet (1060)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpMetadata {
    pub packet:   String,
    /// Value of `photoshop:Category`
    pub category: Option<String>
}

impl XmpMetadata {
    fn parse(data: &[u8]) -> Result<XmpMetadata, PsdDecodeErrors> {
        let packet = core::str::from_utf8(data)
            .map_err(|_| PsdDecodeErrors::Generic("XMP packet is not valid UTF-8"))?;
        // packets are often NUL padded
        let packet = packet.trim_end_matches('\0');
        let category = find_category(packet)?;

        Ok(XmpMetadata {
            packet: String::from(packet),
            category
        })
    }
}

/// Find `photoshop:Category`, written either as an element or as an
/// attribute of `rdf:Description`
fn find_category(packet: &str) -> Result<Option<String>, PsdDecodeErrors> {
    let mut xml = Reader::from_str(packet);
    xml.config_mut().trim_text(true);

    let mut inside = false;
    let mut text = String::new();

    loop {
        match xml.read_event() {
            Ok(Event::Start(e)) => {
                if is_category(e.name().as_ref()) {
                    inside = true;
                    text.clear();
                } else if let Some(value) = category_attribute(&e) {
                    return Ok(Some(value));
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(value) = category_attribute(&e) {
                    return Ok(Some(value));
                }
            }
            Ok(Event::Text(e)) if inside => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Ok(Event::End(e)) if inside && is_category(e.name().as_ref()) => {
                return Ok(Some(String::from(text.trim())));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PsdDecodeErrors::XmlError(format!("{e}"))),
            _ => {}
        }
    }
    Ok(None)
}

fn is_category(name: &[u8]) -> bool {
    match name.iter().position(|x| *x == b':') {
        Some(colon) => &name[..colon] == PHOTOSHOP_NS_PREFIX && &name[colon + 1..] == b"Category",
        None => false
    }
}

fn category_attribute(e: &quick_xml::events::BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| is_category(a.key.as_ref()))
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Typed view of a resource payload
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceKind {
    ResolutionInfo(ResolutionInfo),
    AlphaChannelNames(Vec<String>),
    Thumbnail(Thumbnail),
    XmpMetadata(XmpMetadata),
    /// Ids without a typed meaning, or payloads that failed to decode
    Other
}

/// One image resource block
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// `8BIM` or `MeSa`
    pub signature: [u8; 4],
    pub id:        u16,
    pub name:      String,
    /// Payload without the even padding
    pub data:      Vec<u8>,
    pub kind:      ResourceKind
}

impl Resource {
    /// Read one resource block
    ///
    /// Returns an error for a bad signature or a truncated block, the
    /// caller decides whether to keep going.
    pub fn parse(reader: &mut ByteReader) -> Result<Resource, PsdDecodeErrors> {
        let signature = reader.read_fixed_bytes::<4>()?;

        if signature != SIGNATURE_8BIM && signature != SIGNATURE_MESA {
            return Err(PsdDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
        }
        let id = reader.read_u16()?;
        let name = reader.read_pascal_string()?;
        let length = reader.read_u32()? as usize;
        let data = reader.read_bytes(length)?.to_vec();

        if length % 2 == 1 && !reader.is_eof() {
            reader.skip(1)?;
        }
        let kind = decode_kind(id, &data);

        trace!("Resource {id} {name:?}, {length} bytes");

        Ok(Resource {
            signature,
            id,
            name,
            data,
            kind
        })
    }
}

#[allow(unused_variables)]
fn decode_kind(id: u16, data: &[u8]) -> ResourceKind {
    let result = match id {
        resource_ids::RESOLUTION_INFO => ResolutionInfo::parse(data).map(ResourceKind::ResolutionInfo),
        resource_ids::ALPHA_CHANNEL_NAMES => parse_alpha_names(data).map(ResourceKind::AlphaChannelNames),
        resource_ids::THUMBNAIL_LEGACY => Thumbnail::parse(data, true).map(ResourceKind::Thumbnail),
        resource_ids::THUMBNAIL => Thumbnail::parse(data, false).map(ResourceKind::Thumbnail),
        resource_ids::XMP_METADATA => XmpMetadata::parse(data).map(ResourceKind::XmpMetadata),
        _ => Ok(ResourceKind::Other)
    };
    match result {
        Ok(kind) => kind,
        Err(err) => {
            warn!("Could not decode resource {id}, keeping raw bytes: {err:?}");
            ResourceKind::Other
        }
    }
}

/// Alpha channel names, a run of unpadded Pascal strings
fn parse_alpha_names(data: &[u8]) -> Result<Vec<String>, PsdDecodeErrors> {
    let mut reader = ByteReader::new(data);
    let mut names = Vec::new();

    while !reader.is_eof() {
        names.push(reader.read_pascal_string_aligned(1)?);
    }
    Ok(names)
}

/// Read every resource in the section
///
/// A malformed block ends the section, the remaining bytes are skipped.
pub fn parse_resources(
    reader: &mut ByteReader, options: &DecoderOptions
) -> Result<Vec<Resource>, PsdDecodeErrors> {
    let mut resources = Vec::new();

    while !reader.is_eof() {
        match Resource::parse(reader) {
            Ok(resource) => resources.push(resource),
            Err(err) => {
                recoverable(options, err, "Malformed image resource, skipping rest of section")?;
                reader.set_position(reader.len());
            }
        }
    }
    Ok(resources)
}
