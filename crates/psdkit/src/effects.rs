/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Legacy layer effects (`lrFX`)
//!
//! The record is a version, an effect count and that many
//! `8BIM` + key + length prefixed entries. Entries are kept raw,
//! the common state and outer glow entries are decoded further.
use alloc::vec::Vec;

use psdkit_core::bytestream::ByteReader;

use crate::constants::SIGNATURE_8BIM;
use crate::errors::PsdDecodeErrors;

/// A single effect entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectEntry {
    /// Effect key, e.g. `dsdw` for drop shadow
    pub key:  [u8; 4],
    /// Entry bytes following the length field
    pub data: Vec<u8>
}

/// Decoded `oglw` entry
///
/// Consumers commonly use this as a text outline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OuterGlow {
    pub version:    u32,
    /// Blur size in pixels
    pub blur:       u8,
    pub intensity:  u32,
    /// High bytes of the glow colour components, RGBA order
    pub color:      [u8; 4],
    pub blend_mode: [u8; 4],
    pub enabled:    bool,
    pub opacity:    u8
}

impl OuterGlow {
    fn parse(data: &[u8]) -> Result<OuterGlow, PsdDecodeErrors> {
        let mut reader = ByteReader::new(data);

        let version = reader.read_u32()?;
        // blur lives in the second byte of the field
        let blur = reader.read_fixed_bytes::<4>()?[1];
        let intensity = reader.read_u32()?;
        // colour space id, then four 16 bit components
        reader.skip(2)?;
        let mut color = [0; 4];

        for component in color.iter_mut() {
            *component = (reader.read_u16()? >> 8) as u8;
        }
        let signature = reader.read_fixed_bytes::<4>()?;

        if signature != SIGNATURE_8BIM {
            return Err(PsdDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
        }
        let blend_mode = reader.read_fixed_bytes::<4>()?;
        let enabled = reader.read_u8()? != 0;
        let opacity = reader.read_u8()?;

        Ok(OuterGlow {
            version,
            blur,
            intensity,
            color,
            blend_mode,
            enabled,
            opacity
        })
    }

    /// Outline colour with opacity as alpha, fully transparent when the
    /// effect is disabled
    pub const fn outline_rgba(&self) -> [u8; 4] {
        if !self.enabled {
            return [0; 4];
        }
        [self.color[0], self.color[1], self.color[2], self.opacity]
    }
}

/// Effects attached to a layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerEffects {
    pub version:    u16,
    pub entries:    Vec<EffectEntry>,
    /// Visibility from the common state (`cmnS`) entry
    pub visible:    Option<bool>,
    pub outer_glow: Option<OuterGlow>
}

impl LayerEffects {
    /// Find an entry by its key
    pub fn entry(&self, key: &[u8; 4]) -> Option<&EffectEntry> {
        self.entries.iter().find(|x| &x.key == key)
    }
}

/// Parse the payload of a `lrFX` record
pub fn parse_effects(payload: &[u8]) -> Result<LayerEffects, PsdDecodeErrors> {
    let mut reader = ByteReader::new(payload);

    let version = reader.read_u16()?;
    let count = reader.read_u16()?;

    let mut effects = LayerEffects {
        version,
        ..LayerEffects::default()
    };

    for _ in 0..count {
        let signature = reader.read_fixed_bytes::<4>()?;

        if signature != SIGNATURE_8BIM {
            return Err(PsdDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
        }
        let key = reader.read_fixed_bytes::<4>()?;
        let length = reader.read_u32()? as usize;
        let data = reader.read_bytes(length)?;

        match &key {
            b"cmnS" => {
                // version, then the visible flag
                let mut common = ByteReader::new(data);
                common.skip(4)?;
                effects.visible = Some(common.read_u8()? != 0);
            }
            b"oglw" => {
                effects.outer_glow = Some(OuterGlow::parse(data)?);
            }
            _ => ()
        }
        effects.entries.push(EffectEntry {
            key,
            data: data.to_vec()
        });
    }
    Ok(effects)
}
