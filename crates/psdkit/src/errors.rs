/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

use psdkit_core::bytestream::ByteIoError;
use psdkit_core::log::warn;
use psdkit_core::options::DecoderOptions;

use crate::constants::{MAX_CHANNELS, PSD_IDENTIFIER_BE};

/// Errors that can occur during PSD decoding
pub enum PsdDecodeErrors {
    WrongMagicBytes(u32),
    UnsupportedFileType(u16),
    UnsupportedChannelCount(u16),
    UnsupportedBitDepth(u16),
    UnknownColorMode(u16),
    /// Maximum allowed and the value found
    LargeDimensions(usize, usize),
    ZeroDimensions,
    UnknownCompression(u16),
    /// Expected signature and the one found
    BadSignature([u8; 4], [u8; 4]),
    InvalidLayerBounds,
    BadRLE,
    XmlError(String),
    Generic(&'static str),
    IoErrors(ByteIoError)
}

impl Debug for PsdDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PsdDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            PsdDecodeErrors::WrongMagicBytes(bytes) => {
                writeln!(
                    f,
                    "Expected {:?} but found  {:?}, not a PSD image",
                    PSD_IDENTIFIER_BE.to_be_bytes(),
                    bytes.to_be_bytes()
                )
            }
            PsdDecodeErrors::UnsupportedFileType(version) => {
                writeln!(
                    f,
                    "Unsupported file version {version:?}, known versions are 1",
                )
            }
            PsdDecodeErrors::UnsupportedChannelCount(channels) => {
                writeln!(
                    f,
                    "Unsupported channel count {channels:?}, expected 1 to {MAX_CHANNELS}"
                )
            }
            PsdDecodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(
                    f,
                    "Unsupported bit depth {depth:?}, supported depths are 1, 8 and 16",
                )
            }
            PsdDecodeErrors::UnknownColorMode(mode) => {
                writeln!(f, "Unknown color mode {mode}")
            }
            PsdDecodeErrors::UnknownCompression(method) => {
                writeln!(f, "Unknown or unsupported compression method {method}")
            }
            PsdDecodeErrors::BadSignature(expected, found) => {
                writeln!(
                    f,
                    "Bad signature, expected {:?} but found {:?}",
                    String::from_utf8_lossy(expected),
                    String::from_utf8_lossy(found)
                )
            }
            PsdDecodeErrors::InvalidLayerBounds => {
                writeln!(f, "Layer rectangle has a bottom or right edge before its top or left")
            }
            PsdDecodeErrors::BadRLE => {
                writeln!(f, "Bad RLE")
            }
            PsdDecodeErrors::XmlError(err) => {
                writeln!(f, "XMP metadata error: {err}")
            }
            PsdDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}",
                )
            }
            PsdDecodeErrors::ZeroDimensions => {
                writeln!(f, "Zero found where not expected")
            }
            PsdDecodeErrors::IoErrors(e) => {
                writeln!(f, "I/O error :{:?}", e)
            }
        }
    }
}

impl Display for PsdDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for PsdDecodeErrors {}

impl From<&'static str> for PsdDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ByteIoError> for PsdDecodeErrors {
    fn from(r: ByteIoError) -> Self {
        Self::IoErrors(r)
    }
}

/// Apply the recoverable error policy
///
/// In strict mode the error is returned, otherwise it is logged and
/// decoding carries on.
#[allow(unused_variables)]
pub(crate) fn recoverable(
    options: &DecoderOptions, err: PsdDecodeErrors, context: &str
) -> Result<(), PsdDecodeErrors> {
    if options.get_strict_mode() {
        return Err(err);
    }
    warn!("{context}: {err:?}");
    Ok(())
}
