/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A Photoshop PSD document decoder
//!
//! Unlike decoders that only extract the merged image, this one decodes the
//! document structure.
//!
//! # Features
//! - Header, colour mode data and image resources, with typed resolution,
//!   alpha channel names, thumbnail and XMP resources.
//! - Layer records with masks, names, extra data records, text layer
//!   properties and layer effects.
//! - Raw and RLE channel data for layers and the merged image.
//! - Layer group reconstruction, see [`tree`].
//! - Conversion of layers and the merged image to RGBA, see [`color`].
//! - No unsafe
//!
//! # Error handling
//! A broken header, a truncated section or channel block, or a layer record
//! without its blend signature stop decoding. Malformed optional records
//! (layer extra data, image resources, corrupt RLE inside a complete
//! block) are logged and skipped, unless
//! [`DecoderOptions::set_strict_mode`](psdkit_core::options::DecoderOptions::set_strict_mode)
//! is set.
//!
//! # Example
//! ```no_run
//! use psdkit::color::layer_to_rgba;
//! use psdkit::PsdDecoder;
//!
//! let data = std::fs::read("image.psd").unwrap();
//! let document = PsdDecoder::new(&data).decode().unwrap();
//!
//! for layer in &document.layers {
//!     if let Some(pixels) = layer_to_rgba(&document, layer) {
//!         println!("{}: {} bytes", layer.name, pixels.len());
//!     }
//! }
//! ```

// No std is not supported, colour conversion needs powf
// #![no_std]
#![forbid(unsafe_code)]
#![macro_use]
extern crate alloc;
extern crate core;
pub extern crate psdkit_core;
pub use decoder::PsdDecoder;
pub use document::Document;
pub use errors::PsdDecodeErrors;

pub mod color;
pub mod constants;
mod decoder;
pub mod document;
pub mod effects;
pub mod errors;
pub mod layer;
pub mod resources;
pub mod rle;
pub mod text;
pub mod tree;
