/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global Decoder options

/// Largest width and height a PSD document may declare
pub const PSD_MAX_DIMENSIONS: usize = 30_000;

/// Decoder options
///
/// Options are set with builder style `set_*` methods and
/// read back with the matching `get_*` methods
///
/// ```
/// use psdkit_core::options::DecoderOptions;
/// let options = DecoderOptions::default()
///     .set_strict_mode(true)
///     .set_max_width(4096);
/// assert!(options.get_strict_mode());
/// assert_eq!(options.get_max_width(), 4096);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 30000
    max_width:           usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 30000
    max_height:          usize,
    /// Treat recoverable problems as errors
    ///
    /// Many files carry vendor specific or slightly broken
    /// extension records, by default these are logged and skipped.
    ///
    /// - Default value: false
    strict_mode:         bool,
    /// Read the merged composite image
    ///
    /// - Default value: true
    decode_merged_image: bool,
    /// Decompress per layer channel data
    ///
    /// When false the channel blocks are still walked but their
    /// pixel buffers are left empty
    ///
    /// - Default value: true
    decode_layer_pixels: bool
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:           PSD_MAX_DIMENSIONS,
            max_height:          PSD_MAX_DIMENSIONS,
            strict_mode:         false,
            decode_merged_image: true,
            decode_layer_pixels: true
        }
    }
}

impl DecoderOptions {
    /// Options that error out on every recoverable problem
    pub fn new_strict() -> DecoderOptions {
        DecoderOptions::default().set_strict_mode(true)
    }

    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Return true whether the decoder should be in strict mode
    /// And reject most errors
    pub const fn get_strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub const fn get_decode_merged_image(&self) -> bool {
        self.decode_merged_image
    }

    pub const fn get_decode_layer_pixels(&self) -> bool {
        self.decode_layer_pixels
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Set whether the decoder should be in strict mode
    ///
    /// In strict mode a malformed extra data record, a bad resource
    /// signature or a corrupt RLE stream stops decoding with an error
    /// instead of being logged and skipped.
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.strict_mode = yes;
        self
    }

    /// Set whether the merged composite image is read
    pub fn set_decode_merged_image(mut self, yes: bool) -> Self {
        self.decode_merged_image = yes;
        self
    }

    /// Set whether layer channel data is decompressed
    pub fn set_decode_layer_pixels(mut self, yes: bool) -> Self {
        self.decode_layer_pixels = yes;
        self
    }
}
