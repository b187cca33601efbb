/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder options
//!
//! This module exposes a struct through which the decoder
//! gets its configuration
pub use decoder::DecoderOptions;

mod decoder;
