/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the psdkit crates
//!
//! This crate provides the byte level plumbing the PSD decoder
//! is built on.
//!
//! It currently contains
//!
//! - A big endian bytestream reader and writer over in-memory buffers
//! - Explicit byte swapping helpers
//! - Bit depth information shared by documents
//! - Decoder options
//! - A logging shim that forwards to the `log` crate when enabled
//!
//! This library is `#[no_std]` with `alloc` needed for defining `Vec`
//! and `String`.
//!
//! # Features
//!  - `std`: Enables `std::error::Error` impls.
//!
//!  - `log`: Forward the logging macros to the [`log`](https://docs.rs/log) crate.
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
//!
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![macro_use]
extern crate alloc;

pub mod bit_depth;
pub mod bytestream;
pub mod log;
pub mod options;
pub mod serde;
