/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A simple implementation of a big endian bytestream reader
//! and writer.
//!
//! This module contains two main structs that help in
//! byte reading and byte writing.
//!
//! PSD stores every multi-byte integer most significant byte first,
//! the reader composes values with explicit shifts and masks so results
//! never depend on the host's byte order.
pub use reader::{ByteIoError, ByteReader};
pub use swap::ReverseBytes;
pub use writer::ByteWriter;

mod reader;
mod swap;
mod writer;
