/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! End to end tests, documents are described in JSON, written out as PSD
//! files with the byte writer and decoded again.

use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_128;

mod builder;
mod psd;

pub use builder::{Compression, TestChannel, TestDocument, TestLayer};

pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}

fn hash(contents: &[u8]) -> u128 {
    xxh3_128(contents)
}
