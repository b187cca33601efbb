/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PackBits run length coding of scanlines
//!
//! Every scanline of an RLE compressed channel is coded independently:
//!
//! ```text
//! Loop until you get the number of unpacked bytes you are expecting:
//!     Read the next source byte into n.
//!     If n is between 0 and 127 inclusive, copy the next n+1 bytes
//!     literally. Else if n is between -127 and -1 inclusive, copy the next
//!     byte -n+1 times. Else if n is 128, noop.
//! Endloop
//! ```
use alloc::vec::Vec;

use psdkit_core::bytestream::ByteReader;

use crate::errors::PsdDecodeErrors;

/// Longest run a single control byte can describe
const MAX_RUN: usize = 128;

/// Decode one scanline into `output[offset..offset + columns]`.
///
/// Writing stops the moment `columns` bytes have been produced, even in the
/// middle of a run. Unused literal bytes of such a run are still consumed
/// so the reader lands at the start of the next scanline.
///
/// # Errors
/// - [`PsdDecodeErrors::BadRLE`] if the window does not fit in `output`
/// - [`PsdDecodeErrors::IoErrors`] if input ends before the row is complete
pub fn decode_row(
    reader: &mut ByteReader, output: &mut [u8], offset: usize, columns: usize
) -> Result<(), PsdDecodeErrors> {
    let window = offset
        .checked_add(columns)
        .and_then(|end| output.get_mut(offset..end))
        .ok_or(PsdDecodeErrors::BadRLE)?;

    let mut position = 0;

    while position < columns {
        let control = usize::from(reader.read_u8()?);

        match control {
            0..=127 => {
                // copy next control+1 bytes literally
                let length = control + 1;
                let take = length.min(columns - position);

                window[position..position + take].copy_from_slice(reader.read_bytes(take)?);
                position += take;
                // bytes that would overflow the row belong to this run, drop them
                let leftover = length - take;
                reader.skip(leftover.min(reader.remaining()))?;
            }
            128 => (),
            _ => {
                // Next -len+1 bytes in the dest are replicated from next source byte.
                // (Interpret len as a negative 8-bit int.)
                let length = 257 - control;
                let take = length.min(columns - position);
                let value = reader.read_u8()?;

                window[position..position + take].fill(value);
                position += take;
            }
        }
    }
    Ok(())
}

/// Decode `rows` consecutive scanlines of `columns` bytes each
///
/// The row length table preceding RLE data must already have been skipped.
pub fn decode_rows(
    reader: &mut ByteReader, output: &mut [u8], rows: usize, columns: usize
) -> Result<(), PsdDecodeErrors> {
    for row in 0..rows {
        decode_row(reader, output, row * columns, columns)?;
    }
    Ok(())
}

/// Encode one scanline with PackBits
///
/// Runs of two or more identical bytes become repeat packets, everything
/// else is grouped into literal packets of at most 128 bytes.
pub fn encode_row(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_RUN + 1);
    let mut i = 0;

    while i < input.len() {
        let mut run = 1;

        while i + run < input.len() && run < MAX_RUN && input[i + run] == input[i] {
            run += 1;
        }

        if run >= 2 {
            out.push((257 - run) as u8);
            out.push(input[i]);
            i += run;
            continue;
        }
        // literal run, ends where a repeated pair starts
        let start = i;

        while i < input.len() && i - start < MAX_RUN {
            if i + 1 < input.len() && input[i] == input[i + 1] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&input[start..i]);
    }
    out
}
