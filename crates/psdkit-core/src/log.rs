/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Logging shim
//!
//! The decoder logs header fields and section lengths at `trace`, and every
//! problem it recovers from (a skipped extra data record, a resource block
//! with a bad signature, corrupt RLE inside a complete channel block) at
//! `warn`. In strict mode the same problems become errors instead.
//!
//! With the `log` feature these are the [`log`](https://docs.rs/log) macros.
//! Without it they still type check their format arguments, so values only
//! used for logging do not turn into unused variable warnings, but nothing
//! is formatted or printed.

#[cfg(feature = "log")]
pub use ::log::{debug, error, info, trace, warn};

// #[macro_export] places macros at the crate root,
// the hidden names plus `pub use` keep them under `log::`
#[cfg(not(feature = "log"))]
pub use crate::{
    __debug as debug, __error as error, __info as info, __trace as trace, __warn as warn
};

#[doc(hidden)]
#[macro_export]
macro_rules! __discard {
    ($($arg:tt)+) => {
        if false {
            let _ = ::core::format_args!($($arg)+);
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __error {
    ($($arg:tt)+) => {
        $crate::__discard!($($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __warn {
    ($($arg:tt)+) => {
        $crate::__discard!($($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __info {
    ($($arg:tt)+) => {
        $crate::__discard!($($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __debug {
    ($($arg:tt)+) => {
        $crate::__discard!($($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __trace {
    ($($arg:tt)+) => {
        $crate::__discard!($($arg)+)
    };
}
