//! Internal logging macros.
//!
//! With the `logging` feature these forward to `tracing` under the `memfs`
//! target. Without it they expand to nothing and `tracing` is not linked.
//!
//! Paths are logged; file contents never are.

#[cfg(feature = "logging")]
macro_rules! fs_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "memfs", $($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! fs_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! fs_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "memfs", $($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! fs_trace {
    ($($arg:tt)*) => {};
}

pub(crate) use fs_debug;
pub(crate) use fs_trace;
