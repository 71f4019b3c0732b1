//! Device-scoped logging macros
//!
//! `dev_info!`, `dev_warn!`, `dev_err!` and `dev_dbg!` take the device name
//! first, then a format string. The backend is picked when *this* crate is
//! compiled:
//!
//! | Features           | Backend                                  |
//! |--------------------|------------------------------------------|
//! | `defmt`            | `defmt::{info,warn,error,debug}!`        |
//! | `tracing`          | `tracing::*!` with a `device` field      |
//! | both               | both                                     |
//! | neither            | arguments evaluated by reference, no output |
//!
//! Keep format arguments to `&str`, integers and platform types so the same
//! call site is valid for both backends.

#[cfg(all(feature = "defmt", feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __dev_log {
    ($lvl:ident, $dev:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        ::defmt::$lvl!($fmt $(, $arg)*);
        $crate::__private::tracing::$lvl!(device = $dev, $fmt $(, $arg)*);
    }};
}

#[cfg(all(feature = "defmt", not(feature = "tracing")))]
#[doc(hidden)]
#[macro_export]
macro_rules! __dev_log {
    ($lvl:ident, $dev:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = $dev;
        ::defmt::$lvl!($fmt $(, $arg)*);
    }};
}

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __dev_log {
    ($lvl:ident, $dev:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::__private::tracing::$lvl!(device = $dev, $fmt $(, $arg)*);
    }};
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
#[doc(hidden)]
#[macro_export]
macro_rules! __dev_log {
    ($lvl:ident, $dev:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = &$dev;
        $(let _ = &$arg;)*
    }};
}

/// Informational message tagged with a device name.
#[macro_export]
macro_rules! dev_info {
    ($($t:tt)*) => { $crate::__dev_log!(info, $($t)*) };
}

/// Warning tagged with a device name.
#[macro_export]
macro_rules! dev_warn {
    ($($t:tt)*) => { $crate::__dev_log!(warn, $($t)*) };
}

/// Error message tagged with a device name.
#[macro_export]
macro_rules! dev_err {
    ($($t:tt)*) => { $crate::__dev_log!(error, $($t)*) };
}

/// Debug message tagged with a device name.
#[macro_export]
macro_rules! dev_dbg {
    ($($t:tt)*) => { $crate::__dev_log!(debug, $($t)*) };
}
