// Logging shims. Each forwards to `defmt` and/or `log` when the matching feature
// is enabled and expands to nothing otherwise, so the format strings must stay
// within what both crates accept (`{}`, `{:?}`, `{:#x}`). Test builds always
// log through `log`, captured by `env_logger`.

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(any(feature = "log", test))]
        log::debug!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
        #[cfg(any(feature = "log", test))]
        log::warn!($($arg)*);
    }};
}
