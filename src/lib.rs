//! Driver crate for the Si4702/Si4703 FM radio receiver
//!
//! The recommended way to use this driver is the [high-level interface]. If you
//! require a higher degree of flexibility, you can use the
//! [register-level interface] instead.
//!
//! This driver is built on top of [`embedded-hal`], which means it is portable
//! and can be used on any platform that implements the `embedded-hal` API. With
//! the default `async` feature the bus, delay and all waits go through
//! [`embedded-hal-async`]; without it the same API is blocking.
//!
//! [high-level interface]: hl/index.html
//! [register-level interface]: ll/index.html
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//! [`embedded-hal-async`]: https://crates.io/crates/embedded-hal-async
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "async")]
use maybe_async::must_be_async as maybe_async_attr;
#[cfg(not(feature = "async"))]
use maybe_async::must_be_sync as maybe_async_attr;

#[cfg(not(feature = "async"))]
use embedded_hal as hal_type;
#[cfg(feature = "async")]
use embedded_hal_async as hal_type;

#[macro_use]
mod macros;

pub mod configs;
pub mod hl;
pub mod ll;
pub mod rds;
pub mod time;

#[cfg(test)]
mod testing;

/// Redirection of nb::block
pub mod block {
    pub use nb::block;
}

pub use crate::{
    block::block,
    configs::{Band, ChannelPlan, ChannelSpacing, Config, DeEmphasis, Gpio, GpioMode},
    hl::{
        reset, ChipId, DeviceId, Error, Ready, SeekDirection, Si4703, Sleeping, StcPhase,
        Uninitialized,
    },
    time::{Clock, Duration, Instant},
};
