//! High-level interface to the Si4703
//!
//! The entry point to this API is the [Si4703] struct. Please refer to the
//! documentation there for more details.
//!
//! This module implements a high-level interface to the Si4703. This is the
//! recommended way to access the Si4703 using this crate, unless you need the
//! greater flexibility provided by the [register-level interface].
//!
//! [register-level interface]: ../ll/index.html

use core::fmt;

pub use completion::*;
pub use error::*;
pub use ready::*;
#[allow(unused_imports)]
pub use sleeping::*;
pub use state_impls::*;
pub use uninitialized::*;

use crate::{configs::Config, hal_type, ll, maybe_async_attr, time::Clock};

mod completion;
mod error;
mod rds;
mod ready;
mod sleeping;
mod state_impls;
mod uninitialized;

/// Entry point to the Si4703 driver API
///
/// The driver owns the I2C bus, the GPIO2 completion line (`INT`), a delay
/// provider (`D`) and a millisecond clock (`CLK`). `State` tracks the power
/// state of the chip: [`Uninitialized`] after [`Si4703::new`], [`Ready`] after
/// [`Si4703::power_on`], [`Sleeping`] after [`Si4703::power_down`].
///
/// Every operation takes `&mut self` and runs to completion before returning,
/// so the shadow registers can never be interleaved between two operations.
pub struct Si4703<I2C, INT, D, CLK, State> {
    ll: ll::Si4703<I2C>,
    stc: INT,
    delay: D,
    clock: CLK,
    config: Config,
    state: State,
}

// Can't be derived without putting requirements on the peripherals.
impl<I2C, INT, D, CLK, State> fmt::Debug for Si4703<I2C, INT, D, CLK, State>
where
    State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Si4703 {{ state: ")?;
        self.state.fmt(f)?;
        write!(f, ", config: {:?}, .. }}", self.config)?;

        Ok(())
    }
}

/// Contents of the DEVICEID register
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceId {
    /// Part number, 0x1 for the Si4702/03
    pub part_number: u8,
    /// Manufacturer ID, 0x242 for Silicon Labs
    pub manufacturer: u16,
}

/// Contents of the CHIPID register
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChipId {
    /// Chip revision
    pub revision: u8,
    /// Device, 0x1 for the Si4702 and 0x9 for the Si4703 once powered up
    pub device: u8,
    /// Firmware version, 0 before power-up
    pub firmware: u8,
}

impl<I2C, INT, D, CLK, State> Si4703<I2C, INT, D, CLK, State> {
    /// The configuration the driver was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Provides direct access to the register-level API
    ///
    /// Be aware that by using the register-level API, you can invalidate
    /// various assumptions that the high-level API makes about the operation of
    /// the Si4703. Don't use the register-level and high-level APIs in tandem,
    /// unless you know what you're doing.
    pub fn ll(&mut self) -> &mut ll::Si4703<I2C> {
        &mut self.ll
    }

    /// Consumes the driver and returns the peripherals it owned
    pub fn release(self) -> (I2C, INT, D, CLK) {
        (self.ll.free(), self.stc, self.delay, self.clock)
    }
}

impl<I2C, INT, D, CLK, State> Si4703<I2C, INT, D, CLK, State>
where
    I2C: hal_type::i2c::I2c,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Reads the device identification
    #[maybe_async_attr]
    pub async fn device_id(&mut self) -> Result<DeviceId, Error<I2C>> {
        self.refresh().await?;
        let deviceid = self.ll.deviceid().read();

        Ok(DeviceId {
            part_number: deviceid.pn(),
            manufacturer: deviceid.mfgid(),
        })
    }

    /// Reads the chip identification
    #[maybe_async_attr]
    pub async fn chip_id(&mut self) -> Result<ChipId, Error<I2C>> {
        self.refresh().await?;
        let chipid = self.ll.chipid().read();

        Ok(ChipId {
            revision: chipid.rev(),
            device: chipid.dev(),
            firmware: chipid.firmware(),
        })
    }

    /// Refreshes the register shadow, retrying failed reads
    #[maybe_async_attr]
    pub(crate) async fn refresh(&mut self) -> Result<(), Error<I2C>> {
        let attempts = self.config.bus_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.ll.read_registers().await {
                Ok(()) => return Ok(()),
                Err(error) if attempt >= attempts => {
                    warn!("register read failed after {} attempts", attempt);
                    return Err(error.into());
                }
                Err(_) => {
                    debug!("register read failed, attempt {}", attempt);
                    attempt += 1;
                }
            }
        }
    }

    /// Writes the control registers from the shadow, retrying on NACK
    #[maybe_async_attr]
    pub(crate) async fn commit(&mut self) -> Result<(), Error<I2C>> {
        let attempts = self.config.bus_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.ll.write_registers().await {
                Ok(()) => return Ok(()),
                Err(error) if attempt >= attempts => {
                    warn!("register write failed after {} attempts", attempt);
                    return Err(error.into());
                }
                Err(_) => {
                    debug!("register write failed, attempt {}", attempt);
                    attempt += 1;
                }
            }
        }
    }

    /// Sleeps for `duration`
    #[maybe_async_attr]
    pub(crate) async fn pause(&mut self, duration: crate::time::Duration) {
        self.delay.delay_ms(duration.as_millis()).await;
    }
}
