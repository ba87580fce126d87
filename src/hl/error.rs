use core::fmt;
use core::fmt::{Display, Formatter};

use embedded_hal::i2c;

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::ll;

/// An error that can occur when operating the tuner
pub enum Error<I2C>
where
    I2C: i2c::ErrorType,
{
    /// Error occured while using the I2C bus
    ///
    /// Only reported once every retry configured in
    /// [`Config::bus_attempts`](crate::Config::bus_attempts) failed.
    Bus(ll::Error<I2C>),

    /// The seek/tune complete signal didn't arrive before the configured
    /// timeout, or STC didn't clear afterwards
    StcTimeout,

    /// The completion line could not be read
    InterruptPin,

    /// The channel is outside the configured band or not on the channel
    /// spacing grid
    InvalidChannel,

    /// Buffer too small
    BufferTooSmall {
        /// Indicates how large a buffer would have been required
        required_len: usize,
    },

    /// The configuration was not valid, e.g. an undefined GPIO mode
    InvalidConfiguration,
}

impl<I2C> From<ll::Error<I2C>> for Error<I2C>
where
    I2C: i2c::ErrorType,
{
    fn from(error: ll::Error<I2C>) -> Self {
        Error::Bus(error)
    }
}

impl<I2C> Display for Error<I2C>
where
    I2C: i2c::ErrorType,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(ll::Error::Read(_)) => write!(f, "register read failed"),
            Error::Bus(ll::Error::Write(_)) => write!(f, "register write failed"),
            Error::StcTimeout => write!(f, "seek/tune did not complete in time"),
            Error::InterruptPin => write!(f, "could not read the completion line"),
            Error::InvalidChannel => write!(f, "channel not in the configured band"),
            Error::BufferTooSmall { required_len } => {
                write!(f, "buffer too small, {} bytes required", required_len)
            }
            Error::InvalidConfiguration => write!(f, "invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl<I2C> std::error::Error for Error<I2C>
where
    I2C: i2c::ErrorType,
    I2C::Error: fmt::Debug,
{
}

// We can't derive this implementation, as `Debug` is only implemented
// conditionally for `ll::Debug`.
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::ErrorType,
    I2C::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Bus(error) => write!(f, "Bus({:?})", error),
            Error::StcTimeout => write!(f, "StcTimeout"),
            Error::InterruptPin => write!(f, "InterruptPin"),
            Error::InvalidChannel => write!(f, "InvalidChannel"),
            Error::BufferTooSmall { required_len } => {
                write!(f, "BufferTooSmall {{ required_len: {:?} }}", required_len,)
            }
            Error::InvalidConfiguration => write!(f, "InvalidConfiguration"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> Format for Error<I2C>
where
    I2C: i2c::ErrorType,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Bus(error) => defmt::write!(f, "Bus({})", error),
            Error::StcTimeout => defmt::write!(f, "StcTimeout"),
            Error::InterruptPin => defmt::write!(f, "InterruptPin"),
            Error::InvalidChannel => defmt::write!(f, "InvalidChannel"),
            Error::BufferTooSmall { required_len } => {
                defmt::write!(f, "BufferTooSmall {{ required_len: {} }}", required_len)
            }
            Error::InvalidConfiguration => defmt::write!(f, "InvalidConfiguration"),
        }
    }
}
