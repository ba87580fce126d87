//! Low-level interface to the Si4703
//!
//! This module implements a register-level interface to the Si4703. Users of
//! this library should typically not need to use this. Please consider using
//! the [high-level interface] instead.
//!
//! The Si4703 does not support addressed register access. Every read returns
//! the whole register file as one 32 byte burst that starts at register 0x0A
//! and wraps around after 0x0F, and every write starts at register 0x02. The
//! driver therefore keeps a shadow copy of all 16 registers:
//!
//! - [`Si4703::read_registers`] refreshes the whole shadow from the chip,
//! - the register accessors ([`Si4703::powercfg`], [`Si4703::channel`], ...)
//!   decode and modify the shadow without touching the bus,
//! - [`Si4703::write_registers`] commits the six control registers
//!   0x02..=0x07 back to the chip.
//!
//! Always refresh before modifying: a write sends every control register, so
//! stale shadow contents would overwrite fields you never touched.
//!
//! **NOTE**: Field setters accept types that may have more bits than the
//! field. Values that are too large are silently truncated.
//!
//! [high-level interface]: ../hl/index.html

use core::{fmt, marker::PhantomData};

use embedded_hal::i2c;

use crate::{hal_type, maybe_async_attr};

/// 7-bit I2C address of the Si4703
pub const ADDRESS: u8 = 0x10;

/// Number of registers in the register file
pub const REGISTER_COUNT: usize = 16;

/// Register the chip starts a read burst at
pub const READ_START: usize = 0x0A;

/// First register of a write burst
pub const WRITE_START: usize = 0x02;

/// Number of registers in a write burst (0x02..=0x07)
pub const WRITE_COUNT: usize = 6;

/// Size of a read burst in bytes
pub const READ_LEN: usize = REGISTER_COUNT * 2;

/// Size of a write burst in bytes
pub const WRITE_LEN: usize = WRITE_COUNT * 2;

/// Entry point to the Si4703 driver's low-level API
///
/// Please consider using [hl::Si4703] instead.
///
/// [hl::Si4703]: ../hl/struct.Si4703.html
#[derive(Copy, Clone)]
pub struct Si4703<I2C> {
    pub(crate) i2c: I2C,
    registers: [u16; REGISTER_COUNT],
}

impl<I2C> Si4703<I2C> {
    /// Create a new instance of `Si4703`
    ///
    /// Requires the I2C bus the Si4703 is connected to. The register shadow
    /// starts out zeroed, so call [`Si4703::read_registers`] before anything
    /// else.
    pub fn new(i2c: I2C) -> Self {
        Si4703 {
            i2c,
            registers: [0; REGISTER_COUNT],
        }
    }

    /// The register shadow, indexed by register address
    pub fn registers(&self) -> &[u16; REGISTER_COUNT] {
        &self.registers
    }

    /// Allow access to the I2C bus
    pub fn bus(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the driver and returns the I2C bus
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Si4703<I2C>
where
    I2C: hal_type::i2c::I2c,
{
    /// Reads the whole register file into the shadow
    ///
    /// The chip sends registers 0x0A..=0x0F followed by 0x00..=0x09, each
    /// high byte first. On error the shadow is left as it was.
    #[maybe_async_attr]
    pub async fn read_registers(&mut self) -> Result<(), Error<I2C>> {
        let mut buffer = [0; READ_LEN];
        self.i2c
            .read(ADDRESS, &mut buffer)
            .await
            .map_err(Error::Read)?;

        for (i, word) in buffer.chunks_exact(2).enumerate() {
            let register = (READ_START + i) % REGISTER_COUNT;
            self.registers[register] = u16::from_be_bytes([word[0], word[1]]);
        }

        Ok(())
    }

    /// Writes the control registers 0x02..=0x07 from the shadow
    ///
    /// No register address is sent: the chip always starts writing at 0x02
    /// and auto-increments.
    #[maybe_async_attr]
    pub async fn write_registers(&mut self) -> Result<(), Error<I2C>> {
        let mut buffer = [0; WRITE_LEN];
        let control = &self.registers[WRITE_START..WRITE_START + WRITE_COUNT];
        for (bytes, value) in buffer.chunks_exact_mut(2).zip(control) {
            bytes.copy_from_slice(&value.to_be_bytes());
        }

        self.i2c
            .write(ADDRESS, &buffer)
            .await
            .map_err(Error::Write)?;

        Ok(())
    }
}

/// Provides access to a register in the shadow
///
/// You can get an instance for a given register using one of the methods on
/// [`Si4703`].
pub struct RegAccessor<'s, R, I2C>(&'s mut Si4703<I2C>, PhantomData<R>);

impl<'s, R, I2C> RegAccessor<'s, R, I2C>
where
    R: Register,
{
    /// Decode the register from the shadow
    #[inline]
    pub fn read(&self) -> R::Read
    where
        R: Readable,
    {
        R::read(self.0.registers[R::ADDR])
    }

    /// Modify the register in the shadow
    ///
    /// Fields that the closure doesn't set keep their shadowed value. Nothing
    /// reaches the chip until [`Si4703::write_registers`].
    #[inline]
    pub fn modify<F>(&mut self, f: F)
    where
        R: Readable + Writable,
        F: for<'w> FnOnce(&R::Read, &'w mut R::Write) -> &'w mut R::Write,
    {
        let value = self.0.registers[R::ADDR];
        let r = <R as Readable>::read(value);
        let mut w = <R as Writable>::write(value);

        f(&r, &mut w);

        self.0.registers[R::ADDR] = <R as Writable>::bits(&w);
    }
}

/// An I2C error that can occur when communicating with the Si4703
pub enum Error<I2C>
where
    I2C: i2c::ErrorType,
{
    /// The register read burst did not complete
    Read(I2C::Error),

    /// The control register write was not acknowledged
    Write(I2C::Error),
}

// We can't derive this implementation, as the compiler will complain that the
// associated error type doesn't implement `Debug`.
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::ErrorType,
    I2C::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read(error) => write!(f, "Read({:?})", error),
            Error::Write(error) => write!(f, "Write({:?})", error),
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for Error<I2C>
where
    I2C: i2c::ErrorType,
{
    fn format(&self, f: defmt::Formatter) {
        use embedded_hal::i2c::Error as _;

        match self {
            Error::Read(error) => {
                defmt::write!(f, "Read({})", defmt::Debug2Format(&error.kind()))
            }
            Error::Write(error) => {
                defmt::write!(f, "Write({})", defmt::Debug2Format(&error.kind()))
            }
        }
    }
}

/// Implemented for all registers
///
/// This is a mostly internal trait that should not be implemented or used
/// directly by users of this crate. It is exposed through the public API
/// though, so it can't be made private.
pub trait Register {
    /// The register address, which is also its index in the shadow
    const ADDR: usize;
}

/// Marker trait for registers that can be read from
///
/// This is a mostly internal trait that should not be implemented or used
/// directly by users of this crate. It is exposed through the public API
/// though, so it can't be made private.
pub trait Readable {
    /// The type that is used to read from the register
    type Read;

    /// Wrap a shadowed value in the read type
    fn read(value: u16) -> Self::Read;
}

/// Marker trait for registers that can be written to
///
/// Only the control registers 0x02..=0x07 implement this, as those are the
/// only ones a write burst reaches.
pub trait Writable {
    /// The type that is used to write to the register
    type Write;

    /// Wrap a shadowed value in the write type
    fn write(value: u16) -> Self::Write;

    /// Return the write type's value
    fn bits(w: &Self::Write) -> u16;
}

/// Generates register implementations
macro_rules! impl_register {
    (
        $(
            $addr:expr,
            $rw:tt,
            $name:ident($name_lower:ident) {
            #[$doc:meta]
            $(
                $field:ident,
                $first_bit:expr,
                $last_bit:expr,
                $ty:ty;
                #[$field_doc:meta]
            )*
            }
        )*
    ) => {
        $(
            #[$doc]
            #[allow(non_camel_case_types)]
            pub struct $name;

            impl Register for $name {
                const ADDR: usize = $addr;
            }

            #[$doc]
            pub mod $name_lower {
                use core::fmt;

                /// Used to read from the register
                #[derive(Copy, Clone, Eq, PartialEq)]
                pub struct R(pub(crate) u16);

                impl R {
                    /// The raw register value
                    #[inline(always)]
                    pub fn bits(&self) -> u16 {
                        self.0
                    }

                    $(
                        #[$field_doc]
                        #[inline(always)]
                        pub fn $field(&self) -> $ty {
                            const WIDTH: u32 = $last_bit - $first_bit + 1;
                            const MASK: u16 = ((1u32 << WIDTH) - 1) as u16;

                            ((self.0 >> $first_bit) & MASK) as $ty
                        }
                    )*
                }

                impl fmt::Debug for R {
                    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        write!(f, "0x{:04x}", self.0)
                    }
                }

                #[cfg(feature = "defmt")]
                impl defmt::Format for R {
                    fn format(&self, f: defmt::Formatter) {
                        defmt::write!(f, "{=u16:#x}", self.0);
                    }
                }

                /// Used to write to the register
                pub struct W(pub(crate) u16);

                impl W {
                    $(
                        #[$field_doc]
                        #[inline(always)]
                        pub fn $field(&mut self, value: $ty) -> &mut Self {
                            const WIDTH: u32 = $last_bit - $first_bit + 1;
                            const MASK: u16 =
                                (((1u32 << WIDTH) - 1) as u16) << $first_bit;

                            self.0 = (self.0 & !MASK)
                                | (((value as u16) << $first_bit) & MASK);
                            self
                        }
                    )*
                }
            }

            impl_rw!($rw, $name, $name_lower);
        )*


        impl<I2C> Si4703<I2C> {
            $(
                #[$doc]
                pub fn $name_lower(&mut self) -> RegAccessor<'_, $name, I2C> {
                    RegAccessor(self, PhantomData)
                }
            )*
        }
    }
}

// Helper macro, used internally by `impl_register!`
macro_rules! impl_rw {
    (RO, $name:ident, $name_lower:ident) => {
        impl_rw!(@R, $name, $name_lower);
    };
    (RW, $name:ident, $name_lower:ident) => {
        impl_rw!(@R, $name, $name_lower);
        impl_rw!(@W, $name, $name_lower);
    };

    (@R, $name:ident, $name_lower:ident) => {
        impl Readable for $name {
            type Read = $name_lower::R;

            fn read(value: u16) -> Self::Read {
                $name_lower::R(value)
            }
        }
    };
    (@W, $name:ident, $name_lower:ident) => {
        impl Writable for $name {
            type Write = $name_lower::W;

            fn write(value: u16) -> Self::Write {
                $name_lower::W(value)
            }

            fn bits(w: &Self::Write) -> u16 {
                w.0
            }
        }
    };
}

// All registers are implemented in this macro invocation. It follows the
// following syntax:
// <address>, <RO/RW>, <name-upper>(name-lower) { /// <doc>
//     <field>, <first-bit-index>, <last-bit-index>, <type>; /// <doc>
//     ...
// }
//
// Bit indices follow the Si4702/03-C19 datasheet, section 6.
impl_register! {
    0x00, RO, DEVICEID(deviceid) { /// Device ID
        mfgid,     0, 11, u16; /// Manufacturer ID
        pn,       12, 15, u8;  /// Part number
    }
    0x01, RO, CHIPID(chipid) { /// Chip ID
        firmware,  0,  5, u8; /// Firmware version
        dev,       6,  9, u8; /// Device
        rev,      10, 15, u8; /// Chip revision
    }
    0x02, RW, POWERCFG(powercfg) { /// Power configuration
        enable,    0,  0, u8; /// Powerup enable
        disable,   6,  6, u8; /// Powerup disable
        seek,      8,  8, u8; /// Seek start
        seekup,    9,  9, u8; /// Seek direction, 1 = up
        skmode,   10, 10, u8; /// Seek mode, 1 = stop at band limit
        rdsm,     11, 11, u8; /// RDS mode, 1 = verbose
        mono,     13, 13, u8; /// Force mono
        dmute,    14, 14, u8; /// Mute disable
        dsmute,   15, 15, u8; /// Softmute disable
    }
    0x03, RW, CHANNEL(channel) { /// Channel
        chan,      0,  9, u16; /// Channel select
        tune,     15, 15, u8;  /// Tune start
    }
    0x04, RW, SYSCONFIG1(sysconfig1) { /// System configuration 1
        gpio1,     0,  1, u8; /// General purpose I/O 1
        gpio2,     2,  3, u8; /// General purpose I/O 2
        gpio3,     4,  5, u8; /// General purpose I/O 3
        blndadj,   6,  7, u8; /// Stereo/mono blend level adjustment
        agcd,     10, 10, u8; /// AGC disable
        de,       11, 11, u8; /// De-emphasis, 1 = 50 us
        rds,      12, 12, u8; /// RDS enable
        stcien,   14, 14, u8; /// Seek/tune complete interrupt enable
        rdsien,   15, 15, u8; /// RDS interrupt enable
    }
    0x05, RW, SYSCONFIG2(sysconfig2) { /// System configuration 2
        volume,    0,  3, u8; /// Volume
        space,     4,  5, u8; /// Channel spacing
        band,      6,  7, u8; /// Band select
        seekth,    8, 15, u8; /// RSSI seek threshold
    }
    0x06, RW, SYSCONFIG3(sysconfig3) { /// System configuration 3
        skcnt,     0,  3, u8; /// Seek FM impulse detection threshold
        sksnr,     4,  7, u8; /// Seek SNR threshold
        volext,    8,  8, u8; /// Extended volume range
        smutea,   12, 13, u8; /// Softmute attenuation
        smuter,   14, 15, u8; /// Softmute attack/recover rate
    }
    0x07, RW, TEST1(test1) { /// Test 1
        ahizen,   14, 14, u8; /// Audio high-Z enable
        xoscen,   15, 15, u8; /// Crystal oscillator enable
    }
    0x08, RO, TEST2(test2) { /// Test 2
        value,     0, 15, u16; /// Reserved
    }
    0x09, RO, BOOTCONFIG(bootconfig) { /// Boot configuration
        value,     0, 15, u16; /// Reserved
    }
    0x0A, RO, STATUSRSSI(statusrssi) { /// Status and RSSI
        rssi,      0,  7, u8; /// Received signal strength indicator
        st,        8,  8, u8; /// Stereo indicator
        blera,     9, 10, u8; /// RDS block A errors
        rdss,     11, 11, u8; /// RDS synchronized
        afcrl,    12, 12, u8; /// AFC rail
        sfbl,     13, 13, u8; /// Seek fail/band limit
        stc,      14, 14, u8; /// Seek/tune complete
        rdsr,     15, 15, u8; /// RDS ready
    }
    0x0B, RO, READCHAN(readchan) { /// Read channel
        readchan,  0,  9, u16; /// Current channel
        blerd,    10, 11, u8;  /// RDS block D errors
        blerc,    12, 13, u8;  /// RDS block C errors
        blerb,    14, 15, u8;  /// RDS block B errors
    }
    0x0C, RO, RDSA(rdsa) { /// RDS block A
        value,     0, 15, u16; /// Block A data
    }
    0x0D, RO, RDSB(rdsb) { /// RDS block B
        value,     0, 15, u16; /// Block B data
    }
    0x0E, RO, RDSC(rdsc) { /// RDS block C
        value,     0, 15, u16; /// Block C data
    }
    0x0F, RO, RDSD(rdsd) { /// RDS block D
        value,     0, 15, u16; /// Block D data
    }
}
