//! Configuration structs for the tuner
//!
//! This module houses the datastructures that control the regional channel
//! plan, audio de-emphasis, GPIO modes, and the driver's own timing and retry
//! policy. A [`Config`] is handed to [`Si4703::new`] and applied on power-up.
//!
//! [`Si4703::new`]: ../hl/struct.Si4703.html#method.new

use crate::time::Duration;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Driver configuration
pub struct Config {
    /// FM band limits
    pub band: Band,
    /// Spacing between adjacent channels
    pub spacing: ChannelSpacing,
    /// Audio de-emphasis applied by the receiver
    pub de_emphasis: DeEmphasis,
    /// Volume programmed during power-up
    ///
    /// Values above 15 are clamped. 0 mutes the output, 1 is the lowest
    /// audible level.
    pub volume: u8,
    /// Upper bound for a tune operation to report completion
    pub tune_timeout: Duration,
    /// Upper bound for a seek operation to report completion
    ///
    /// A seek may sweep the whole band before it gives up, so this should be
    /// much larger than `tune_timeout`.
    pub seek_timeout: Duration,
    /// How often the completion line and status register are polled while
    /// waiting for a tune or seek
    pub stc_poll_interval: Duration,
    /// Pause after an RDS group was seen, to let the chip drop RDSR
    pub rds_ready_pause: Duration,
    /// Pause between RDS polls while no group is pending
    pub rds_poll_interval: Duration,
    /// Number of attempts for every bus read or write before the error is
    /// reported. Values below 1 are treated as 1.
    pub bus_attempts: u8,
}

impl Config {
    /// 87.5–108 MHz, 100 kHz spacing, 50 µs de-emphasis
    pub fn europe() -> Self {
        Config {
            band: Band::UsEurope,
            spacing: ChannelSpacing::Khz100,
            de_emphasis: DeEmphasis::Us50,
            ..Self::base()
        }
    }

    /// 87.5–108 MHz, 200 kHz spacing, 75 µs de-emphasis
    pub fn united_states() -> Self {
        Config {
            band: Band::UsEurope,
            spacing: ChannelSpacing::Khz200,
            de_emphasis: DeEmphasis::Us75,
            ..Self::base()
        }
    }

    /// 76–90 MHz, 100 kHz spacing, 50 µs de-emphasis
    pub fn japan() -> Self {
        Config {
            band: Band::Japan,
            spacing: ChannelSpacing::Khz100,
            de_emphasis: DeEmphasis::Us50,
            ..Self::base()
        }
    }

    /// 76–108 MHz, 100 kHz spacing, 50 µs de-emphasis
    pub fn japan_wide() -> Self {
        Config {
            band: Band::JapanWide,
            ..Self::japan()
        }
    }

    /// The channel plan derived from `band` and `spacing`
    pub fn channel_plan(&self) -> ChannelPlan {
        ChannelPlan::new(self.band, self.spacing)
    }

    fn base() -> Self {
        Config {
            band: Band::UsEurope,
            spacing: ChannelSpacing::Khz100,
            de_emphasis: DeEmphasis::Us50,
            volume: 1,
            tune_timeout: Duration::from_millis(500),
            seek_timeout: Duration::from_secs(15),
            stc_poll_interval: Duration::from_millis(1),
            rds_ready_pause: Duration::from_millis(30),
            rds_poll_interval: Duration::from_millis(40),
            bus_attempts: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::europe()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// FM band select (SYSCONFIG2 BAND)
pub enum Band {
    /// 87.5–108 MHz (US / Europe)
    UsEurope = 0b00,
    /// 76–108 MHz (Japan wide band)
    JapanWide = 0b01,
    /// 76–90 MHz (Japan)
    Japan = 0b10,
}

impl Band {
    /// Lower band edge, in 10 kHz units
    pub const fn bottom(self) -> u32 {
        match self {
            Band::UsEurope => 8_750,
            Band::JapanWide | Band::Japan => 7_600,
        }
    }

    /// Upper band edge, in 10 kHz units
    pub const fn top(self) -> u32 {
        match self {
            Band::UsEurope | Band::JapanWide => 10_800,
            Band::Japan => 9_000,
        }
    }
}

impl Default for Band {
    fn default() -> Self {
        Band::UsEurope
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Channel spacing (SYSCONFIG2 SPACE)
pub enum ChannelSpacing {
    /// 200 kHz (US / Australia)
    Khz200 = 0b00,
    /// 100 kHz (Europe / Japan)
    Khz100 = 0b01,
    /// 50 kHz
    Khz50 = 0b10,
}

impl ChannelSpacing {
    /// Spacing in 10 kHz units
    pub const fn step(self) -> u32 {
        match self {
            ChannelSpacing::Khz200 => 20,
            ChannelSpacing::Khz100 => 10,
            ChannelSpacing::Khz50 => 5,
        }
    }
}

impl Default for ChannelSpacing {
    fn default() -> Self {
        ChannelSpacing::Khz100
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// De-emphasis time constant (SYSCONFIG1 DE)
pub enum DeEmphasis {
    /// 75 µs, used in the USA
    Us75 = 0b0,
    /// 50 µs, used in Europe, Australia and Japan
    Us50 = 0b1,
}

impl Default for DeEmphasis {
    fn default() -> Self {
        DeEmphasis::Us50
    }
}

/// Mapping between channel numbers and the CHAN/READCHAN register value
///
/// Channels are frequencies in 100 kHz units, so `973` is 97.3 MHz. The chip
/// counts channels from the bottom of the band in steps of the configured
/// spacing: `register = (channel * 10 - bottom) / step`, where `bottom` and
/// `step` are in 10 kHz units.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPlan {
    bottom: u32,
    top: u32,
    step: u32,
}

impl ChannelPlan {
    /// Largest value the 10-bit channel fields can hold
    pub const MAX_REGISTER: u16 = 0x3ff;

    /// Creates the plan for a band and spacing combination
    pub const fn new(band: Band, spacing: ChannelSpacing) -> Self {
        ChannelPlan {
            bottom: band.bottom(),
            top: band.top(),
            step: spacing.step(),
        }
    }

    /// Returns the CHAN value for `channel`
    ///
    /// Returns `None` if the channel is outside the band or doesn't fall on
    /// the spacing grid.
    pub fn to_register(&self, channel: u16) -> Option<u16> {
        let frequency = u32::from(channel) * 10;
        if frequency < self.bottom || frequency > self.top {
            return None;
        }

        let offset = frequency - self.bottom;
        if offset % self.step != 0 {
            return None;
        }

        u16::try_from(offset / self.step)
            .ok()
            .filter(|value| *value <= Self::MAX_REGISTER)
    }

    /// Returns the channel for a READCHAN value
    ///
    /// With 50 kHz spacing, odd register values lie between two 100 kHz
    /// channels and are rounded down.
    pub fn to_channel(&self, register: u16) -> u16 {
        let register = u32::from(register & Self::MAX_REGISTER);
        ((self.bottom + register * self.step) / 10) as u16
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// One of the three general purpose pins of the chip
pub enum Gpio {
    /// GPIO1 (SYSCONFIG1 bits 1:0)
    Gpio1,
    /// GPIO2 (SYSCONFIG1 bits 3:2), doubles as the STC/RDS interrupt
    Gpio2,
    /// GPIO3 (SYSCONFIG1 bits 5:4), doubles as the stereo indicator
    Gpio3,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// What a GPIO pin does
pub enum GpioMode {
    /// High impedance (reset default)
    HighImpedance = 0b00,
    /// Pin specific function: reserved on GPIO1, STC/RDS interrupt on GPIO2,
    /// mono/stereo indicator on GPIO3
    Interrupt = 0b01,
    /// Driven low
    Low = 0b10,
    /// Driven high
    High = 0b11,
}

impl TryFrom<u8> for GpioMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(GpioMode::HighImpedance),
            0b01 => Ok(GpioMode::Interrupt),
            0b10 => Ok(GpioMode::Low),
            0b11 => Ok(GpioMode::High),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn europe_plan_is_offset_from_875() {
        let plan = Config::europe().channel_plan();

        assert_eq!(plan.to_register(875), Some(0));
        assert_eq!(plan.to_register(973), Some(98));
        assert_eq!(plan.to_register(1080), Some(205));
        assert_eq!(plan.to_channel(98), 973);
    }

    #[test]
    fn us_plan_uses_200khz_steps() {
        let plan = Config::united_states().channel_plan();

        assert_eq!(plan.to_register(973), Some(49));
        assert_eq!(plan.to_channel(49), 973);
        // 97.4 MHz is between two 200 kHz channels
        assert_eq!(plan.to_register(974), None);
    }

    #[test]
    fn japan_plan_starts_at_76mhz() {
        let plan = Config::japan().channel_plan();

        assert_eq!(plan.to_register(760), Some(0));
        assert_eq!(plan.to_register(900), Some(140));
        assert_eq!(plan.to_register(901), None);

        let wide = Config::japan_wide().channel_plan();
        assert_eq!(wide.to_register(1080), Some(320));
    }

    #[test]
    fn fifty_khz_plan_fits_the_ten_bit_field() {
        let plan = ChannelPlan::new(Band::JapanWide, ChannelSpacing::Khz50);

        assert_eq!(plan.to_register(1080), Some(640));
        assert_eq!(plan.to_channel(640), 1080);
        assert_eq!(plan.to_channel(641), 1080);
    }

    #[test]
    fn channels_outside_the_band_are_rejected() {
        let plan = Config::europe().channel_plan();

        assert_eq!(plan.to_register(874), None);
        assert_eq!(plan.to_register(1081), None);
        assert_eq!(plan.to_register(0), None);
    }

    #[test]
    fn gpio_mode_from_raw() {
        assert_eq!(GpioMode::try_from(3), Ok(GpioMode::High));
        assert_eq!(GpioMode::try_from(0), Ok(GpioMode::HighImpedance));
        assert_eq!(GpioMode::try_from(4), Err(4));
    }
}
