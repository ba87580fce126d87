use embedded_hal::digital::InputPin;

use super::completion::Operation;
use crate::{
    configs::{Gpio, GpioMode},
    hal_type, maybe_async_attr,
    time::Clock,
    Error, Ready, Si4703, Sleeping,
};

/// Highest value of the 4-bit VOLUME field
const MAX_VOLUME: u8 = 15;

/// The direction a seek sweeps the band in
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeekDirection {
    /// Towards the top of the band
    Up,
    /// Towards the bottom of the band
    Down,
}

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Ready>
where
    I2C: hal_type::i2c::I2c,
    INT: InputPin,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Tunes to `channel`
    ///
    /// Channels are frequencies in 100 kHz units, so `973` is 97.3 MHz.
    /// Returns once the chip reports the tune complete, or
    /// [`Error::StcTimeout`] after [`Config::tune_timeout`].
    ///
    /// [`Config::tune_timeout`]: crate::Config::tune_timeout
    #[maybe_async_attr]
    pub async fn set_channel(&mut self, channel: u16) -> Result<(), Error<I2C>> {
        let register = self
            .config
            .channel_plan()
            .to_register(channel)
            .ok_or(Error::InvalidChannel)?;

        debug!("tuning to {} (CHAN {})", channel, register);
        self.refresh().await?;
        self.ll.channel().modify(|_, w| w.chan(register).tune(1));
        self.complete(Operation::Tune).await?;

        Ok(())
    }

    /// Returns the channel the chip is tuned to, in 100 kHz units
    #[maybe_async_attr]
    pub async fn channel(&mut self) -> Result<u16, Error<I2C>> {
        self.refresh().await?;
        let register = self.ll.readchan().read().readchan();

        Ok(self.config.channel_plan().to_channel(register))
    }

    /// Seeks to the next station in `direction`
    ///
    /// The seek wraps around at the band limits (SKMODE = 0). Returns `None`
    /// if the chip went around the band without finding a station, otherwise
    /// the channel it stopped on.
    #[maybe_async_attr]
    pub async fn seek(&mut self, direction: SeekDirection) -> Result<Option<u16>, Error<I2C>> {
        debug!("seeking {:?}", direction);
        self.refresh().await?;
        self.ll.powercfg().modify(|_, w| {
            w.skmode(0)
                .seekup((direction == SeekDirection::Up) as u8)
                .seek(1)
        });

        if self.complete(Operation::Seek).await? {
            debug!("seek found no station");
            return Ok(None);
        }

        self.channel().await.map(Some)
    }

    /// Seeks towards the top of the band, see [`Si4703::seek`]
    #[maybe_async_attr]
    pub async fn seek_up(&mut self) -> Result<Option<u16>, Error<I2C>> {
        self.seek(SeekDirection::Up).await
    }

    /// Seeks towards the bottom of the band, see [`Si4703::seek`]
    #[maybe_async_attr]
    pub async fn seek_down(&mut self) -> Result<Option<u16>, Error<I2C>> {
        self.seek(SeekDirection::Down).await
    }
}

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Ready>
where
    I2C: hal_type::i2c::I2c,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Sets the volume
    ///
    /// Values above 15 are clamped to 15. 0 mutes the output.
    #[maybe_async_attr]
    pub async fn set_volume(&mut self, volume: u8) -> Result<(), Error<I2C>> {
        let volume = volume.min(MAX_VOLUME);

        self.refresh().await?;
        self.ll.sysconfig2().modify(|_, w| w.volume(volume));
        self.commit().await?;

        Ok(())
    }

    /// Returns the current volume
    #[maybe_async_attr]
    pub async fn volume(&mut self) -> Result<u8, Error<I2C>> {
        self.refresh().await?;

        Ok(self.ll.sysconfig2().read().volume())
    }

    /// Mutes or unmutes the audio output
    #[maybe_async_attr]
    pub async fn set_mute(&mut self, mute: bool) -> Result<(), Error<I2C>> {
        self.refresh().await?;
        self.ll.powercfg().modify(|_, w| w.dmute((!mute) as u8));
        self.commit().await?;

        Ok(())
    }

    /// Forces mono output, or lets the chip blend to stereo
    #[maybe_async_attr]
    pub async fn set_mono(&mut self, mono: bool) -> Result<(), Error<I2C>> {
        self.refresh().await?;
        self.ll.powercfg().modify(|_, w| w.mono(mono as u8));
        self.commit().await?;

        Ok(())
    }

    /// Configures one of the GPIO pins
    ///
    /// Note that GPIO2 carries the seek/tune complete signal. Changing its
    /// mode makes every later tune or seek time out.
    #[maybe_async_attr]
    pub async fn write_gpio(&mut self, gpio: Gpio, mode: GpioMode) -> Result<(), Error<I2C>> {
        let mode = mode as u8;

        self.refresh().await?;
        self.ll.sysconfig1().modify(|_, w| match gpio {
            Gpio::Gpio1 => w.gpio1(mode),
            Gpio::Gpio2 => w.gpio2(mode),
            Gpio::Gpio3 => w.gpio3(mode),
        });
        self.commit().await?;

        Ok(())
    }

    /// Configures a GPIO pin from a raw 2-bit mode value
    ///
    /// Returns [`Error::InvalidConfiguration`] without touching the chip if
    /// `mode` is not one of the four defined modes.
    #[maybe_async_attr]
    pub async fn write_gpio_raw(&mut self, gpio: Gpio, mode: u8) -> Result<(), Error<I2C>> {
        let mode = GpioMode::try_from(mode).map_err(|_| Error::InvalidConfiguration)?;

        self.write_gpio(gpio, mode).await
    }

    /// Returns the received signal strength in dBµV
    #[maybe_async_attr]
    pub async fn signal_strength(&mut self) -> Result<u8, Error<I2C>> {
        self.refresh().await?;

        Ok(self.ll.statusrssi().read().rssi())
    }

    /// Returns whether the chip is receiving in stereo
    #[maybe_async_attr]
    pub async fn is_stereo(&mut self) -> Result<bool, Error<I2C>> {
        self.refresh().await?;

        Ok(self.ll.statusrssi().read().st() == 1)
    }

    /// Powers the chip down
    ///
    /// The registers keep their values, [`Si4703::wake_up`] powers the chip
    /// back up.
    #[maybe_async_attr]
    pub async fn power_down(mut self) -> Result<Si4703<I2C, INT, D, CLK, Sleeping>, Error<I2C>> {
        debug!("powering down");
        self.refresh().await?;
        self.ll.sysconfig1().modify(|_, w| w.rds(0));
        self.ll.powercfg().modify(|_, w| w.enable(1).disable(1));
        self.commit().await?;

        Ok(Si4703 {
            ll: self.ll,
            stc: self.stc,
            delay: self.delay,
            clock: self.clock,
            config: self.config,
            state: Sleeping,
        })
    }
}
