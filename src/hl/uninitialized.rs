use embedded_hal::digital::OutputPin;

use crate::{
    configs::{Config, GpioMode},
    hal_type, ll, maybe_async_attr,
    time::{Clock, Duration},
    Error, Ready, Si4703, Uninitialized,
};

/// Time the crystal oscillator needs to settle (AN230)
const OSCILLATOR_SETTLE: Duration = Duration::from_millis(500);

/// Maximum power-up time (datasheet, table 8)
const POWER_UP: Duration = Duration::from_millis(110);

/// Puts the Si4703 into 2-wire (I2C) bus mode
///
/// The chip samples SDIO on the rising edge of RST: SDIO low selects the
/// 2-wire interface, provided SEN is pulled high (as on the usual breakout
/// boards). Afterwards the SDIO pin can be handed to the I2C peripheral.
#[maybe_async_attr]
pub async fn reset<RST, SDIO, D>(
    rst: &mut RST,
    sdio: &mut SDIO,
    delay: &mut D,
) -> Result<(), RST::Error>
where
    RST: OutputPin,
    SDIO: OutputPin<Error = RST::Error>,
    D: hal_type::delay::DelayNs,
{
    sdio.set_low()?;
    rst.set_low()?;
    delay.delay_ms(1).await;

    rst.set_high()?;
    delay.delay_ms(1).await;

    Ok(())
}

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Uninitialized> {
    /// Create a new instance of `Si4703`
    ///
    /// Requires the I2C bus, the input pin connected to GPIO2 (the seek/tune
    /// complete line), a delay provider and a millisecond clock. Nothing is
    /// sent to the chip until [`Si4703::power_on`], which expects the chip to
    /// be in 2-wire mode already (see [`reset`]).
    pub fn new(i2c: I2C, stc: INT, delay: D, clock: CLK, config: Config) -> Self {
        Si4703 {
            ll: ll::Si4703::new(i2c),
            stc,
            delay,
            clock,
            config,
            state: Uninitialized,
        }
    }
}

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Uninitialized>
where
    I2C: hal_type::i2c::I2c,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Powers the chip up and applies the configuration
    ///
    /// Starts the crystal oscillator, waits for it to settle, then enables
    /// the chip with RDS, the STC interrupt on GPIO2, and the configured
    /// band, spacing, de-emphasis and volume. Takes a little over 600 ms.
    #[maybe_async_attr]
    pub async fn power_on(mut self) -> Result<Si4703<I2C, INT, D, CLK, Ready>, Error<I2C>> {
        let volume = self.config.volume;
        self.power_up(volume).await?;

        Ok(Si4703 {
            ll: self.ll,
            stc: self.stc,
            delay: self.delay,
            clock: self.clock,
            config: self.config,
            state: Ready,
        })
    }
}

impl<I2C, INT, D, CLK, State> Si4703<I2C, INT, D, CLK, State>
where
    I2C: hal_type::i2c::I2c,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Starts the oscillator and enables the chip with `volume`
    #[maybe_async_attr]
    pub(super) async fn power_up(&mut self, volume: u8) -> Result<(), Error<I2C>> {
        debug!("starting oscillator");
        self.refresh().await?;
        self.ll.test1().modify(|_, w| w.xoscen(1));
        self.ll.sysconfig1().modify(|_, w| w.stcien(1));
        self.commit().await?;

        self.pause(OSCILLATOR_SETTLE).await;

        let config = self.config;
        debug!("enabling the chip: {:?}", config);
        self.refresh().await?;
        self.ll
            .powercfg()
            .modify(|_, w| w.enable(1).disable(0).dmute(1));
        self.ll.sysconfig1().modify(|_, w| {
            w.stcien(1)
                .rds(1)
                .gpio2(GpioMode::Interrupt as u8)
                .de(config.de_emphasis as u8)
        });
        self.ll.sysconfig2().modify(|_, w| {
            w.band(config.band as u8)
                .space(config.spacing as u8)
                .volume(volume.min(15))
        });
        self.commit().await?;

        self.pause(POWER_UP).await;

        Ok(())
    }
}
