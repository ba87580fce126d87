use crate::{hal_type, maybe_async_attr, time::Clock, Error, Ready, Si4703, Sleeping};

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Sleeping>
where
    I2C: hal_type::i2c::I2c,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Wakes the radio up
    ///
    /// Runs the full power-up sequence again, so this takes as long as
    /// [`Si4703::power_on`]. The chip comes back on the channel it was tuned
    /// to before, with the volume it had when it was powered down.
    #[maybe_async_attr]
    pub async fn wake_up(mut self) -> Result<Si4703<I2C, INT, D, CLK, Ready>, Error<I2C>> {
        let volume = self.ll.sysconfig2().read().volume();
        debug!("waking up, volume {}", volume);
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
