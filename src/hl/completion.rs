//! Seek/tune completion handshake
//!
//! Starting a tune or seek sets a start bit (TUNE or SEEK). When the chip is
//! done it raises STC, which pulls GPIO2 low. The driver then has to clear the
//! start bit again and wait for the chip to drop STC before the next
//! operation may start.

use embedded_hal::digital::InputPin;

use crate::{
    hal_type, maybe_async_attr,
    time::{Clock, Instant},
    Error, Ready, Si4703,
};

/// Progress of a seek/tune completion handshake
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StcPhase {
    /// No operation in flight
    Idle,
    /// The start bit is set in the shadow, but not written yet
    Requested,
    /// Waiting for the chip to pull the completion line low
    AwaitingHardwareSignal,
    /// The chip signalled completion, the start bit needs clearing
    Acknowledging,
    /// Waiting for the chip to drop STC
    AwaitingStatusClear,
}

/// The operation a handshake completes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Operation {
    Tune,
    Seek,
}

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Ready>
where
    I2C: hal_type::i2c::I2c,
    INT: InputPin,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Checks the seek/tune complete line
    ///
    /// GPIO2 is active low. Returns `WouldBlock` while the chip is still
    /// busy, so this can be driven with [`block!`](crate::block).
    pub fn stc_signalled(&mut self) -> nb::Result<(), Error<I2C>> {
        match self.stc.is_low() {
            Ok(true) => Ok(()),
            Ok(false) => Err(nb::Error::WouldBlock),
            Err(_) => Err(nb::Error::Other(Error::InterruptPin)),
        }
    }

    /// Runs the completion handshake for an operation whose start bit is set
    /// in the shadow
    ///
    /// Returns the SF/BL bit as it was when the chip signalled completion.
    #[maybe_async_attr]
    pub(crate) async fn complete(&mut self, operation: Operation) -> Result<bool, Error<I2C>> {
        let timeout = match operation {
            Operation::Tune => self.config.tune_timeout,
            Operation::Seek => self.config.seek_timeout,
        };
        let poll_interval = self.config.stc_poll_interval;
        let deadline = self.clock.now() + timeout;

        let mut failed = false;
        let mut phase = StcPhase::Requested;
        while phase != StcPhase::Idle {
            phase = match phase {
                StcPhase::Requested => {
                    self.commit().await?;
                    StcPhase::AwaitingHardwareSignal
                }
                StcPhase::AwaitingHardwareSignal => match self.stc_signalled() {
                    Ok(()) => StcPhase::Acknowledging,
                    Err(nb::Error::WouldBlock) => {
                        if self.expired(deadline) {
                            warn!("{:?} did not signal completion", operation);
                            self.abort(operation).await;
                            return Err(Error::StcTimeout);
                        }
                        self.pause(poll_interval).await;
                        StcPhase::AwaitingHardwareSignal
                    }
                    Err(nb::Error::Other(error)) => return Err(error),
                },
                StcPhase::Acknowledging => {
                    self.refresh().await?;
                    failed = self.ll.statusrssi().read().sfbl() == 1;
                    self.clear_start_bit(operation);
                    self.commit().await?;
                    StcPhase::AwaitingStatusClear
                }
                StcPhase::AwaitingStatusClear => {
                    self.refresh().await?;
                    if self.ll.statusrssi().read().stc() == 0 {
                        StcPhase::Idle
                    } else if self.expired(deadline) {
                        warn!("STC still set after {:?}", operation);
                        return Err(Error::StcTimeout);
                    } else {
                        self.pause(poll_interval).await;
                        StcPhase::AwaitingStatusClear
                    }
                }
                StcPhase::Idle => StcPhase::Idle,
            };
        }

        debug!("{:?} complete, SF/BL: {}", operation, failed);
        Ok(failed)
    }

    fn expired(&mut self, deadline: Instant) -> bool {
        self.clock.now() >= deadline
    }

    fn clear_start_bit(&mut self, operation: Operation) {
        match operation {
            Operation::Tune => self.ll.channel().modify(|_, w| w.tune(0)),
            Operation::Seek => self.ll.powercfg().modify(|_, w| w.seek(0)),
        }
    }

    /// Drops the start bit after a timeout, so the chip isn't left busy
    #[maybe_async_attr]
    async fn abort(&mut self, operation: Operation) {
        self.clear_start_bit(operation);
        if self.commit().await.is_err() {
            warn!("could not clear the start bit");
        }
    }
}
