use crate::{
    hal_type, maybe_async_attr,
    rds::{RdsAccumulator, TEXT_LEN},
    time::{Clock, Duration},
    Error, Ready, Si4703,
};

impl<I2C, INT, D, CLK> Si4703<I2C, INT, D, CLK, Ready>
where
    I2C: hal_type::i2c::I2c,
    D: hal_type::delay::DelayNs,
    CLK: Clock,
{
    /// Collects the 8 character RDS text
    ///
    /// Polls the chip until all four character pairs have been received or
    /// `timeout` has passed. On success the text is written to `buffer[..8]`
    /// followed by a NUL byte, and 8 is returned. On timeout `buffer[0]` is
    /// set to NUL and 0 is returned.
    ///
    /// `buffer` must be at least 9 bytes long.
    #[maybe_async_attr]
    pub async fn read_rds(
        &mut self,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, Error<I2C>> {
        if buffer.len() <= TEXT_LEN {
            return Err(Error::BufferTooSmall {
                required_len: TEXT_LEN + 1,
            });
        }

        let deadline = self.clock.now() + timeout;
        let mut rds = RdsAccumulator::new();

        while !rds.is_complete() && self.clock.now() < deadline {
            self.refresh().await?;

            if self.ll.statusrssi().read().rdsr() == 1 {
                let block_b = self.ll.rdsb().read().value();
                let block_d = self.ll.rdsd().read().value();
                if rds.accept(block_b, block_d).is_some() {
                    debug!("RDS slot {} filled ({:#x})", block_b & 0b11, block_d);
                }

                self.pause(self.config.rds_ready_pause).await;
            } else {
                self.pause(self.config.rds_poll_interval).await;
            }
        }

        match rds.text() {
            Some(text) => {
                buffer[..TEXT_LEN].copy_from_slice(&text);
                buffer[TEXT_LEN] = 0;
                Ok(TEXT_LEN)
            }
            None => {
                debug!("RDS timed out with {} slots filled", rds.filled());
                buffer[0] = 0;
                Ok(0)
            }
        }
    }
}
