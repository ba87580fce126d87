//! A simulated Si4703 for the unit tests
//!
//! The simulation shares one state between the I2C bus, the GPIO2 completion
//! line, the delay and the clock, so delays advance the clock and tune/seek
//! requests raise STC after a configurable latency.

use std::{
    cell::{RefCell, RefMut},
    collections::VecDeque,
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    digital,
    i2c::{self, ErrorKind, NoAcknowledgeSource, Operation},
};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

use crate::{
    ll::{ADDRESS, READ_START, REGISTER_COUNT, WRITE_START},
    time::{Clock, Instant},
    Config, Si4703, Uninitialized,
};

/// The driver wired to a simulated chip
pub(crate) type SimRadio<State> = Si4703<SimBus, SimLine, SimDelay, SimClock, State>;

const POWERCFG: usize = 0x02;
const CHANNEL: usize = 0x03;
const STATUSRSSI: usize = 0x0A;
const READCHAN: usize = 0x0B;
const RDSB: usize = 0x0D;
const RDSD: usize = 0x0F;

const SEEK: u16 = 1 << 8;
const TUNE: u16 = 1 << 15;
const RDSR: u16 = 1 << 15;
const STC: u16 = 1 << 14;
const SFBL: u16 = 1 << 13;
const CHAN_MASK: u16 = 0x03ff;

pub(crate) struct SimState {
    /// The chip's register file
    pub regs: [u16; REGISTER_COUNT],
    /// Simulated time, advanced by `SimDelay`
    pub now_ns: u64,
    /// Time between a tune/seek request and STC
    pub stc_latency_ms: u64,
    /// Reads for which STC stays set after the start bit was cleared
    pub stc_clear_lag: u32,
    /// READCHAN value a seek lands on, `None` makes the seek fail
    pub seek_result: Option<u16>,
    /// Keeps GPIO2 high no matter what
    pub line_stuck_high: bool,
    /// RDS groups (block B, block D) delivered one per read
    pub rds_groups: VecDeque<(u16, u16)>,
    /// Number of upcoming reads that fail
    pub fail_reads: u32,
    /// Number of upcoming writes that are not acknowledged
    pub fail_writes: u32,
    /// Buffer length of every read attempt
    pub read_lengths: Vec<usize>,
    /// Bytes of the last successful read
    pub last_read: Vec<u8>,
    /// Bytes of every write attempt
    pub writes: Vec<Vec<u8>>,
    /// Every `delay_ms` call
    pub delays_ms: Vec<u32>,
    stc_at_ms: Option<u64>,
    stc_clear_after: Option<u32>,
}

impl SimState {
    fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }

    fn stc_raised(&self) -> bool {
        matches!(self.stc_at_ms, Some(at) if self.now_ms() >= at)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), ErrorKind> {
        self.read_lengths.push(buffer.len());
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(ErrorKind::Other);
        }

        self.update_status();

        for (i, word) in buffer.chunks_mut(2).enumerate() {
            let register = (READ_START + i) % REGISTER_COUNT;
            let bytes = self.regs[register].to_be_bytes();
            let len = word.len();
            word.copy_from_slice(&bytes[..len]);
        }
        self.last_read = buffer.to_vec();

        Ok(())
    }

    fn update_status(&mut self) {
        if self.stc_raised() {
            self.regs[STATUSRSSI] |= STC;
        }

        match self.stc_clear_after {
            Some(0) => {
                self.regs[STATUSRSSI] &= !(STC | SFBL);
                self.stc_clear_after = None;
            }
            Some(reads) => self.stc_clear_after = Some(reads - 1),
            None => {}
        }

        match self.rds_groups.pop_front() {
            Some((block_b, block_d)) => {
                self.regs[STATUSRSSI] |= RDSR;
                self.regs[RDSB] = block_b;
                self.regs[RDSD] = block_d;
            }
            None => self.regs[STATUSRSSI] &= !RDSR,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.writes.push(bytes.to_vec());
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }

        for (i, word) in bytes.chunks_exact(2).enumerate() {
            self.regs[WRITE_START + i] = u16::from_be_bytes([word[0], word[1]]);
        }

        let tune = self.regs[CHANNEL] & TUNE != 0;
        let seek = self.regs[POWERCFG] & SEEK != 0;
        let busy = self.stc_at_ms.is_some() || self.regs[STATUSRSSI] & STC != 0;

        if (tune || seek) && !busy {
            self.stc_at_ms = Some(self.now_ms() + self.stc_latency_ms);

            let found = if tune {
                Some(self.regs[CHANNEL] & CHAN_MASK)
            } else {
                self.seek_result
            };
            match found {
                Some(channel) => {
                    self.regs[READCHAN] = (self.regs[READCHAN] & !CHAN_MASK) | channel;
                    self.regs[STATUSRSSI] &= !SFBL;
                }
                None => self.regs[STATUSRSSI] |= SFBL,
            }
        } else if !tune && !seek && busy {
            self.stc_at_ms = None;
            self.stc_clear_after = Some(self.stc_clear_lag);
        }

        Ok(())
    }
}

/// Handle to the simulation, hands out the individual peripherals
#[derive(Clone)]
pub(crate) struct SimDevice {
    state: Rc<RefCell<SimState>>,
}

impl SimDevice {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut regs = [0; REGISTER_COUNT];
        regs[0x00] = 0x1242;
        regs[0x01] = 0x1253;
        regs[0x07] = 0x0100;

        SimDevice {
            state: Rc::new(RefCell::new(SimState {
                regs,
                now_ns: 0,
                stc_latency_ms: 60,
                stc_clear_lag: 0,
                seek_result: None,
                line_stuck_high: false,
                rds_groups: VecDeque::new(),
                fail_reads: 0,
                fail_writes: 0,
                read_lengths: Vec::new(),
                last_read: Vec::new(),
                writes: Vec::new(),
                delays_ms: Vec::new(),
                stc_at_ms: None,
                stc_clear_after: None,
            })),
        }
    }

    /// A driver that owns this simulation's peripherals
    pub fn radio(&self, config: Config) -> SimRadio<Uninitialized> {
        Si4703::new(self.bus(), self.line(), self.delay(), self.clock(), config)
    }

    pub fn state(&self) -> RefMut<'_, SimState> {
        self.state.borrow_mut()
    }

    pub fn bus(&self) -> SimBus {
        SimBus(self.state.clone())
    }

    pub fn line(&self) -> SimLine {
        SimLine(self.state.clone())
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.state.clone())
    }

    pub fn clock(&self) -> SimClock {
        SimClock(self.state.clone())
    }
}

/// The I2C side of the simulation
pub(crate) struct SimBus(Rc<RefCell<SimState>>);

impl SimBus {
    fn execute(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        if address != ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        let mut state = self.0.borrow_mut();
        for operation in operations {
            match operation {
                Operation::Read(buffer) => state.read(buffer)?,
                Operation::Write(bytes) => state.write(bytes)?,
            }
        }

        Ok(())
    }
}

impl i2c::ErrorType for SimBus {
    type Error = ErrorKind;
}

impl i2c::I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.execute(address, operations)
    }
}

impl embedded_hal_async::i2c::I2c for SimBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.execute(address, operations)
    }
}

/// GPIO2, low while STC is raised
pub(crate) struct SimLine(Rc<RefCell<SimState>>);

impl digital::ErrorType for SimLine {
    type Error = Infallible;
}

impl digital::InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let state = self.0.borrow();
        Ok(!state.line_stuck_high && state.stc_raised())
    }
}

/// Delay that advances the simulated clock
pub(crate) struct SimDelay(Rc<RefCell<SimState>>);

impl SimDelay {
    fn advance(&mut self, ns: u64) {
        self.0.borrow_mut().now_ns += ns;
    }

    fn record(&mut self, ms: u32) {
        let mut state = self.0.borrow_mut();
        state.delays_ms.push(ms);
        state.now_ns += u64::from(ms) * 1_000_000;
    }
}

impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(ms);
    }
}

impl embedded_hal_async::delay::DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(ms);
    }
}

/// Millisecond view of the simulated time
pub(crate) struct SimClock(Rc<RefCell<SimState>>);

impl Clock for SimClock {
    fn now(&mut self) -> Instant {
        Instant::from_millis(self.0.borrow().now_ms())
    }
}

/// `embedded-hal-mock`'s I2C mock behind the async trait
///
/// The mock only implements the blocking `I2c`, the async methods forward to
/// it.
pub(crate) struct MockBus(I2cMock);

impl MockBus {
    pub fn new(expectations: &[I2cTransaction]) -> Self {
        MockBus(I2cMock::new(expectations))
    }

    pub fn done(&mut self) {
        self.0.done();
    }
}

impl i2c::ErrorType for MockBus {
    type Error = ErrorKind;
}

impl i2c::I2c for MockBus {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        i2c::I2c::read(&mut self.0, address, read)
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        i2c::I2c::write(&mut self.0, address, write)
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        i2c::I2c::transaction(&mut self.0, address, operations)
    }
}

impl embedded_hal_async::i2c::I2c for MockBus {
    async fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        i2c::I2c::read(&mut self.0, address, read)
    }

    async fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        i2c::I2c::write(&mut self.0, address, write)
    }

    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        i2c::I2c::transaction(&mut self.0, address, operations)
    }
}
