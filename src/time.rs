//! Millisecond time types used for timeouts and pacing
//!
//! The Si4703 has no clock of its own that the driver could read, so wall-clock
//! time comes from the host through the [`Clock`] trait. Both [`Instant`] and
//! [`Duration`] have millisecond resolution, which is the granularity of every
//! delay the chip asks for.

use core::ops::{Add, Sub};

#[cfg(feature = "defmt")]
use defmt::Format;

/// A source of monotonic wall-clock time
///
/// Implement this for whatever timer your platform offers (a SysTick counter,
/// an RTC, `std::time::Instant` on a host). The driver only compares instants
/// it obtained from the same clock, so the epoch doesn't matter.
pub trait Clock {
    /// Returns the current time
    fn now(&mut self) -> Instant;
}

/// Represents an instant in time, in milliseconds since an arbitrary epoch
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Instant(u64);

impl Instant {
    /// Creates a new instance of `Instant`
    ///
    /// # Example
    ///
    /// ``` rust
    /// use si4703_ng::time::{Duration, Instant};
    ///
    /// let start = Instant::from_millis(1_000);
    /// let deadline = start + Duration::from_millis(250);
    ///
    /// assert_eq!(deadline.as_millis(), 1_250);
    /// ```
    pub const fn from_millis(value: u64) -> Self {
        Instant(value)
    }

    /// Returns the raw millisecond count
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the amount of time passed between the two `Instant`s
    ///
    /// Saturates to zero if `earlier` is actually later than `self`.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use si4703_ng::time::Instant;
    ///
    /// let earlier = Instant::from_millis(40);
    /// let later = Instant::from_millis(100);
    ///
    /// assert_eq!(later.duration_since(earlier).as_millis(), 60);
    /// assert_eq!(earlier.duration_since(later).as_millis(), 0);
    /// ```
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        let elapsed = self.0.saturating_sub(earlier.0);
        Duration(u32::try_from(elapsed).unwrap_or(u32::MAX))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Self::Output {
        Instant(self.0.saturating_add(rhs.0 as u64))
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.duration_since(rhs)
    }
}

/// A duration, in milliseconds
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Duration(u32);

impl Duration {
    /// Creates a new instance of `Duration` from milliseconds
    pub const fn from_millis(value: u32) -> Self {
        Duration(value)
    }

    /// Creates a new instance of `Duration` from whole seconds
    ///
    /// Saturates at `u32::MAX` milliseconds.
    pub const fn from_secs(value: u32) -> Self {
        Duration(value.saturating_mul(1_000))
    }

    /// Returns the duration in milliseconds
    pub const fn as_millis(&self) -> u32 {
        self.0
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Self::Output {
        Duration(self.0.saturating_add(rhs.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instant_ordering_follows_millis() {
        let a = Instant::from_millis(10);
        let b = a + Duration::from_millis(5);

        assert!(b > a);
        assert_eq!(b - a, Duration::from_millis(5));
    }

    #[test]
    fn addition_saturates() {
        let end = Instant::from_millis(u64::MAX - 1) + Duration::from_millis(10);
        assert_eq!(end.as_millis(), u64::MAX);

        let long = Duration::from_millis(u32::MAX) + Duration::from_millis(1);
        assert_eq!(long.as_millis(), u32::MAX);
    }

    #[test]
    fn seconds_convert_to_millis() {
        assert_eq!(Duration::from_secs(15).as_millis(), 15_000);
        assert_eq!(Duration::from_secs(u32::MAX).as_millis(), u32::MAX);
    }
}
