//! RDS text accumulation
//!
//! Each RDS group carries two characters of the programme service name in
//! block D, and block B's low two bits say which of the four character pairs
//! it is. [`RdsAccumulator`] collects those pairs until all four slots are
//! filled. It doesn't look at the group type and keeps no state across calls
//! to [`Si4703::read_rds`].
//!
//! [`Si4703::read_rds`]: ../hl/struct.Si4703.html#method.read_rds

/// Number of text bytes collected
pub const TEXT_LEN: usize = 8;

/// Number of two-byte slots
pub const SLOT_COUNT: usize = TEXT_LEN / 2;

/// Block B values at or above this are treated as garbage from a partial read
pub const BLOCK_B_LIMIT: u16 = 500;

/// Four-slot accumulator for the 8 character RDS text
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdsAccumulator {
    slots: [Option<[u8; 2]>; SLOT_COUNT],
    filled: usize,
}

impl RdsAccumulator {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one group's block B and block D
    ///
    /// Returns the slot index if the pair was taken. Pairs are rejected when
    /// block B is implausible or the slot is already filled.
    pub fn accept(&mut self, block_b: u16, block_d: u16) -> Option<usize> {
        if block_b >= BLOCK_B_LIMIT {
            return None;
        }

        let index = usize::from(block_b & 0b11);
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return None;
        }

        *slot = Some(block_d.to_be_bytes());
        self.filled += 1;

        Some(index)
    }

    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// True once every slot holds a character pair
    pub fn is_complete(&self) -> bool {
        self.filled == SLOT_COUNT
    }

    /// The collected text, if complete
    pub fn text(&self) -> Option<[u8; TEXT_LEN]> {
        let mut text = [0; TEXT_LEN];
        for (pair, slot) in text.chunks_exact_mut(2).zip(&self.slots) {
            pair.copy_from_slice(slot.as_ref()?);
        }

        Some(text)
    }
}
