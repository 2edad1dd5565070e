//! Demand-response (DR) signal evaluated once per step, ahead of heating
//! logic.
//!
//! The CSV boundary channel carries this as a small integer code (see
//! `hpwh-io::schedule`); internally it is a bitmask so a step can combine
//! "allow normal operation" with "force a specific source class on"
//! (mirrors the original `DRMODES` bitfield).

use serde::{Deserialize, Serialize};

/// Demand-response signal for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrSignal(u8);

impl DrSignal {
    /// Normal operation is allowed.
    pub const ALLOW: u8 = 1 << 0;
    /// Force the compressor to engage regardless of its turn-on logic.
    pub const ENGAGE_COMPRESSOR: u8 = 1 << 1;
    /// Force the lowest-priority resistance element to engage.
    pub const ENGAGE_RESISTANCE: u8 = 1 << 2;

    /// Turn-on is blocked entirely; no bits set.
    pub const BLOCK: DrSignal = DrSignal(0);

    /// Construct from a raw bitmask / CSV wire code.
    pub fn from_code(code: u8) -> Self {
        Self(code)
    }

    /// The raw bitmask / CSV wire code.
    pub fn code(self) -> u8 {
        self.0
    }

    /// True when every turn-on predicate should be masked off this step.
    pub fn is_blocked(self) -> bool {
        self.0 & (Self::ALLOW | Self::ENGAGE_COMPRESSOR | Self::ENGAGE_RESISTANCE) == 0
    }

    /// True when ordinary heating-logic evaluation should run this step.
    pub fn allows_normal_operation(self) -> bool {
        self.0 & Self::ALLOW != 0
    }

    /// True when the compressor must engage regardless of its own logic.
    pub fn forces_compressor(self) -> bool {
        self.0 & Self::ENGAGE_COMPRESSOR != 0
    }

    /// True when a resistance backup must engage regardless of its own logic.
    pub fn forces_resistance(self) -> bool {
        self.0 & Self::ENGAGE_RESISTANCE != 0
    }
}

impl Default for DrSignal {
    fn default() -> Self {
        Self(Self::ALLOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_code_blocks_everything() {
        let dr = DrSignal::from_code(0);
        assert!(dr.is_blocked());
        assert!(!dr.allows_normal_operation());
        assert!(!dr.forces_compressor());
    }

    #[test]
    fn allow_code_permits_normal_operation() {
        let dr = DrSignal::from_code(DrSignal::ALLOW);
        assert!(!dr.is_blocked());
        assert!(dr.allows_normal_operation());
    }

    #[test]
    fn engage_compressor_bit_forces_compressor() {
        let dr = DrSignal::from_code(DrSignal::ENGAGE_COMPRESSOR);
        assert!(!dr.is_blocked());
        assert!(dr.forces_compressor());
        assert!(!dr.allows_normal_operation());
    }

    #[test]
    fn default_allows_operation() {
        assert!(DrSignal::default().allows_normal_operation());
    }
}
