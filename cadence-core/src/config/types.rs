//! Configuration type definitions

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum back-end name length
pub const MAX_NAME_LEN: usize = 32;

/// Default tick rate (Hz)
pub const DEFAULT_RATE_HZ: u16 = 10;

/// Highest accepted tick rate (Hz)
pub const MAX_RATE_HZ: u16 = 1000;

/// Default back-end
pub const DEFAULT_BACKEND: &str = "simulated";

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Tick rate of the periodic driver (Hz)
    pub rate_hz: u16,
    /// Whether the runtime drives ticks itself
    pub auto_spin: bool,
    /// Back-end selected at start-up
    pub backend: String<MAX_NAME_LEN>,
}

impl ControllerConfig {
    /// Tick rate clamped to `1..=MAX_RATE_HZ`
    pub fn effective_rate_hz(&self) -> u16 {
        self.rate_hz.clamp(1, MAX_RATE_HZ)
    }

    /// Tick period in milliseconds
    pub fn tick_period_ms(&self) -> u32 {
        1000 / self.effective_rate_hz() as u32
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let mut backend = String::new();
        let _ = backend.push_str(DEFAULT_BACKEND);
        Self {
            rate_hz: DEFAULT_RATE_HZ,
            auto_spin: true,
            backend,
        }
    }
}

/// Back-end tuning shared by the bundled engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackendConfig {
    /// How many steps past the executing one the engine wants in flight
    pub lookahead: u8,
    /// Steps the engine buffers before reporting busy
    pub buffer_steps: u8,
    /// Dispatch a step with this index fails (dry-run fault injection)
    pub fail_at: Option<u32>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            lookahead: 1,
            buffer_steps: 4,
            fail_at: None,
        }
    }
}
