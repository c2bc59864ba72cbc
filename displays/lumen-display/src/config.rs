//! Driver configuration

/// Default 7-bit bus address (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Alternate 7-bit bus address (SA0 high)
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

/// Display driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Wait before the first command after power-up
    pub startup_delay_ms: u32,
    /// Contrast programmed by the init sequence (reset value 0x80)
    pub contrast: u8,
}

impl DisplayConfig {
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            startup_delay_ms: 100,
            contrast: 0x80,
        }
    }

    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub const fn with_contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    pub const fn with_startup_delay_ms(mut self, ms: u32) -> Self {
        self.startup_delay_ms = ms;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}
