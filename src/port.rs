//! Configuration bus lines and the hardware handle that drives them.

/// `INIT_B` pin, open drain, low while the FPGA clears its configuration memory.
pub const INIT_B_BIT: u8 = 1 << 0;
/// `PROGRAM_B` pin, active low.
pub const PROGRAM_B_BIT: u8 = 1 << 1;
/// `RDWR_B` pin, low selects write direction.
pub const RDWR_B_BIT: u8 = 1 << 3;
/// Mode strap, held high for slave-parallel configuration.
pub const MODE_BIT: u8 = 1 << 5;
/// Configuration clock.
pub const CCLK_BIT: u8 = 1 << 6;
/// `CSI_B` chip select, active low.
pub const CSI_B_BIT: u8 = 1 << 7;

/// Order in which bitstream bytes are placed on the data bus.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    /// Bytes are driven as received, bit 7 on `D7`.
    MsbFirst = 0,
    /// Bits of every byte are reversed before they are driven.
    LsbFirst = 1,
}

impl BitOrder {
    /// Apply this bit order to a bitstream byte.
    pub fn apply(self, byte: u8) -> u8 {
        match self {
            BitOrder::MsbFirst => byte,
            BitOrder::LsbFirst => byte.reverse_bits(),
        }
    }
}

/// Logical levels of the configuration control lines.
///
/// `true` is electrical high for every line; active-low lines are
/// asserted when `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigLines {
    /// `PROGRAM_B` level.
    pub program_b: bool,
    /// `INIT_B` level driven by the controller, `true` means released.
    pub init_b: bool,
    /// `CCLK` level.
    pub cclk: bool,
    /// Mode and chip select group: `CSI_B` and `RDWR_B` low when `true`.
    pub selected: bool,
}

impl ConfigLines {
    /// Lines at rest: nothing asserted, clock low, interface deselected.
    pub const IDLE: ConfigLines = ConfigLines {
        program_b: true,
        init_b: true,
        cclk: false,
        selected: false,
    };

    /// Encode the lines as a raw port pattern.
    ///
    /// Bit positions are [`INIT_B_BIT`], [`PROGRAM_B_BIT`], [`CCLK_BIT`],
    /// [`CSI_B_BIT`], [`RDWR_B_BIT`] and [`MODE_BIT`]. The mode strap is
    /// always set.
    pub fn to_bits(self) -> u8 {
        let mut bits = MODE_BIT;
        if self.init_b {
            bits |= INIT_B_BIT;
        }
        if self.program_b {
            bits |= PROGRAM_B_BIT;
        }
        if self.cclk {
            bits |= CCLK_BIT;
        }
        if !self.selected {
            bits |= CSI_B_BIT | RDWR_B_BIT;
        }
        bits
    }
}

impl Default for ConfigLines {
    fn default() -> Self {
        Self::IDLE
    }
}

impl From<ConfigLines> for u8 {
    fn from(lines: ConfigLines) -> Self {
        lines.to_bits()
    }
}

/// Handle to the pins wired to the target FPGA.
///
/// [`ConfigDriver`](crate::driver::ConfigDriver) owns the handle and is the
/// only code that touches it. Constants tailor the protocol to the board and
/// to the host-side loader.
pub trait ConfigPort {
    /// Size of every non-final bitstream chunk sent by the host. Default: `128` bytes.
    ///
    /// A chunk of any other size (including `0`) ends the bitstream.
    ///
    /// **Warning**: must be less or equal of `usb-device`'s control endpoint buffer
    /// size (`128` bytes, `256` with the `control-buffer-256` feature), otherwise
    /// chunk transfers are stalled by `usb-device` before they reach this crate.
    const CHUNK_SIZE: u16 = 128;

    /// Maximum number of `INIT_B` samples after reset while waiting for
    /// the FPGA to finish clearing its memory. Default: `65535`.
    const INIT_POLL_LIMIT: u32 = 65_535;

    /// Number of extra `CCLK` pulses after the last bitstream byte that
    /// let the FPGA run its start-up sequence. Default: `20000`.
    const STARTUP_CLOCKS: u32 = 20_000;

    /// Time to hold `INIT_B` low after `PROGRAM_B` was pulsed, in
    /// microseconds. Default: `10000`.
    const PROGRAM_PULSE_US: u32 = 10_000;

    /// Bit order of the data bus. Default: [`BitOrder::MsbFirst`].
    const BIT_ORDER: BitOrder = BitOrder::MsbFirst;

    /// Drive the control lines. Implementations usually write
    /// [`ConfigLines::to_bits`] to a GPIO port.
    fn set_lines(&mut self, lines: ConfigLines);

    /// Put a byte on the 8-bit data bus.
    fn write_data(&mut self, byte: u8);

    /// Sample `INIT_B`, `true` if the pin reads high.
    fn init_high(&mut self) -> bool;

    /// Switch the data bus pins to output.
    fn enable_data_output(&mut self);

    /// Busy wait. Default implementation returns immediately.
    fn delay_us(&mut self, _us: u32) {}
}
