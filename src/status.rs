//! Upload status as seen by the host.

use crate::port::BitOrder;

/// Size of the status reply, in bytes.
pub const STATUS_LEN: usize = 9;

/// `INIT_B` rose after reset within [`ConfigPort::INIT_POLL_LIMIT`](crate::port::ConfigPort::INIT_POLL_LIMIT) samples.
pub const DIAG_RESET_INIT_HIGH: u8 = 200;
/// `INIT_B` stayed low after reset.
pub const DIAG_RESET_INIT_LOW: u8 = 100;
/// `INIT_B` was high after the start-up clocks.
pub const DIAG_STARTUP_INIT_HIGH: u8 = 22;
/// `INIT_B` was low after the start-up clocks, configuration failed.
pub const DIAG_STARTUP_INIT_LOW: u8 = 11;

/// State of the bitstream upload since the last target reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadStatus {
    /// `true` until a complete bitstream was streamed to the target.
    pub unconfigured: bool,
    /// Sum, modulo 256, of every byte streamed since the last reset.
    pub checksum: u8,
    /// Number of bytes streamed since the last reset.
    pub bytes_transferred: u32,
    /// `INIT_B` checkpoint codes accumulated since the last reset, see
    /// `DIAG_*` constants. `222` after a successful configuration.
    pub reset_diagnostic: u8,
    /// Level of `INIT_B` at the last checkpoint.
    pub init_high: bool,
    /// Bit order used on the data bus.
    pub bit_order: BitOrder,
}

impl UploadStatus {
    /// Baseline status: unconfigured, nothing transferred.
    pub fn new(bit_order: BitOrder) -> Self {
        Self {
            unconfigured: true,
            checksum: 0,
            bytes_transferred: 0,
            reset_diagnostic: 0,
            init_high: false,
            bit_order,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.unconfigured = true;
        self.checksum = 0;
        self.bytes_transferred = 0;
        self.reset_diagnostic = 0;
    }

    pub(crate) fn record_byte(&mut self, byte: u8) {
        self.checksum = self.checksum.wrapping_add(byte);
        self.bytes_transferred = self.bytes_transferred.saturating_add(1);
    }

    pub(crate) fn record_checkpoint(&mut self, init_high: bool, high: u8, low: u8) {
        self.init_high = init_high;
        self.reset_diagnostic = self
            .reset_diagnostic
            .wrapping_add(if init_high { high } else { low });
    }
}

impl From<UploadStatus> for [u8; STATUS_LEN] {
    fn from(status: UploadStatus) -> Self {
        let count = status.bytes_transferred.to_le_bytes();
        [
            status.unconfigured as u8,
            status.checksum,
            // bytes transferred, little endian
            count[0],
            count[1],
            count[2],
            count[3],
            status.reset_diagnostic,
            status.init_high as u8,
            status.bit_order as u8,
        ]
    }
}
