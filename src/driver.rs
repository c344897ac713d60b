//! Slave-parallel configuration interface driver.

use log::{debug, info, warn};

use crate::port::{ConfigLines, ConfigPort};
use crate::status::{
    UploadStatus, DIAG_RESET_INIT_HIGH, DIAG_RESET_INIT_LOW, DIAG_STARTUP_INIT_HIGH,
    DIAG_STARTUP_INIT_LOW,
};

/// Drives the configuration lines and data bus of the target FPGA.
///
/// The driver knows nothing about USB. It keeps the [`UploadStatus`]
/// up to date with every byte it puts on the bus.
pub struct ConfigDriver<P: ConfigPort> {
    port: P,
    lines: ConfigLines,
    status: UploadStatus,
}

impl<P: ConfigPort> ConfigDriver<P> {
    /// Take ownership of the port and drive the lines to their idle levels.
    pub fn new(mut port: P) -> Self {
        port.set_lines(ConfigLines::IDLE);
        Self {
            port,
            lines: ConfigLines::IDLE,
            status: UploadStatus::new(P::BIT_ORDER),
        }
    }

    /// Reset the FPGA and prepare it for a new bitstream.
    ///
    /// Pulses `PROGRAM_B` while holding `INIT_B` low, then releases
    /// `INIT_B` and waits, at most [`ConfigPort::INIT_POLL_LIMIT`] samples,
    /// for the FPGA to let it rise. The outcome is recorded in
    /// [`UploadStatus::reset_diagnostic`]; a timeout is not an error here,
    /// the host learns about it from the status.
    pub fn reset(&mut self) {
        self.lines.selected = false;
        self.lines.cclk = false;

        self.lines.program_b = false;
        self.drive();
        self.lines.init_b = false;
        self.drive();
        self.lines.program_b = true;
        self.drive();
        self.port.delay_us(P::PROGRAM_PULSE_US);
        self.lines.init_b = true;
        self.lines.selected = true;
        self.drive();

        let mut polls = 0;
        let mut init_high = false;
        while polls < P::INIT_POLL_LIMIT {
            polls += 1;
            if self.port.init_high() {
                init_high = true;
                break;
            }
        }

        self.status.clear();
        self.status
            .record_checkpoint(init_high, DIAG_RESET_INIT_HIGH, DIAG_RESET_INIT_LOW);

        self.port.enable_data_output();

        if init_high {
            debug!("fpga reset, INIT_B high after {} polls", polls);
        } else {
            warn!("fpga reset, INIT_B still low after {} polls", polls);
        }
    }

    /// Clock one bitstream byte into the FPGA.
    pub fn stream_byte(&mut self, byte: u8) {
        self.port.write_data(P::BIT_ORDER.apply(byte));
        self.pulse_cclk();
        self.status.record_byte(byte);
    }

    /// Run the FPGA start-up sequence after the last bitstream byte.
    ///
    /// Issues [`ConfigPort::STARTUP_CLOCKS`] clock pulses, samples `INIT_B`
    /// a second time and deselects the interface.
    pub fn finish(&mut self) {
        for _ in 0..P::STARTUP_CLOCKS {
            self.pulse_cclk();
        }

        let init_high = self.port.init_high();
        self.status
            .record_checkpoint(init_high, DIAG_STARTUP_INIT_HIGH, DIAG_STARTUP_INIT_LOW);

        self.lines.selected = false;
        self.drive();

        info!(
            "bitstream finished: {} bytes, checksum {:#04x}, diagnostic {}",
            self.status.bytes_transferred, self.status.checksum, self.status.reset_diagnostic
        );
    }

    /// Record that a complete bitstream has been accepted.
    pub fn mark_configured(&mut self) {
        self.status.unconfigured = false;
    }

    /// Current upload status.
    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Current levels of the control lines.
    pub fn lines(&self) -> ConfigLines {
        self.lines
    }

    /// Shared access to the hardware handle.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Exclusive access to the hardware handle.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    fn pulse_cclk(&mut self) {
        self.lines.cclk = true;
        self.drive();
        self.lines.cclk = false;
        self.drive();
    }

    fn drive(&mut self) {
        self.port.set_lines(self.lines);
    }
}
