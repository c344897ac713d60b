#![allow(dead_code)]
use usb_device::class::UsbClass;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::UsbDirection;
use usbd_class_tester::prelude::*;

use usbd_fpga_loader::dispatch::{GET_IDENTITY, GET_STATUS, RESET_TARGET, SEND_CHUNK};
use usbd_fpga_loader::*;

pub const SIM_STARTUP_CLOCKS: u32 = 100;
pub const SIM_INIT_POLL_LIMIT: u32 = 1000;

pub static IDENTITY: IdentityDescriptor =
    IdentityDescriptor::new(*b"ZTEX", [10, 11, 0, 0], *b"0123456789");

/// Simulated configuration bus of a target FPGA.
///
/// Every byte put on the data bus is latched by the next rising edge of CCLK.
pub struct SimPort<const CHUNK: u16 = 128> {
    pub lines: ConfigLines,
    /// raw pattern of every control line update
    pub trace: Vec<u8>,
    pub data: u8,
    fresh: bool,
    /// bytes seen by the FPGA, in order
    pub latched: Vec<u8>,
    /// rising CCLK edges
    pub clocks: u32,
    /// INIT_B rises after this many polls, never if None
    pub init_delay: Option<u32>,
    pub init_polls: u32,
    /// every INIT_B sample
    pub init_samples: u32,
    pub data_output: bool,
}

/// Port with the default chunk size.
pub type Port = SimPort<128>;
/// Port for hosts sending 2 KiB chunks, fed by 64 byte packets.
pub type WidePort = SimPort<2048>;

impl<const CHUNK: u16> SimPort<CHUNK> {
    pub fn new() -> Self {
        Self::with_init_delay(Some(3))
    }

    pub fn with_init_delay(init_delay: Option<u32>) -> Self {
        Self {
            lines: ConfigLines::IDLE,
            trace: Vec::new(),
            data: 0,
            fresh: false,
            latched: Vec::new(),
            clocks: 0,
            init_delay,
            init_polls: 0,
            init_samples: 0,
            data_output: false,
        }
    }

    pub fn startup_clocks(&self) -> u32 {
        self.clocks - self.latched.len() as u32
    }
}

impl<const CHUNK: u16> ConfigPort for SimPort<CHUNK> {
    const CHUNK_SIZE: u16 = CHUNK;
    const INIT_POLL_LIMIT: u32 = SIM_INIT_POLL_LIMIT;
    const STARTUP_CLOCKS: u32 = SIM_STARTUP_CLOCKS;

    fn set_lines(&mut self, lines: ConfigLines) {
        if !lines.program_b {
            self.init_polls = 0;
        }
        if !self.lines.cclk && lines.cclk {
            self.clocks += 1;
            if self.fresh {
                self.latched.push(self.data);
                self.fresh = false;
            }
        }
        self.lines = lines;
        self.trace.push(lines.to_bits());
    }

    fn write_data(&mut self, byte: u8) {
        self.data = byte;
        self.fresh = true;
    }

    fn init_high(&mut self) -> bool {
        self.init_samples += 1;
        if !self.lines.init_b || !self.lines.program_b {
            return false;
        }
        match self.init_delay {
            None => false,
            Some(delay) => {
                self.init_polls += 1;
                self.init_polls > delay
            }
        }
    }

    fn enable_data_output(&mut self) {
        self.data_output = true;
    }
}

/// Same bus, wired with reversed data bits.
pub struct LsbPort(pub Port);

impl ConfigPort for LsbPort {
    const INIT_POLL_LIMIT: u32 = SIM_INIT_POLL_LIMIT;
    const STARTUP_CLOCKS: u32 = SIM_STARTUP_CLOCKS;
    const BIT_ORDER: BitOrder = BitOrder::LsbFirst;

    fn set_lines(&mut self, lines: ConfigLines) {
        self.0.set_lines(lines)
    }

    fn write_data(&mut self, byte: u8) {
        self.0.write_data(byte)
    }

    fn init_high(&mut self) -> bool {
        self.0.init_high()
    }

    fn enable_data_output(&mut self) {
        self.0.enable_data_output()
    }
}

pub fn vendor_request(direction: UsbDirection, request: u8, length: u16) -> Request {
    Request {
        direction,
        request_type: RequestType::Vendor,
        recipient: Recipient::Device,
        request,
        value: 0,
        index: 0,
        length,
    }
}

pub fn get_status_request() -> Request {
    vendor_request(UsbDirection::In, GET_STATUS, 9)
}

pub fn reset_request() -> Request {
    vendor_request(UsbDirection::Out, RESET_TARGET, 0)
}

pub fn chunk_request(length: u16) -> Request {
    vendor_request(UsbDirection::Out, SEND_CHUNK, length)
}

/// Bytes `0x00, 0x01, ... 0xff, 0x00, ...`
pub fn counting_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i & 0xff) as u8).collect()
}

/// Deterministic pseudo random bytes.
pub fn noise_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (x >> 16) as u8
        })
        .collect()
}

pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

pub fn status(unconfigured: bool, checksum: u8, bytes: u32, diag: u8, init: bool) -> [u8; 9] {
    let b = bytes.to_le_bytes();
    [
        unconfigured as u8,
        checksum,
        b[0],
        b[1],
        b[2],
        b[3],
        diag,
        init as u8,
        0,
    ]
}

pub trait DeviceExt<C> {
    fn vendor_read(&mut self, cls: &mut C, req: u8, length: u16) -> AnyResult<Vec<u8>>;
    fn vendor_write(&mut self, cls: &mut C, req: u8, data: &[u8]) -> AnyResult<Vec<u8>>;

    fn get_identity(&mut self, cls: &mut C) -> AnyResult<Vec<u8>>;
    fn get_status(&mut self, cls: &mut C) -> AnyResult<Vec<u8>>;
    fn reset_target(&mut self, cls: &mut C) -> AnyResult<Vec<u8>>;
    fn send_chunk(&mut self, cls: &mut C, data: &[u8]) -> AnyResult<Vec<u8>>;

    /// Split a bitstream in `chunk` sized transfers, terminated by a short one.
    fn upload(&mut self, cls: &mut C, bitstream: &[u8], chunk: usize) -> AnyResult<()>;
}

impl<'a, C, M> DeviceExt<C> for Device<'a, C, M>
where
    C: UsbClass<EmulatedUsbBus>,
    M: UsbDeviceCtx<C<'a> = C>,
{
    fn vendor_read(&mut self, cls: &mut C, req: u8, length: u16) -> AnyResult<Vec<u8>> {
        self.control_read(cls, CtrRequestType::to_host().vendor(), req, 0, 0, length)
    }

    fn vendor_write(&mut self, cls: &mut C, req: u8, data: &[u8]) -> AnyResult<Vec<u8>> {
        if data.len() > u16::MAX as usize {
            return Err(AnyUsbError::DataConversion);
        }
        self.control_write(
            cls,
            CtrRequestType::to_device().vendor(),
            req,
            0,
            0,
            data.len() as u16,
            data,
        )
    }

    fn get_identity(&mut self, cls: &mut C) -> AnyResult<Vec<u8>> {
        self.vendor_read(cls, GET_IDENTITY, 40)
    }

    fn get_status(&mut self, cls: &mut C) -> AnyResult<Vec<u8>> {
        self.vendor_read(cls, GET_STATUS, 9)
    }

    fn reset_target(&mut self, cls: &mut C) -> AnyResult<Vec<u8>> {
        self.vendor_write(cls, RESET_TARGET, &[])
    }

    fn send_chunk(&mut self, cls: &mut C, data: &[u8]) -> AnyResult<Vec<u8>> {
        self.vendor_write(cls, SEND_CHUNK, data)
    }

    fn upload(&mut self, cls: &mut C, bitstream: &[u8], chunk: usize) -> AnyResult<()> {
        let mut last = 0;
        for block in bitstream.chunks(chunk) {
            self.send_chunk(cls, block)?;
            last = block.len();
        }
        if last == chunk || bitstream.is_empty() {
            self.send_chunk(cls, &[])?;
        }
        Ok(())
    }
}
