#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
//!
//! Implements a vendor-specific FPGA configuration protocol for a `usb-device` device.
//!
//! ## About
//!
//! A host splits an FPGA bitstream into chunks and sends every chunk
//! in the data stage of a vendor control request. The device streams
//! the bytes, in order, into the FPGA through its slave-parallel
//! configuration interface: one byte on the 8-bit data bus per `CCLK`
//! pulse. The host can reset the FPGA, read an identity descriptor,
//! and poll a status record with a running checksum and byte counter
//! to confirm that the bitstream arrived intact.
//!
//! Every chunk except the last one has the fixed size
//! [`ConfigPort::CHUNK_SIZE`]. A chunk of any other size, including an
//! empty one, ends the bitstream: the device issues extra clock pulses
//! so the FPGA can run its start-up sequence, and reports itself as
//! configured.
//!
//! This library is a protocol implementation only. Access to the pins
//! wired to the FPGA is provided by the library user through the
//! [`ConfigPort`] trait.
//!
//! ### Vendor requests
//!
//! | Request | Code   | Direction | Reply |
//! |---------|--------|-----------|-------|
//! | Get identity | `0x22` | IN  | 40-byte [`IdentityDescriptor`] |
//! | Get status   | `0x30` | IN  | 9-byte [`UploadStatus`] |
//! | Reset FPGA   | `0x31` | OUT | none |
//! | Send chunk   | `0x32` | OUT | none, acknowledged once the chunk is streamed |
//!
//! Unsupported requests are stalled.
//!
//! ### Status layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | `1` while unconfigured |
//! | 1 | 1 | checksum, sum of all bytes modulo 256 |
//! | 2 | 4 | bytes transferred, little endian |
//! | 6 | 1 | `INIT_B` diagnostic, `222` after a successful configuration |
//! | 7 | 1 | last `INIT_B` sample |
//! | 8 | 1 | bit order |
//!
//! ### Limitations
//!
//! * `usb-device` buffers the whole data stage of a control transfer,
//! so [`ConfigPort::CHUNK_SIZE`] is limited to the control buffer size,
//! which is `128` bytes by default (`256` with the `control-buffer-256`
//! feature). With other USB stacks [`Dispatcher`] can be fed packet by
//! packet.
//!
//! ## Example
//!
//! ```no_run
//! use usb_device::bus::{UsbBus, UsbBusAllocator};
//! use usb_device::prelude::*;
//! use usbd_fpga_loader::*;
//!
//! // Pins of the board. Here, they are plain fields for brevity.
//! struct Pins {
//!     port_a: u8,
//!     port_b: u8,
//!     port_b_output: bool,
//! }
//!
//! impl ConfigPort for Pins {
//!     const CHUNK_SIZE: u16 = 64;
//!
//!     fn set_lines(&mut self, lines: ConfigLines) {
//!         self.port_a = lines.to_bits();
//!     }
//!
//!     fn write_data(&mut self, byte: u8) {
//!         self.port_b = byte;
//!     }
//!
//!     fn init_high(&mut self) -> bool {
//!         // TODO: read INIT_B pin
//!         true
//!     }
//!
//!     fn enable_data_output(&mut self) {
//!         self.port_b_output = true;
//!     }
//! }
//!
//! static IDENTITY: IdentityDescriptor =
//!     IdentityDescriptor::new(*b"FPGA", [10, 11, 0, 0], *b"0000000001");
//!
//! fn run<B: UsbBus>(usb_bus_alloc: &UsbBusAllocator<B>) -> ! {
//!     let pins = Pins { port_a: 0, port_b: 0, port_b_output: false };
//!
//!     // Create FpgaLoaderClass
//!     let mut loader = FpgaLoaderClass::new(usb_bus_alloc, pins, &IDENTITY);
//!
//!     let mut usb_dev = UsbDeviceBuilder::new(usb_bus_alloc, UsbVidPid(0x221a, 0x0100))
//!         .build();
//!
//!     loop {
//!         // usb_dev.poll() must be called periodically. Chunk data is
//!         // streamed to the FPGA from inside poll().
//!         usb_dev.poll(&mut [&mut loader]);
//!     }
//! }
//! ```
//!

/// FPGA loader USB class module
pub mod class;
pub mod descriptor;
pub mod dispatch;
pub mod driver;
pub mod port;
pub mod signal;
pub mod status;
pub mod uploader;

#[doc(inline)]
pub use crate::class::FpgaLoaderClass;
#[doc(inline)]
pub use crate::descriptor::IdentityDescriptor;
#[doc(inline)]
pub use crate::dispatch::{Dispatcher, OutResponse, VendorRequest};
#[doc(inline)]
pub use crate::driver::ConfigDriver;
#[doc(inline)]
pub use crate::port::{BitOrder, ConfigLines, ConfigPort};
#[doc(inline)]
pub use crate::signal::EventFlag;
#[doc(inline)]
pub use crate::status::UploadStatus;
#[doc(inline)]
pub use crate::uploader::{ChunkUploader, Progress, UploadError};
