//! Vendor command decoding and routing.

use core::cmp::min;
use log::{debug, warn};
use usb_device::{control::Request, UsbDirection};

use crate::descriptor::{IdentityDescriptor, IDENTITY_DESCRIPTOR_LEN};
use crate::driver::ConfigDriver;
use crate::port::ConfigPort;
use crate::status::{UploadStatus, STATUS_LEN};
use crate::uploader::{ChunkUploader, Progress, UploadError};

/// Device to host: read the [`IdentityDescriptor`].
pub const GET_IDENTITY: u8 = 0x22;
/// Device to host: read the [`UploadStatus`].
pub const GET_STATUS: u8 = 0x30;
/// Host to device: reset the FPGA.
pub const RESET_TARGET: u8 = 0x31;
/// Host to device: send a bitstream chunk, `wLength` is the chunk size.
pub const SEND_CHUNK: u8 = 0x32;

/// Supported vendor requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VendorRequest {
    /// Return the identity descriptor.
    GetIdentity,
    /// Return a snapshot of the upload status.
    GetStatus,
    /// Reset the FPGA and abort any running upload.
    ResetTarget,
    /// Start a chunk of the given size.
    BeginChunk(u16),
}

impl VendorRequest {
    /// Decode a vendor setup packet. Returns `None` for unsupported
    /// request codes, or when the direction does not match the code.
    pub fn decode(req: &Request) -> Option<Self> {
        match (req.direction, req.request) {
            (UsbDirection::In, GET_IDENTITY) => Some(VendorRequest::GetIdentity),
            (UsbDirection::In, GET_STATUS) => Some(VendorRequest::GetStatus),
            (UsbDirection::Out, RESET_TARGET) => Some(VendorRequest::ResetTarget),
            (UsbDirection::Out, SEND_CHUNK) => Some(VendorRequest::BeginChunk(req.length)),
            _ => None,
        }
    }
}

/// Outcome of a host to device request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutResponse {
    /// Request handled, the transfer may complete.
    Accepted,
    /// Waiting for more chunk data before the transfer may complete.
    Pending,
    /// Request not supported or not valid now, stall the transfer.
    Rejected,
}

impl From<Result<Progress, UploadError>> for OutResponse {
    fn from(r: Result<Progress, UploadError>) -> Self {
        match r {
            Ok(p) if p.is_complete() => OutResponse::Accepted,
            Ok(_) => OutResponse::Pending,
            Err(e) => {
                warn!("chunk refused: {:?}", e);
                OutResponse::Rejected
            }
        }
    }
}

/// Routes vendor requests to the uploader and the configuration driver.
///
/// The dispatcher does not depend on a particular USB stack. Setup
/// packets are passed as [`Request`]; data stage bytes of a chunk are
/// fed with [`drain()`](Dispatcher::drain) as they arrive, possibly over
/// several calls.
pub struct Dispatcher<P: ConfigPort> {
    driver: ConfigDriver<P>,
    uploader: ChunkUploader,
    identity: [u8; IDENTITY_DESCRIPTOR_LEN],
    status_reply: [u8; STATUS_LEN],
}

impl<P: ConfigPort> Dispatcher<P> {
    /// Creates a dispatcher driving `port`, answering identity queries
    /// with `identity`.
    pub fn new(port: P, identity: &IdentityDescriptor) -> Self {
        Self {
            driver: ConfigDriver::new(port),
            uploader: ChunkUploader::new(),
            identity: identity.to_bytes(),
            status_reply: [0; STATUS_LEN],
        }
    }

    /// Handle a device to host request. Returns the reply, already
    /// truncated to `wLength`, or `None` if the request must be stalled.
    pub fn handle_in(&mut self, req: &Request) -> Option<&[u8]> {
        let length = req.length as usize;

        match VendorRequest::decode(req) {
            Some(VendorRequest::GetIdentity) if length > 0 => {
                Some(&self.identity[..min(length, IDENTITY_DESCRIPTOR_LEN)])
            }
            Some(VendorRequest::GetStatus) if length > 0 => {
                self.status_reply = self.driver.status().into();
                Some(&self.status_reply[..min(length, STATUS_LEN)])
            }
            _ => {
                warn!(
                    "rejecting vendor IN request {:#04x}, length {}",
                    req.request, req.length
                );
                None
            }
        }
    }

    /// Handle a host to device request.
    ///
    /// [`OutResponse::Pending`] means a chunk was started and the transfer
    /// must not be acknowledged until [`drain()`](Dispatcher::drain)
    /// reports [`OutResponse::Accepted`].
    pub fn handle_out(&mut self, req: &Request) -> OutResponse {
        match VendorRequest::decode(req) {
            Some(VendorRequest::ResetTarget) => {
                self.uploader.abort();
                self.driver.reset();
                OutResponse::Accepted
            }
            Some(VendorRequest::BeginChunk(size)) => {
                self.uploader.begin_chunk(size, &mut self.driver).into()
            }
            _ => {
                warn!("rejecting vendor OUT request {:#04x}", req.request);
                OutResponse::Rejected
            }
        }
    }

    /// Stream newly arrived chunk bytes to the FPGA.
    ///
    /// The batch is streamed inside a critical section.
    pub fn drain(&mut self, data: &[u8]) -> OutResponse {
        let progress = critical_section::with(|_| self.uploader.drain(data, &mut self.driver));
        if let Ok(Progress::Configured) = progress {
            debug!("bitstream upload complete");
        }
        progress.into()
    }

    /// Forget a partially received chunk. The FPGA is not reset and
    /// the bytes already streamed stay counted.
    pub fn abandon_chunk(&mut self) {
        self.uploader.abort();
    }

    /// `true` while a chunk waits for more data.
    pub fn is_receiving(&self) -> bool {
        !self.uploader.is_idle()
    }

    /// Current upload status.
    pub fn status(&self) -> UploadStatus {
        self.driver.status()
    }

    /// State of the chunk being received.
    pub fn uploader(&self) -> &ChunkUploader {
        &self.uploader
    }

    /// The configuration driver.
    pub fn driver(&self) -> &ConfigDriver<P> {
        &self.driver
    }

    /// Exclusive access to the configuration driver.
    pub fn driver_mut(&mut self) -> &mut ConfigDriver<P> {
        &mut self.driver
    }
}
