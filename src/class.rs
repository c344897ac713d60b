use core::marker::PhantomData;
use log::warn;
use usb_device::class_prelude::*;
use usb_device::LangID;

use crate::descriptor::IdentityDescriptor;
use crate::dispatch::{Dispatcher, OutResponse};
use crate::port::ConfigPort;
use crate::status::UploadStatus;

const USB_CLASS_VENDOR_SPECIFIC: u8 = 0xFF;
const USB_SUBCLASS_VENDOR_SPECIFIC: u8 = 0xFF;
const USB_PROTOCOL_VENDOR_SPECIFIC: u8 = 0xFF;

const INTERFACE_STRING: &str = "FPGA configuration";

/// FPGA loader USB class implementation for usb-device library.
///
/// Handles vendor requests addressed to the device and leaves every
/// other request to `usb-device` or other classes.
pub struct FpgaLoaderClass<B: UsbBus, P: ConfigPort> {
    if_num: InterfaceNumber,
    interface_string: StringIndex,
    dispatcher: Dispatcher<P>,
    _bus: PhantomData<B>,
}

impl<B: UsbBus, P: ConfigPort> UsbClass<B> for FpgaLoaderClass<B, P> {
    fn get_configuration_descriptors(
        &self,
        writer: &mut DescriptorWriter,
    ) -> usb_device::Result<()> {
        writer.interface_alt(
            self.if_num,
            0,
            USB_CLASS_VENDOR_SPECIFIC,
            USB_SUBCLASS_VENDOR_SPECIFIC,
            USB_PROTOCOL_VENDOR_SPECIFIC,
            Some(self.interface_string),
        )?;

        Ok(())
    }

    fn get_string(&self, index: StringIndex, _lang_id: LangID) -> Option<&str> {
        if index == self.interface_string {
            return Some(INTERFACE_STRING);
        }
        None
    }

    // Handle control requests to the host.
    fn control_in(&mut self, xfer: ControlIn<B>) {
        let req = *xfer.request();

        if !Self::is_vendor_request(&req) {
            return;
        }

        match self.dispatcher.handle_in(&req) {
            Some(reply) => {
                xfer.accept_with(reply).ok();
            }
            None => {
                xfer.reject().ok();
            }
        }
    }

    // Handle a control request from the host.
    fn control_out(&mut self, xfer: ControlOut<B>) {
        let req = *xfer.request();

        if !Self::is_vendor_request(&req) {
            return;
        }

        // usb-device buffers the whole data stage, the chunk is drained at once
        let response = match self.dispatcher.handle_out(&req) {
            OutResponse::Pending => self.dispatcher.drain(xfer.data()),
            other => other,
        };

        match response {
            OutResponse::Accepted => {
                xfer.accept().ok();
            }
            OutResponse::Pending => {
                warn!(
                    "short data stage, {} of {} bytes missing",
                    self.dispatcher.uploader().remaining(),
                    req.length
                );
                self.dispatcher.abandon_chunk();
                xfer.reject().ok();
            }
            OutResponse::Rejected => {
                xfer.reject().ok();
            }
        }
    }

    fn reset(&mut self) {
        if self.dispatcher.is_receiving() {
            warn!("USB reset during chunk transfer");
        }
        self.dispatcher.abandon_chunk();
    }
}

impl<B: UsbBus, P: ConfigPort> FpgaLoaderClass<B, P> {
    /// Creates a new FpgaLoaderClass with the provided UsbBus,
    /// ConfigPort and the descriptor returned to identity queries.
    pub fn new(alloc: &UsbBusAllocator<B>, port: P, identity: &IdentityDescriptor) -> Self {
        Self {
            if_num: alloc.interface(),
            interface_string: alloc.string(),
            dispatcher: Dispatcher::new(port, identity),
            _bus: PhantomData,
        }
    }

    /// Return current upload status.
    pub fn status(&self) -> UploadStatus {
        self.dispatcher.status()
    }

    /// The vendor command dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.dispatcher
    }

    /// Shared access to the configuration port.
    pub fn port(&self) -> &P {
        self.dispatcher.driver().port()
    }

    /// Reset the FPGA from the firmware side, as if the host had
    /// issued the reset request.
    pub fn reset_target(&mut self) {
        self.dispatcher.abandon_chunk();
        self.dispatcher.driver_mut().reset();
    }

    fn is_vendor_request(req: &control::Request) -> bool {
        req.request_type == control::RequestType::Vendor
            && req.recipient == control::Recipient::Device
    }
}
