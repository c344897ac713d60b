//! Identity descriptor returned to the host.

/// Size of the identity descriptor, in bytes.
pub const IDENTITY_DESCRIPTOR_LEN: usize = 40;

/// Capability bit, byte 0: device can configure an FPGA.
pub const CAPABILITY_FPGA_CONFIGURATION: u8 = 1 << 1;

/// Fixed record that identifies the device and its protocol revision.
///
/// The host reads it positionally:
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0      | 1    | descriptor size, always `40` |
/// | 1      | 1    | format version |
/// | 2      | 4    | vendor tag |
/// | 6      | 4    | product identifier |
/// | 10     | 1    | firmware version |
/// | 11     | 1    | interface version |
/// | 12     | 6    | capabilities |
/// | 18     | 12   | reserved |
/// | 30     | 10   | serial number |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentityDescriptor {
    /// Descriptor format version.
    pub version: u8,
    /// Vendor tag, usually four ASCII characters.
    pub vendor_tag: [u8; 4],
    /// Product identifier.
    pub product_id: [u8; 4],
    /// Firmware version.
    pub firmware_version: u8,
    /// Version of the vendor command interface.
    pub interface_version: u8,
    /// Capability bitfield, see `CAPABILITY_*` constants.
    pub capabilities: [u8; 6],
    /// Reserved for the board, sent as is.
    pub reserved: [u8; 12],
    /// Serial number string.
    pub serial: [u8; 10],
}

impl IdentityDescriptor {
    /// Descriptor with format and interface version `1`, the FPGA
    /// configuration capability set and everything else zeroed.
    pub const fn new(vendor_tag: [u8; 4], product_id: [u8; 4], serial: [u8; 10]) -> Self {
        Self {
            version: 1,
            vendor_tag,
            product_id,
            firmware_version: 0,
            interface_version: 1,
            capabilities: [CAPABILITY_FPGA_CONFIGURATION, 0, 0, 0, 0, 0],
            reserved: [0; 12],
            serial,
        }
    }

    /// Serialize in the layout the host expects.
    pub fn to_bytes(&self) -> [u8; IDENTITY_DESCRIPTOR_LEN] {
        let mut buf = [0u8; IDENTITY_DESCRIPTOR_LEN];
        buf[0] = IDENTITY_DESCRIPTOR_LEN as u8;
        buf[1] = self.version;
        buf[2..6].copy_from_slice(&self.vendor_tag);
        buf[6..10].copy_from_slice(&self.product_id);
        buf[10] = self.firmware_version;
        buf[11] = self.interface_version;
        buf[12..18].copy_from_slice(&self.capabilities);
        buf[18..30].copy_from_slice(&self.reserved);
        buf[30..40].copy_from_slice(&self.serial);
        buf
    }
}
