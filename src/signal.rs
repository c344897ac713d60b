//! Interrupt to run loop signalling.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single producer, single consumer event flag.
///
/// The USB interrupt handler calls [`raise()`](EventFlag::raise) when a
/// setup packet arrives; the run loop calls [`take()`](EventFlag::take)
/// once per iteration and services the USB device when it returns `true`.
/// Neither side touches the upload state from interrupt context.
///
/// ```
/// use usbd_fpga_loader::EventFlag;
///
/// static SETUP_PENDING: EventFlag = EventFlag::new();
///
/// // in the interrupt handler
/// SETUP_PENDING.raise();
///
/// // in the run loop
/// if SETUP_PENDING.take() {
///     // usb_dev.poll(&mut [&mut loader]);
/// }
/// assert!(!SETUP_PENDING.take());
/// ```
pub struct EventFlag {
    raised: AtomicBool,
}

impl EventFlag {
    /// Flag in the lowered state.
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Raise the flag. Raising an already raised flag has no effect.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Lower the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        // no compare-and-swap on every target
        critical_section::with(|_| {
            let raised = self.raised.load(Ordering::Acquire);
            self.raised.store(false, Ordering::Relaxed);
            raised
        })
    }

    /// `true` if the flag is raised, without lowering it.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for EventFlag {
    fn default() -> Self {
        Self::new()
    }
}
