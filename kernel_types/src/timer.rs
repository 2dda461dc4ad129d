use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::TimerRoutine;
use crate::device::DeviceObject;

/// One-second device timer. The platform calls `tick` on every registered
/// timer; the routine only runs while the timer is started and the device
/// is still alive.
#[derive(Debug)]
#[repr(C)]
pub struct IoTimer {
    device: Weak<DeviceObject>,
    routine: TimerRoutine,
    running: AtomicBool,
    cancelled: AtomicBool,
}

impl IoTimer {
    pub fn new(device: &Arc<DeviceObject>, routine: TimerRoutine) -> Arc<Self> {
        Arc::new(Self {
            device: Arc::downgrade(device),
            routine,
            running: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn start(&self) {
        if !self.is_cancelled() {
            self.running.store(true, Ordering::Release);
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Stops the timer for good.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.stop();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.is_cancelled()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_bound_to(&self, device: &Arc<DeviceObject>) -> bool {
        core::ptr::eq(self.device.as_ptr(), Arc::as_ptr(device))
    }

    /// Returns true if the routine ran.
    pub fn tick(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(device) = self.device.upgrade() else {
            return false;
        };
        (self.routine)(&device);
        true
    }
}
