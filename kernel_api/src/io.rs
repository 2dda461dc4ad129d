use alloc::sync::Arc;

use kernel_types::TimerRoutine;
use kernel_types::device::{DeviceInit, DeviceObject, DriverObject};
use kernel_types::request::{PriorityBoost, Request};
use kernel_types::status::DriverStatus;
use kernel_types::timer::IoTimer;

/// I/O manager services available to drivers.
pub trait IoManager: Send + Sync {
    /// Allocates a device object owned by `driver`. The new device has
    /// `DEVICE_INITIALIZING` set until its driver clears it.
    fn create_device(
        &self,
        driver: &Arc<DriverObject>,
        init: DeviceInit,
    ) -> Result<Arc<DeviceObject>, DriverStatus>;

    /// Attaches `source` on top of the stack that contains `target` and
    /// returns the device it now sits on, or `None` if the stack refused.
    fn attach_device_to_device_stack(
        &self,
        source: &Arc<DeviceObject>,
        target: &Arc<DeviceObject>,
    ) -> Option<Arc<DeviceObject>>;

    /// Detaches whatever is attached directly above `lower`.
    fn detach_device(&self, lower: &Arc<DeviceObject>);

    /// Releases the device and any timers bound to it.
    fn delete_device(&self, device: &Arc<DeviceObject>);

    fn initialize_timer(
        &self,
        device: &Arc<DeviceObject>,
        routine: TimerRoutine,
    ) -> Result<Arc<IoTimer>, DriverStatus>;

    /// Completes `request` with whatever is in its `io_status`.
    fn complete_request(&self, request: &mut Request, boost: PriorityBoost);

    /// Hands `request` to the driver of `device` at the next stack location.
    fn call_driver(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus;
}

/// Power manager services available to drivers.
pub trait PowerManager: Send + Sync {
    /// Allows the next power request queued for this stack to proceed.
    fn start_next_power_irp(&self, request: &Request);

    /// Power-request flavor of `IoManager::call_driver`.
    fn call_driver(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus;
}

/// Runs `request` through the dispatch table of the driver that owns
/// `device`. `None` if that driver registered nothing for the major code.
pub fn dispatch_request(device: &Arc<DeviceObject>, request: &mut Request) -> Option<DriverStatus> {
    let routine = device.driver().major_function(request.major())?;
    Some(routine(device, request))
}
