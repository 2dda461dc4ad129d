use alloc::sync::Arc;
use kernel_api::device::DeviceObject;
use kernel_api::request::{PriorityBoost, Request};
use kernel_api::status::DriverStatus;
use log::{error, trace};

use crate::{NodeExtension, UsbStorDriver, with_driver};

impl UsbStorDriver {
    /// The function device passes power requests down untouched. A child
    /// device has no stack of its own below it, so it completes them here.
    pub fn dispatch_power(
        &self,
        device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStatus {
        // Exactly once per request, before it is forwarded or completed.
        self.power.start_next_power_irp(request);

        match NodeExtension::of(device) {
            Ok(NodeExtension::Function(fdo)) => {
                trace!("power {:?}: forwarding to lower device", request.location.parameters);
                request.skip_current_stack_location();
                self.power.call_driver(&fdo.lower_device, request)
            }
            Ok(NodeExtension::Child(_)) => {
                if request.is_completed() {
                    error!("power request {} already completed", request.id);
                    return DriverStatus::Success;
                }
                request.io_status.status = DriverStatus::Success;
                self.io.complete_request(request, PriorityBoost::NoIncrement);
                DriverStatus::Success
            }
            Err(e) => {
                error!("power on {:?} before node is ready: {:?}", device.name, e);
                self.complete(request, DriverStatus::DeviceNotReady, 0)
            }
        }
    }
}

pub fn usbstor_dispatch_power(device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
    with_driver(device, request, UsbStorDriver::dispatch_power)
}
