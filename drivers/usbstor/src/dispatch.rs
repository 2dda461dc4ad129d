use alloc::sync::Arc;
use kernel_api::device::DeviceObject;
use kernel_api::request::{DriverStep, PriorityBoost, Request};
use kernel_api::status::DriverStatus;
use log::{error, trace};

use crate::{NodeExtension, UsbStorDriver, with_driver};

impl UsbStorDriver {
    /// Create and close always succeed, on either node kind.
    pub fn dispatch_close(
        &self,
        device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStatus {
        trace!("{} on {:?}", request.major(), device.name);
        self.complete(request, DriverStatus::Success, 0)
    }

    /// Data moves through SCSI requests, never raw read/write.
    pub fn dispatch_read_write(
        &self,
        _device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStatus {
        self.complete(request, DriverStatus::InvalidParameter, 0)
    }

    pub fn dispatch_device_control(
        &self,
        device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStatus {
        match self.handlers.handle_device_control(device, request) {
            DriverStep::Complete { status } => {
                if request.is_completed() {
                    error!(
                        "ioctl handler completed request {} and asked for completion",
                        request.id
                    );
                    return status;
                }
                // Keep whatever byte count the handler reported.
                request.io_status.status = status;
                self.io.complete_request(request, PriorityBoost::NoIncrement);
                status
            }
            DriverStep::Completed { status } => status,
            DriverStep::Pending => DriverStatus::Pending,
        }
    }

    /// SCSI requests belong to the internal-device-control handler, which
    /// completes them.
    pub fn dispatch_scsi(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        self.handlers.handle_internal_device_control(device, request)
    }

    pub fn dispatch_pnp(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        match NodeExtension::of(device) {
            Ok(NodeExtension::Function(_)) => self.handlers.fdo_handle_pnp(device, request),
            Ok(NodeExtension::Child(_)) => self.handlers.pdo_handle_pnp(device, request),
            Err(e) => {
                error!("pnp on {:?} before node is ready: {:?}", device.name, e);
                self.complete(request, DriverStatus::DeviceNotReady, 0)
            }
        }
    }
}

pub fn usbstor_dispatch_close(device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
    with_driver(device, request, UsbStorDriver::dispatch_close)
}

pub fn usbstor_dispatch_read_write(
    device: &Arc<DeviceObject>,
    request: &mut Request,
) -> DriverStatus {
    with_driver(device, request, UsbStorDriver::dispatch_read_write)
}

pub fn usbstor_dispatch_device_control(
    device: &Arc<DeviceObject>,
    request: &mut Request,
) -> DriverStatus {
    with_driver(device, request, UsbStorDriver::dispatch_device_control)
}

pub fn usbstor_dispatch_scsi(device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
    with_driver(device, request, UsbStorDriver::dispatch_scsi)
}

pub fn usbstor_dispatch_pnp(device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
    with_driver(device, request, UsbStorDriver::dispatch_pnp)
}
