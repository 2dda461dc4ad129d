use alloc::sync::Arc;
use kernel_api::device::DeviceObject;
use kernel_api::request::{DriverStep, Request};
use kernel_api::status::DriverStatus;
use log::error;

use crate::UsbStorDriver;

/// The pieces of the driver that live outside the routing layer: ioctl and
/// SCSI handling, the PnP state machines, start-I/O and transport retry.
pub trait UsbStorHandlers: Send + Sync {
    /// May complete the request itself; the returned step says who completes.
    fn handle_device_control(&self, device: &Arc<DeviceObject>, request: &mut Request)
    -> DriverStep;

    /// Owns completion of every request it receives.
    fn handle_internal_device_control(
        &self,
        device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStatus;

    /// PnP for the function device. Owns completion.
    fn fdo_handle_pnp(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus;

    /// PnP for a child device. Owns completion.
    fn pdo_handle_pnp(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus;

    fn start_io(&self, device: &Arc<DeviceObject>, request: &mut Request);

    /// Called once a second while the function device's timer runs.
    fn timer_routine(&self, device: &Arc<DeviceObject>);
}

pub fn usbstor_start_io(device: &Arc<DeviceObject>, request: &mut Request) {
    match UsbStorDriver::from_device(device) {
        Some(drv) => drv.handlers.start_io(device, request),
        None => error!("start_io: no driver context for {:?}", device.name),
    }
}

pub fn usbstor_timer_routine(device: &Arc<DeviceObject>) {
    if let Some(drv) = UsbStorDriver::from_device(device) {
        drv.handlers.timer_routine(device);
    }
}
