//! USB bulk-only mass storage: function/child device lifecycle and request
//! routing. SCSI translation, the bulk-only transport, the PnP state machines
//! and the start-I/O queue plug in through [`UsbStorHandlers`].

#![no_std]
extern crate alloc;

mod dev_ext;
mod error;

pub mod dispatch;
pub mod fdo;
pub mod handlers;
pub mod manifest;
pub mod pdo;
pub mod power;

use alloc::sync::Arc;
use kernel_api::device::{DeviceObject, DriverObject};
use kernel_api::io::{IoManager, PowerManager};
use kernel_api::request::{MajorFunction, PriorityBoost, Request};
use kernel_api::status::DriverStatus;
use log::{debug, error};

pub use dev_ext::{FdoExtension, NodeExtension, NodeKind, PdoExtension};
pub use error::UsbStorError;
pub use handlers::UsbStorHandlers;

/// Driver-wide context, stored as the driver object's extension.
pub struct UsbStorDriver {
    pub io: Arc<dyn IoManager>,
    pub power: Arc<dyn PowerManager>,
    pub handlers: Arc<dyn UsbStorHandlers>,
}

impl UsbStorDriver {
    pub fn new(
        io: Arc<dyn IoManager>,
        power: Arc<dyn PowerManager>,
        handlers: Arc<dyn UsbStorHandlers>,
    ) -> Self {
        Self {
            io,
            power,
            handlers,
        }
    }

    #[inline]
    pub fn from_driver(driver: &DriverObject) -> Option<&UsbStorDriver> {
        driver.try_driver_ext::<UsbStorDriver>().ok()
    }

    #[inline]
    pub fn from_device(device: &DeviceObject) -> Option<&UsbStorDriver> {
        Self::from_driver(device.driver())
    }

    /// Completes a request this layer owns. Never completes twice.
    pub(crate) fn complete(
        &self,
        request: &mut Request,
        status: DriverStatus,
        information: usize,
    ) -> DriverStatus {
        if request.is_completed() {
            error!("request {} already completed, not completing again", request.id);
            return status;
        }
        request.set_status(status, information);
        self.io.complete_request(request, PriorityBoost::NoIncrement);
        status
    }
}

type DriverMethod = fn(&UsbStorDriver, &Arc<DeviceObject>, &mut Request) -> DriverStatus;

/// Resolves the driver context for a plain dispatch-table entry.
pub(crate) fn with_driver(
    device: &Arc<DeviceObject>,
    request: &mut Request,
    f: DriverMethod,
) -> DriverStatus {
    match UsbStorDriver::from_device(device) {
        Some(drv) => f(drv, device, request),
        None => {
            // Only reachable if the table was installed without driver_entry.
            // The request is left uncompleted on purpose: without a context
            // there is no I/O manager to complete it through.
            error!(
                "{} request {} on {:?}: no driver context",
                request.major(),
                request.id,
                device.name
            );
            DriverStatus::DeviceNotReady
        }
    }
}

pub fn usbstor_unload(driver: &Arc<DriverObject>) {
    debug!("unloading {}", driver.driver_name);
}

/// Installs the driver context, the add-device/unload/start-I/O callbacks
/// and one dispatch routine per supported major function.
pub fn driver_entry(driver: &mut DriverObject, context: UsbStorDriver) -> DriverStatus {
    debug!("********* USB Storage *********");

    driver.configure(|cfg| {
        cfg.set_driver_ext(context)
            .on_unload(usbstor_unload)
            .on_device_add(fdo::usbstor_add_device)
            .on_start_io(handlers::usbstor_start_io)
            .on_major(MajorFunction::Create, dispatch::usbstor_dispatch_close)
            .on_major(MajorFunction::Close, dispatch::usbstor_dispatch_close)
            .on_major(MajorFunction::DeviceControl, dispatch::usbstor_dispatch_device_control)
            .on_major(MajorFunction::Read, dispatch::usbstor_dispatch_read_write)
            .on_major(MajorFunction::Write, dispatch::usbstor_dispatch_read_write)
            .on_major(MajorFunction::Scsi, dispatch::usbstor_dispatch_scsi)
            .on_major(MajorFunction::Pnp, dispatch::usbstor_dispatch_pnp)
            .on_major(MajorFunction::Power, power::usbstor_dispatch_power);
    });

    DriverStatus::Success
}
