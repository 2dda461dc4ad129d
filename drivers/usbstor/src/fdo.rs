use alloc::sync::Arc;
use kernel_api::device::{
    DeviceCharacteristics, DeviceFlags, DeviceInit, DeviceObject, DeviceType, DriverObject,
};
use kernel_api::status::DriverStatus;
use kernel_api::timer::IoTimer;
use log::{debug, error, warn};

use crate::handlers::usbstor_timer_routine;
use crate::{FdoExtension, NodeExtension, UsbStorDriver, UsbStorError};

impl UsbStorDriver {
    /// Builds the function device for a newly arrived USB storage device and
    /// attaches it on top of the stack rooted at `physical_device`.
    ///
    /// Nothing is returned until the node is fully set up: on any failure the
    /// half-built device is torn down first.
    pub fn create_function_node(
        &self,
        driver: &Arc<DriverObject>,
        physical_device: &Arc<DeviceObject>,
    ) -> Result<Arc<DeviceObject>, UsbStorError> {
        let mut init = DeviceInit::new(DeviceType::BusExtender).with_characteristics(
            DeviceCharacteristics::AUTOGENERATED_DEVICE_NAME
                | DeviceCharacteristics::DEVICE_SECURE_OPEN,
        );
        init.reserve_dev_ext::<NodeExtension>();

        let fdo = self.io.create_device(driver, init).map_err(|status| {
            error!("add_device: failed to create FDO status {}", status);
            UsbStorError::NodeCreationFailed(status)
        })?;

        let Some(lower_device) = self.io.attach_device_to_device_stack(&fdo, physical_device)
        else {
            error!("add_device: attach to {:?} failed", physical_device.name);
            self.teardown(&fdo, None, None);
            return Err(UsbStorError::DeviceRemoved);
        };

        let timer = match self.io.initialize_timer(&fdo, usbstor_timer_routine) {
            Ok(timer) => timer,
            Err(status) => {
                error!("add_device: timer init failed status {}", status);
                self.teardown(&fdo, Some(&lower_device), None);
                return Err(UsbStorError::NodeCreationFailed(status));
            }
        };

        fdo.set_flags(DeviceFlags::BUFFERED_IO | DeviceFlags::POWER_PAGABLE);
        fdo.clear_flags(DeviceFlags::DEVICE_INITIALIZING);

        // Publishing the extension is the ready signal, so it goes last.
        let ext = NodeExtension::Function(FdoExtension::new(
            &fdo,
            physical_device,
            &lower_device,
            &timer,
        ));
        if let Err(e) = fdo.publish_devext(ext) {
            error!("add_device: extension publish failed: {:?}", e);
            self.teardown(&fdo, Some(&lower_device), Some(&timer));
            return Err(UsbStorError::NodeCreationFailed(DriverStatus::Unsuccessful));
        }

        debug!("add_device: FDO ready above {:?}", lower_device.name);
        Ok(fdo)
    }

    /// Removes a function device: stops its retry timer, detaches it from
    /// the stack and deletes it. The function-device PnP handler calls this
    /// on remove. A second call on the same node returns `DeviceRemoved` and
    /// touches nothing.
    pub fn destroy_function_node(&self, fdo: &Arc<DeviceObject>) -> DriverStatus {
        match NodeExtension::of(fdo) {
            Ok(NodeExtension::Function(ext)) => {
                if !ext.mark_removed() {
                    warn!("destroy_function_node: {:?} already removed", fdo.name);
                    return DriverStatus::DeviceRemoved;
                }
                self.teardown(fdo, Some(&ext.lower_device), Some(&ext.timer));
                DriverStatus::Success
            }
            Ok(NodeExtension::Child(_)) => {
                warn!("destroy_function_node called on child {:?}", fdo.name);
                DriverStatus::InvalidParameter
            }
            Err(e) => {
                warn!("destroy_function_node on {:?}: {:?}", fdo.name, e);
                DriverStatus::InvalidParameter
            }
        }
    }

    fn teardown(
        &self,
        fdo: &Arc<DeviceObject>,
        lower_device: Option<&Arc<DeviceObject>>,
        timer: Option<&Arc<IoTimer>>,
    ) {
        if let Some(timer) = timer {
            timer.cancel();
        }
        if let Some(lower) = lower_device {
            self.io.detach_device(lower);
        }
        self.io.delete_device(fdo);
    }
}

pub fn usbstor_add_device(
    driver: &Arc<DriverObject>,
    physical_device: &Arc<DeviceObject>,
) -> DriverStatus {
    let Some(drv) = UsbStorDriver::from_driver(driver) else {
        error!("add_device: {} has no driver context", driver.driver_name);
        return DriverStatus::DeviceNotReady;
    };

    match drv.create_function_node(driver, physical_device) {
        Ok(_) => DriverStatus::Success,
        Err(e) => e.status(),
    }
}
