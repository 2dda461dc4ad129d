use alloc::sync::Arc;
use kernel_api::device::{DeviceCharacteristics, DeviceFlags, DeviceInit, DeviceObject, DeviceType};
use kernel_api::status::DriverStatus;
use log::{debug, warn};

use crate::{NodeExtension, UsbStorDriver, UsbStorError};

impl UsbStorDriver {
    /// Creates the child device for logical unit `lun` of `fdo`. Used by the
    /// function-device PnP handler while enumerating the bus.
    pub fn create_child_node(
        &self,
        fdo: &Arc<DeviceObject>,
        lun: u8,
    ) -> Result<Arc<DeviceObject>, UsbStorError> {
        match NodeExtension::of(fdo) {
            Ok(NodeExtension::Function(_)) => {}
            _ => return Err(UsbStorError::NodeCreationFailed(DriverStatus::InvalidParameter)),
        }

        let mut init = DeviceInit::new(DeviceType::MassStorage).with_characteristics(
            DeviceCharacteristics::AUTOGENERATED_DEVICE_NAME
                | DeviceCharacteristics::DEVICE_SECURE_OPEN,
        );
        init.set_dev_ext_from(NodeExtension::child(fdo, lun));

        let pdo = self
            .io
            .create_device(fdo.driver(), init)
            .map_err(UsbStorError::NodeCreationFailed)?;

        pdo.set_flags(DeviceFlags::DIRECT_IO);
        pdo.clear_flags(DeviceFlags::DEVICE_INITIALIZING);
        debug!("created child for lun {}", lun);
        Ok(pdo)
    }

    pub fn destroy_child_node(&self, pdo: &Arc<DeviceObject>) -> DriverStatus {
        match NodeExtension::of(pdo) {
            Ok(NodeExtension::Child(_)) => {
                self.io.delete_device(pdo);
                DriverStatus::Success
            }
            _ => {
                warn!("destroy_child_node called on non-child {:?}", pdo.name);
                DriverStatus::InvalidParameter
            }
        }
    }
}
