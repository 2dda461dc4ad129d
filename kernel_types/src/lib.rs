#![no_std]
extern crate alloc;

pub mod device;
pub mod pnp;
pub mod power;
pub mod request;
pub mod status;
pub mod timer;

use alloc::sync::Arc;

use crate::device::{DeviceObject, DriverObject};
use crate::request::Request;
use crate::status::DriverStatus;

pub type EvtDriverDeviceAdd =
    fn(driver: &Arc<DriverObject>, physical_device: &Arc<DeviceObject>) -> DriverStatus;
pub type EvtDriverUnload = fn(driver: &Arc<DriverObject>);
pub type EvtDriverStartIo = fn(device: &Arc<DeviceObject>, request: &mut Request);

/// One slot of the major-function table.
pub type DispatchRoutine = fn(device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus;

pub type TimerRoutine = fn(device: &Arc<DeviceObject>);
