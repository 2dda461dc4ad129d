use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use core::any::{Any, TypeId, type_name};
use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use bitflags::bitflags;
use spin::{Once, RwLock};

use crate::request::{MAJOR_FUNCTION_COUNT, MajorFunction};
use crate::{DispatchRoutine, EvtDriverDeviceAdd, EvtDriverStartIo, EvtDriverUnload};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Unknown = 0x22,
    BusExtender = 0x2A,
    MassStorage = 0x2D,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFlags: u32 {
        const BUFFERED_IO = 0x0000_0004;
        const DIRECT_IO = 0x0000_0010;
        const DEVICE_INITIALIZING = 0x0000_0080;
        const POWER_PAGABLE = 0x0000_2000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceCharacteristics: u32 {
        const AUTOGENERATED_DEVICE_NAME = 0x0000_0080;
        const DEVICE_SECURE_OPEN = 0x0000_0100;
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct DriverConfig<'a> {
    driver: &'a mut DriverObject,
}

impl DriverConfig<'_> {
    pub fn on_device_add(&mut self, cb: EvtDriverDeviceAdd) -> &mut Self {
        self.driver.evt_device_add = Some(cb);
        self
    }
    pub fn on_unload(&mut self, cb: EvtDriverUnload) -> &mut Self {
        self.driver.evt_driver_unload = Some(cb);
        self
    }
    pub fn on_start_io(&mut self, cb: EvtDriverStartIo) -> &mut Self {
        self.driver.evt_start_io = Some(cb);
        self
    }
    pub fn on_major(&mut self, major: MajorFunction, cb: DispatchRoutine) -> &mut Self {
        self.driver.major_function[major.slot()] = Some(cb);
        self
    }
    pub fn set_driver_ext<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.driver.driver_ext = DevExtBox::from_value(value);
        self
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct DriverObject {
    pub driver_name: String,
    driver_ext: DevExtBox,
    pub evt_device_add: Option<EvtDriverDeviceAdd>,
    pub evt_driver_unload: Option<EvtDriverUnload>,
    pub evt_start_io: Option<EvtDriverStartIo>,
    major_function: [Option<DispatchRoutine>; MAJOR_FUNCTION_COUNT],
}

impl DriverObject {
    pub fn new(driver_name: String) -> Self {
        Self {
            driver_name,
            driver_ext: DevExtBox::none(),
            evt_device_add: None,
            evt_driver_unload: None,
            evt_start_io: None,
            major_function: [None; MAJOR_FUNCTION_COUNT],
        }
    }

    /// Fills in the callbacks and dispatch table. Only possible before the
    /// driver object is shared.
    pub fn configure<R, F: FnOnce(&mut DriverConfig<'_>) -> R>(&mut self, f: F) -> R {
        let mut cfg = DriverConfig { driver: self };
        f(&mut cfg)
    }

    #[inline]
    pub fn major_function(&self, major: MajorFunction) -> Option<DispatchRoutine> {
        self.major_function[major.slot()]
    }

    pub fn try_driver_ext<T: 'static>(&self) -> Result<&T, DevExtError> {
        self.driver_ext.get::<T>()
    }
}

#[derive(Debug)]
#[repr(C)]
pub struct DeviceObject {
    pub name: Option<String>,
    pub device_type: DeviceType,
    pub characteristics: DeviceCharacteristics,
    pub stack_size: AtomicU8,
    flags: AtomicU32,
    driver: Arc<DriverObject>,
    dev_ext: DevExtBox,
    pub lower_device: Once<Arc<DeviceObject>>,
    pub upper_device: RwLock<Option<Weak<DeviceObject>>>,
}

impl DeviceObject {
    /// Only the I/O manager builds device objects; drivers go through
    /// `IoManager::create_device`.
    pub fn new(driver: Arc<DriverObject>, mut init: DeviceInit) -> Arc<Self> {
        let dev_ext = init.dev_ext.take().unwrap_or_else(DevExtBox::none);
        Arc::new(Self {
            name: init.name,
            device_type: init.device_type,
            characteristics: init.characteristics,
            stack_size: AtomicU8::new(1),
            flags: AtomicU32::new(DeviceFlags::DEVICE_INITIALIZING.bits()),
            driver,
            dev_ext,
            lower_device: Once::new(),
            upper_device: RwLock::new(None),
        })
    }

    #[inline]
    pub fn driver(&self) -> &Arc<DriverObject> {
        &self.driver
    }

    #[inline]
    pub fn flags(&self) -> DeviceFlags {
        DeviceFlags::from_bits_retain(self.flags.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_flags(&self, flags: DeviceFlags) {
        self.flags.fetch_or(flags.bits(), Ordering::Release);
    }

    #[inline]
    pub fn clear_flags(&self, flags: DeviceFlags) {
        self.flags.fetch_and(!flags.bits(), Ordering::Release);
    }

    #[inline]
    pub fn is_initializing(&self) -> bool {
        self.flags().contains(DeviceFlags::DEVICE_INITIALIZING)
    }

    pub fn try_devext<T: 'static>(&self) -> Result<&T, DevExtError> {
        self.dev_ext.get::<T>()
    }

    /// Fills a slot reserved with `DeviceInit::reserve_dev_ext`. Succeeds once.
    pub fn publish_devext<T: 'static + Send + Sync>(&self, value: T) -> Result<(), DevExtError> {
        self.dev_ext.publish(value)
    }

    pub fn set_lower_upper(this: &Arc<Self>, lower: Arc<DeviceObject>) {
        let depth = lower.stack_size.load(Ordering::Acquire).saturating_add(1);
        this.stack_size.store(depth, Ordering::Release);
        *lower.upper_device.write() = Some(Arc::downgrade(this));
        this.lower_device.call_once(|| lower);
    }

    pub fn upper(&self) -> Option<Arc<DeviceObject>> {
        self.upper_device.read().as_ref().and_then(Weak::upgrade)
    }

    /// Highest device currently attached above `this` (or `this` itself).
    pub fn top_of_stack(this: &Arc<Self>) -> Arc<DeviceObject> {
        let mut top = this.clone();
        while let Some(up) = top.upper() {
            top = up;
        }
        top
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct DeviceInit {
    pub name: Option<String>,
    pub device_type: DeviceType,
    pub characteristics: DeviceCharacteristics,
    pub(crate) dev_ext: Option<DevExtBox>,
}

impl DeviceInit {
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            name: None,
            device_type,
            characteristics: DeviceCharacteristics::empty(),
            dev_ext: None,
        }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_characteristics(mut self, characteristics: DeviceCharacteristics) -> Self {
        self.characteristics = characteristics;
        self
    }

    pub fn set_dev_ext_from<T: 'static + Send + Sync>(&mut self, value: T) {
        self.dev_ext = Some(DevExtBox::from_value(value));
    }

    /// Reserves an extension slot of type `T` that stays empty until the
    /// owner publishes it.
    pub fn reserve_dev_ext<T: 'static + Send + Sync>(&mut self) {
        self.dev_ext = Some(DevExtBox::reserved::<T>());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DevExtError {
    NotPresent,
    NotPublished,
    AlreadyPublished,
    TypeMismatch { expected: &'static str },
}

#[repr(C)]
#[derive(Debug)]
pub(crate) struct DevExtBox {
    inner: Once<Box<dyn Any + Send + Sync>>,
    ty: TypeId,
    present: bool,
}

impl DevExtBox {
    #[inline]
    pub fn none() -> Self {
        Self {
            inner: Once::new(),
            ty: TypeId::of::<()>(),
            present: false,
        }
    }

    #[inline]
    pub fn reserved<T: 'static + Send + Sync>() -> Self {
        Self {
            inner: Once::new(),
            ty: TypeId::of::<T>(),
            present: true,
        }
    }

    #[inline]
    pub fn from_value<T: 'static + Send + Sync>(v: T) -> Self {
        let b = Self::reserved::<T>();
        b.inner
            .call_once(|| Box::new(v) as Box<dyn Any + Send + Sync>);
        b
    }

    pub fn publish<T: 'static + Send + Sync>(&self, v: T) -> Result<(), DevExtError> {
        self.check::<T>()?;
        let mut won = false;
        self.inner.call_once(|| {
            won = true;
            Box::new(v) as Box<dyn Any + Send + Sync>
        });
        if won {
            Ok(())
        } else {
            Err(DevExtError::AlreadyPublished)
        }
    }

    pub fn get<T: 'static>(&self) -> Result<&T, DevExtError> {
        self.check::<T>()?;
        let any: &dyn Any = &**self.inner.get().ok_or(DevExtError::NotPublished)?;
        any.downcast_ref::<T>().ok_or(DevExtError::TypeMismatch {
            expected: type_name::<T>(),
        })
    }

    fn check<T: 'static>(&self) -> Result<(), DevExtError> {
        if !self.present {
            return Err(DevExtError::NotPresent);
        }
        if self.ty != TypeId::of::<T>() {
            return Err(DevExtError::TypeMismatch {
                expected: type_name::<T>(),
            });
        }
        Ok(())
    }
}
