use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, Ordering};
use kernel_api::device::{DevExtError, DeviceObject};
use kernel_api::timer::IoTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Function,
    Child,
}

/// Extension of the function device, the node for the whole USB device.
#[derive(Debug)]
pub struct FdoExtension {
    pub functional_device: Weak<DeviceObject>,
    pub physical_device: Arc<DeviceObject>,
    pub lower_device: Arc<DeviceObject>,
    pub timer: Arc<IoTimer>,
    removed: AtomicBool,
}

impl FdoExtension {
    pub fn new(
        fdo: &Arc<DeviceObject>,
        physical_device: &Arc<DeviceObject>,
        lower_device: &Arc<DeviceObject>,
        timer: &Arc<IoTimer>,
    ) -> Self {
        Self {
            functional_device: Arc::downgrade(fdo),
            physical_device: physical_device.clone(),
            lower_device: lower_device.clone(),
            timer: timer.clone(),
            removed: AtomicBool::new(false),
        }
    }

    /// Marks the node removed. Returns false if it already was.
    pub(crate) fn mark_removed(&self) -> bool {
        !self.removed.swap(true, Ordering::AcqRel)
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }
}

/// Extension of a child device, one per logical unit.
#[derive(Debug)]
pub struct PdoExtension {
    pub function_device: Weak<DeviceObject>,
    pub lun: u8,
}

impl PdoExtension {
    pub fn new(fdo: &Arc<DeviceObject>, lun: u8) -> Self {
        Self {
            function_device: Arc::downgrade(fdo),
            lun,
        }
    }

    pub fn function_device(&self) -> Option<Arc<DeviceObject>> {
        self.function_device.upgrade()
    }
}

/// Every device this driver owns carries exactly one of these. The variant
/// never changes after the extension is published.
#[derive(Debug)]
pub enum NodeExtension {
    Function(FdoExtension),
    Child(PdoExtension),
}

impl NodeExtension {
    pub fn child(fdo: &Arc<DeviceObject>, lun: u8) -> Self {
        NodeExtension::Child(PdoExtension::new(fdo, lun))
    }

    #[inline]
    pub fn of(device: &DeviceObject) -> Result<&NodeExtension, DevExtError> {
        device.try_devext::<NodeExtension>()
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeExtension::Function(_) => NodeKind::Function,
            NodeExtension::Child(_) => NodeKind::Child,
        }
    }

    pub fn as_function(&self) -> Option<&FdoExtension> {
        match self {
            NodeExtension::Function(fdo) => Some(fdo),
            NodeExtension::Child(_) => None,
        }
    }

    pub fn as_child(&self) -> Option<&PdoExtension> {
        match self {
            NodeExtension::Child(pdo) => Some(pdo),
            NodeExtension::Function(_) => None,
        }
    }
}
