#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use kernel_api::TimerRoutine;
use kernel_api::device::{DeviceCharacteristics, DeviceInit, DeviceObject, DeviceType, DriverObject};
use kernel_api::io::{IoManager, PowerManager, dispatch_request};
use kernel_api::pnp::PnpMinorFunction;
use kernel_api::power::{DevicePowerState, PowerMinorFunction, PowerState};
use kernel_api::request::{
    DriverStep, IoStackLocation, MajorFunction, Parameters, PriorityBoost, Request,
};
use kernel_api::status::DriverStatus;
use kernel_api::timer::IoTimer;
use spin::Mutex;
use usbstor::{UsbStorDriver, UsbStorHandlers, driver_entry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created(Option<String>),
    Attached { upper: Option<String>, lower: Option<String> },
    Detached(Option<String>),
    Deleted(Option<String>),
    TimerInitialized(Option<String>),
    Completed { id: u64, status: DriverStatus, information: usize },
    DoubleCompletion(u64),
    CallDriver { id: u64, target: Option<String> },
    StartNextPowerIrp(u64),
    PoCallDriver { id: u64, target: Option<String> },
    LowerSaw { id: u64, location: u8 },
    DeviceControl(u64),
    Scsi(u64),
    FdoPnp(u64),
    PdoPnp(u64),
    StartIo(u64),
    TimerFired(Option<String>),
}

/// Recording I/O and power manager.
#[derive(Default)]
pub struct MockPlatform {
    pub events: Mutex<Vec<Event>>,
    pub fail_create: Mutex<Option<DriverStatus>>,
    pub fail_attach: AtomicBool,
    pub fail_timer: Mutex<Option<DriverStatus>>,
    pub devices: Mutex<Vec<Arc<DeviceObject>>>,
    pub created: Mutex<Vec<Weak<DeviceObject>>>,
    pub timers: Mutex<Vec<Arc<IoTimer>>>,
    next_name: AtomicU64,
}

impl MockPlatform {
    pub fn record(&self, e: Event) {
        self.events.lock().push(e);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Count of devices created through this platform that are still alive.
    pub fn live_devices(&self) -> usize {
        self.created
            .lock()
            .iter()
            .filter(|w| w.upgrade().is_some())
            .count()
    }

    pub fn completions_of(&self, id: u64) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Completed { id: i, .. } if *i == id))
            .count()
    }

    /// One platform timer period.
    pub fn tick_timers(&self) -> usize {
        let timers: Vec<_> = self.timers.lock().clone();
        timers.iter().filter(|t| t.tick()).count()
    }
}

impl IoManager for MockPlatform {
    fn create_device(
        &self,
        driver: &Arc<DriverObject>,
        mut init: DeviceInit,
    ) -> Result<Arc<DeviceObject>, DriverStatus> {
        if let Some(status) = *self.fail_create.lock() {
            return Err(status);
        }
        if init.name.is_none()
            && init
                .characteristics
                .contains(DeviceCharacteristics::AUTOGENERATED_DEVICE_NAME)
        {
            let n = self.next_name.fetch_add(1, Ordering::SeqCst);
            init.name = Some(format!("\\Device\\{:08X}", n));
        }
        let dev = DeviceObject::new(driver.clone(), init);
        self.record(Event::Created(dev.name.clone()));
        self.created.lock().push(Arc::downgrade(&dev));
        self.devices.lock().push(dev.clone());
        Ok(dev)
    }

    fn attach_device_to_device_stack(
        &self,
        source: &Arc<DeviceObject>,
        target: &Arc<DeviceObject>,
    ) -> Option<Arc<DeviceObject>> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return None;
        }
        let top = DeviceObject::top_of_stack(target);
        DeviceObject::set_lower_upper(source, top.clone());
        self.record(Event::Attached {
            upper: source.name.clone(),
            lower: top.name.clone(),
        });
        Some(top)
    }

    fn detach_device(&self, lower: &Arc<DeviceObject>) {
        *lower.upper_device.write() = None;
        self.record(Event::Detached(lower.name.clone()));
    }

    fn delete_device(&self, device: &Arc<DeviceObject>) {
        self.devices.lock().retain(|d| !Arc::ptr_eq(d, device));
        self.timers.lock().retain(|t| !t.is_bound_to(device));
        self.record(Event::Deleted(device.name.clone()));
    }

    fn initialize_timer(
        &self,
        device: &Arc<DeviceObject>,
        routine: TimerRoutine,
    ) -> Result<Arc<IoTimer>, DriverStatus> {
        if let Some(status) = *self.fail_timer.lock() {
            return Err(status);
        }
        let timer = IoTimer::new(device, routine);
        self.timers.lock().push(timer.clone());
        self.record(Event::TimerInitialized(device.name.clone()));
        Ok(timer)
    }

    fn complete_request(&self, request: &mut Request, _boost: PriorityBoost) {
        if !request.mark_completed() {
            self.record(Event::DoubleCompletion(request.id));
            return;
        }
        self.record(Event::Completed {
            id: request.id,
            status: request.io_status.status,
            information: request.io_status.information,
        });
    }

    fn call_driver(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        self.record(Event::CallDriver {
            id: request.id,
            target: device.name.clone(),
        });
        if let Err(status) = request.advance_to_next_location() {
            return status;
        }
        dispatch_request(device, request).unwrap_or(DriverStatus::InvalidDeviceRequest)
    }
}

impl PowerManager for MockPlatform {
    fn start_next_power_irp(&self, request: &Request) {
        self.record(Event::StartNextPowerIrp(request.id));
    }

    fn call_driver(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        self.record(Event::PoCallDriver {
            id: request.id,
            target: device.name.clone(),
        });
        if let Err(status) = request.advance_to_next_location() {
            return status;
        }
        self.record(Event::LowerSaw {
            id: request.id,
            location: request.current_location,
        });
        dispatch_request(device, request).unwrap_or(DriverStatus::InvalidDeviceRequest)
    }
}

/// Stand-ins for the ioctl, SCSI, PnP, start-I/O and timer code.
pub struct MockHandlers {
    platform: Arc<MockPlatform>,
    pub ioctl_step: Mutex<DriverStep>,
    pub scsi_pending: AtomicBool,
}

impl MockHandlers {
    pub fn new(platform: Arc<MockPlatform>) -> Self {
        Self {
            platform,
            ioctl_step: Mutex::new(DriverStep::complete(DriverStatus::Success)),
            scsi_pending: AtomicBool::new(false),
        }
    }

    fn finish(&self, request: &mut Request, status: DriverStatus) -> DriverStatus {
        request.set_status(status, 0);
        IoManager::complete_request(&*self.platform, request, PriorityBoost::NoIncrement);
        status
    }
}

impl UsbStorHandlers for MockHandlers {
    fn handle_device_control(
        &self,
        _device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStep {
        self.platform.record(Event::DeviceControl(request.id));
        let step = *self.ioctl_step.lock();
        match step {
            DriverStep::Complete { .. } => request.io_status.information = 36,
            DriverStep::Completed { status } => {
                self.finish(request, status);
            }
            DriverStep::Pending => {}
        }
        step
    }

    fn handle_internal_device_control(
        &self,
        _device: &Arc<DeviceObject>,
        request: &mut Request,
    ) -> DriverStatus {
        self.platform.record(Event::Scsi(request.id));
        if self.scsi_pending.load(Ordering::SeqCst) {
            return DriverStatus::Pending;
        }
        self.finish(request, DriverStatus::DeviceNotReady)
    }

    fn fdo_handle_pnp(&self, _device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        self.platform.record(Event::FdoPnp(request.id));
        self.finish(request, DriverStatus::Success)
    }

    fn pdo_handle_pnp(&self, _device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        self.platform.record(Event::PdoPnp(request.id));
        self.finish(request, DriverStatus::NotImplemented)
    }

    fn start_io(&self, _device: &Arc<DeviceObject>, request: &mut Request) {
        self.platform.record(Event::StartIo(request.id));
    }

    fn timer_routine(&self, device: &Arc<DeviceObject>) {
        self.platform.record(Event::TimerFired(device.name.clone()));
    }
}

/// Status the hub's power routine hands back for every forwarded request.
pub const BUS_POWER_STATUS: DriverStatus = DriverStatus::Pending;

fn bus_power(_device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
    request.set_status(DriverStatus::Success, 0);
    BUS_POWER_STATUS
}

/// Status a hub port whose device stopped answering reports for power requests.
pub const DEAD_PORT_POWER_STATUS: DriverStatus = DriverStatus::DeviceNotReady;

fn dead_port_power(_device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
    request.set_status(DEAD_PORT_POWER_STATUS, 0);
    DEAD_PORT_POWER_STATUS
}

/// A bus device on another hub port whose power handling fails.
pub fn dead_port_pdo() -> Arc<DeviceObject> {
    let mut hub = DriverObject::new(String::from("usbhub"));
    hub.configure(|cfg| {
        cfg.on_major(MajorFunction::Power, dead_port_power);
    });
    DeviceObject::new(
        Arc::new(hub),
        DeviceInit::new(DeviceType::Unknown).with_name(String::from("\\Device\\HubPort5")),
    )
}

pub struct Harness {
    pub platform: Arc<MockPlatform>,
    pub handlers: Arc<MockHandlers>,
    pub driver: Arc<DriverObject>,
    pub bus_pdo: Arc<DeviceObject>,
}

impl Harness {
    pub fn new() -> Self {
        let platform = Arc::new(MockPlatform::default());
        let handlers = Arc::new(MockHandlers::new(platform.clone()));

        let mut driver = DriverObject::new(String::from("usbstor"));
        let status = driver_entry(
            &mut driver,
            UsbStorDriver::new(platform.clone(), platform.clone(), handlers.clone()),
        );
        assert_eq!(status, DriverStatus::Success);

        let mut hub = DriverObject::new(String::from("usbhub"));
        hub.configure(|cfg| {
            cfg.on_major(MajorFunction::Power, bus_power);
        });
        let bus_pdo = DeviceObject::new(
            Arc::new(hub),
            DeviceInit::new(DeviceType::Unknown).with_name(String::from("\\Device\\HubPort3")),
        );

        Self {
            platform,
            handlers,
            driver: Arc::new(driver),
            bus_pdo,
        }
    }

    pub fn ctx(&self) -> &UsbStorDriver {
        UsbStorDriver::from_driver(&self.driver).expect("driver context")
    }

    /// Bus arrival through the registered add-device callback.
    pub fn add_device(&self) -> DriverStatus {
        let add = self.driver.evt_device_add.expect("add-device registered");
        add(&self.driver, &self.bus_pdo)
    }

    pub fn started_fdo(&self) -> Arc<DeviceObject> {
        assert_eq!(self.add_device(), DriverStatus::Success);
        DeviceObject::top_of_stack(&self.bus_pdo)
    }

    pub fn child(&self, fdo: &Arc<DeviceObject>, lun: u8) -> Arc<DeviceObject> {
        self.ctx().create_child_node(fdo, lun).expect("child node")
    }

    /// A device of this driver whose extension was never published.
    pub fn unready_device(&self) -> Arc<DeviceObject> {
        let mut init = DeviceInit::new(DeviceType::BusExtender);
        init.reserve_dev_ext::<usbstor::NodeExtension>();
        IoManager::create_device(&*self.platform, &self.driver, init).expect("device")
    }

    /// The I/O manager's view: look the routine up in the table and call it.
    pub fn send(&self, device: &Arc<DeviceObject>, request: &mut Request) -> DriverStatus {
        dispatch_request(device, request).expect("major function registered")
    }
}

pub fn request(id: u64, major: MajorFunction, parameters: Parameters) -> Request {
    Request::new(id, IoStackLocation::new(major, parameters), 4)
}

pub fn create(id: u64) -> Request {
    request(id, MajorFunction::Create, Parameters::None)
}

pub fn close(id: u64) -> Request {
    request(id, MajorFunction::Close, Parameters::None)
}

pub fn pnp(id: u64, minor: PnpMinorFunction) -> Request {
    request(id, MajorFunction::Pnp, Parameters::Pnp(minor))
}

pub fn set_power(id: u64) -> Request {
    request(
        id,
        MajorFunction::Power,
        Parameters::Power {
            minor: PowerMinorFunction::SetPower,
            state: PowerState::Device(DevicePowerState::D3),
        },
    )
}
