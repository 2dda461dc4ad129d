use crate::pnp::PnpMinorFunction;
use crate::power::{PowerMinorFunction, PowerState};
use crate::status::DriverStatus;
use alloc::boxed::Box;
use strum::{Display, EnumIter};

/// Size of the per-driver dispatch table (IRP_MJ_MAXIMUM_FUNCTION + 1).
pub const MAJOR_FUNCTION_COUNT: usize = 0x1C;

#[repr(u8)]
#[derive(Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorFunction {
    Create = 0x00,
    Close = 0x02,
    Read = 0x03,
    Write = 0x04,
    DeviceControl = 0x0E,
    /// IRP_MJ_INTERNAL_DEVICE_CONTROL, a.k.a. IRP_MJ_SCSI.
    Scsi = 0x0F,
    Power = 0x16,
    Pnp = 0x1B,
}

impl MajorFunction {
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
#[repr(C)]
pub enum Parameters {
    None,
    Read { offset: u64, len: usize },
    Write { offset: u64, len: usize },
    DeviceControl { ioctl: u32, input_len: usize, output_len: usize },
    Scsi { ioctl: u32 },
    Pnp(PnpMinorFunction),
    Power { minor: PowerMinorFunction, state: PowerState },
}

#[derive(Debug, Clone, PartialEq)]
#[repr(C)]
pub struct IoStackLocation {
    pub major: MajorFunction,
    pub parameters: Parameters,
}

impl IoStackLocation {
    pub fn new(major: MajorFunction, parameters: Parameters) -> Self {
        Self { major, parameters }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct IoStatusBlock {
    pub status: DriverStatus,
    pub information: usize,
}

#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityBoost {
    NoIncrement = 0,
}

/// Who completes a request after a delegated handler returns.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverStep {
    /// The callee left the request alone; the caller completes it with `status`.
    Complete { status: DriverStatus },
    /// The callee completed or forwarded the request already.
    Completed { status: DriverStatus },
    /// The callee queued the request and will complete it later.
    Pending,
}

impl DriverStep {
    #[inline(always)]
    pub fn complete(status: DriverStatus) -> Self {
        DriverStep::Complete { status }
    }

    #[inline(always)]
    pub fn completed(status: DriverStatus) -> Self {
        DriverStep::Completed { status }
    }
}

#[derive(Debug)]
#[repr(C)]
pub struct Request {
    pub id: u64,
    pub location: IoStackLocation,
    pub data: Box<[u8]>,
    pub io_status: IoStatusBlock,
    pub stack_count: u8,
    pub current_location: u8,
    completed: bool,
}

impl Request {
    pub fn new(id: u64, location: IoStackLocation, stack_count: u8) -> Self {
        Self {
            id,
            location,
            data: Box::new([]),
            io_status: IoStatusBlock {
                status: DriverStatus::Pending,
                information: 0,
            },
            stack_count,
            current_location: stack_count,
            completed: false,
        }
    }

    #[inline]
    pub fn major(&self) -> MajorFunction {
        self.location.major
    }

    #[inline]
    pub fn set_status(&mut self, status: DriverStatus, information: usize) {
        self.io_status = IoStatusBlock {
            status,
            information,
        };
    }

    /// Lets the next lower driver reuse the current stack location unchanged.
    #[inline]
    pub fn skip_current_stack_location(&mut self) {
        self.current_location = self.current_location.saturating_add(1);
    }

    /// Moves to the next lower stack location. Called by the I/O manager when
    /// it hands the request to the next driver.
    pub fn advance_to_next_location(&mut self) -> Result<(), DriverStatus> {
        if self.current_location <= 1 {
            return Err(DriverStatus::InvalidDeviceRequest);
        }
        self.current_location -= 1;
        Ok(())
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns false if the request was already completed.
    pub fn mark_completed(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}
