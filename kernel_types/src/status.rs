use strum::Display;

#[repr(i32)]
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Success = 0x0000_0000,
    Pending = 0x0000_0103,
    Unsuccessful = 0xC000_0001u32 as i32,
    NotImplemented = 0xC000_0002u32 as i32,
    InvalidParameter = 0xC000_000Du32 as i32,
    NoSuchDevice = 0xC000_000Eu32 as i32,
    InvalidDeviceRequest = 0xC000_0010u32 as i32,
    InsufficientResources = 0xC000_009Au32 as i32,
    DeviceNotReady = 0xC000_00A3u32 as i32,
    DeviceRemoved = 0xC000_02B6u32 as i32,
}

impl DriverStatus {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// NT rule: every non-negative code (including `Pending`) is a success code.
    #[inline]
    pub fn is_success(self) -> bool {
        self.code() >= 0
    }
}
