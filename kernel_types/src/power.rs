#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMinorFunction {
    WaitWake = 0x00,
    PowerSequence = 0x01,
    SetPower = 0x02,
    QueryPower = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SystemPowerState {
    Working = 1,
    Sleeping1 = 2,
    Sleeping2 = 3,
    Sleeping3 = 4,
    Hibernate = 5,
    Shutdown = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DevicePowerState {
    D0 = 1,
    D1 = 2,
    D2 = 3,
    D3 = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum PowerState {
    System(SystemPowerState),
    Device(DevicePowerState),
}
