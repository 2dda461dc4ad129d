#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PnpMinorFunction {
    StartDevice = 0x00,
    QueryRemoveDevice = 0x01,
    RemoveDevice = 0x02,
    StopDevice = 0x04,
    QueryDeviceRelations = 0x07,
    QueryCapabilities = 0x09,
    QueryResources = 0x0A,
    QueryId = 0x13,
    SurpriseRemoval = 0x17,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BootType {
    Boot = 0,
    System = 1,
    Demand = 2,
    Disabled = 3,
}

impl BootType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "boot" => Some(BootType::Boot),
            "system" => Some(BootType::System),
            "demand" => Some(BootType::Demand),
            "disabled" => Some(BootType::Disabled),
            _ => None,
        }
    }
}
