#![no_std]
pub extern crate alloc;

pub use kernel_types::{device, pnp, power, request, status, timer};
pub use kernel_types::{
    DispatchRoutine, EvtDriverDeviceAdd, EvtDriverStartIo, EvtDriverUnload, TimerRoutine,
};

pub use kernel_types;
pub use log;

pub mod io;
pub mod klog;
pub mod util;

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ({
        $crate::util::print(&$crate::alloc::format!($($arg)*));
    });
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", $crate::alloc::format!($($arg)*)));
}
