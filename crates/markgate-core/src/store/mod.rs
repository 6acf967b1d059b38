//! Concurrent device storage.

mod devices;

pub use devices::DeviceStore;
