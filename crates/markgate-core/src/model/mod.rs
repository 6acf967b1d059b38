//! Domain model: device records and validated network identity types.

pub mod device;
pub mod ident;

pub use device::{Device, DeviceId, DeviceUpdate, UserBinding};
pub use ident::{MacAddress, parse_ipv4, validate_ipv4, validate_mac};
