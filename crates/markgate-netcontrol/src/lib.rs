// markgate-netcontrol: async RPC client for the firewall-control daemon

pub mod client;
pub mod error;
pub mod protocol;

pub use client::NetcontrolClient;
pub use error::Error;
pub use protocol::{Admission, Confirmation, Request, Response};
