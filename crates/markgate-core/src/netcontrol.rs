//! Capability seam over the firewall-control daemon.
//!
//! The registry talks to the daemon only through this trait, so its
//! logic is testable with a fake in place of real socket IO. The real
//! implementation is [`markgate_netcontrol::NetcontrolClient`].

use std::future::Future;
use std::sync::Arc;

use markgate_netcontrol::{Admission, Confirmation, Error as NetcontrolError, NetcontrolClient};

/// The daemon operations the registry depends on.
pub trait Netcontrol: Send + Sync {
    /// Ask whether a device with this MAC is known/reachable.
    fn confirm(
        &self,
        mac: &str,
    ) -> impl Future<Output = Result<Confirmation, NetcontrolError>> + Send;

    /// Admit a device by IP and resolve its authoritative MAC and area.
    fn register_user(
        &self,
        ip: &str,
    ) -> impl Future<Output = Result<Admission, NetcontrolError>> + Send;

    /// Apply an identity/metadata change; returns the resulting MAC.
    fn update(
        &self,
        mac: &str,
        new_mac: Option<&str>,
        new_name: Option<&str>,
    ) -> impl Future<Output = Result<String, NetcontrolError>> + Send;

    /// Remove a device from active enforcement.
    fn deregister(&self, mac: &str) -> impl Future<Output = Result<(), NetcontrolError>> + Send;
}

impl Netcontrol for NetcontrolClient {
    async fn confirm(&self, mac: &str) -> Result<Confirmation, NetcontrolError> {
        NetcontrolClient::confirm(self, mac).await
    }

    async fn register_user(&self, ip: &str) -> Result<Admission, NetcontrolError> {
        NetcontrolClient::register_user(self, ip).await
    }

    async fn update(
        &self,
        mac: &str,
        new_mac: Option<&str>,
        new_name: Option<&str>,
    ) -> Result<String, NetcontrolError> {
        NetcontrolClient::update(self, mac, new_mac, new_name).await
    }

    async fn deregister(&self, mac: &str) -> Result<(), NetcontrolError> {
        NetcontrolClient::deregister(self, mac).await
    }
}

// Sharing one daemon handle across tasks is the common case.
impl<N: Netcontrol> Netcontrol for Arc<N> {
    fn confirm(
        &self,
        mac: &str,
    ) -> impl Future<Output = Result<Confirmation, NetcontrolError>> + Send {
        N::confirm(self, mac)
    }

    fn register_user(
        &self,
        ip: &str,
    ) -> impl Future<Output = Result<Admission, NetcontrolError>> + Send {
        N::register_user(self, ip)
    }

    fn update(
        &self,
        mac: &str,
        new_mac: Option<&str>,
        new_name: Option<&str>,
    ) -> impl Future<Output = Result<String, NetcontrolError>> + Send {
        N::update(self, mac, new_mac, new_name)
    }

    fn deregister(&self, mac: &str) -> impl Future<Output = Result<(), NetcontrolError>> + Send {
        N::deregister(self, mac)
    }
}
