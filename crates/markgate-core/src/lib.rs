//! Access-control core of the markgate captive-portal gateway.
//!
//! This crate owns the business logic and domain model sitting between
//! the netcontrol daemon client (`markgate-netcontrol`) and outer
//! surfaces (HTTP layer, CLI):
//!
//! - **[`DeviceRegistry`]**: the aggregate service. Validates device
//!   identifiers, mediates every create/update/delete against the
//!   firewall daemon (daemon-first, storage-second), assigns routing
//!   marks to user devices, and persists uniquely-keyed records.
//!
//! - **[`DeviceStore`]**: lock-free concurrent storage built on
//!   `DashMap`, keyed by MAC address. The map's entry API is the final
//!   arbiter for MAC uniqueness under concurrent registration.
//!
//! - **[`MarkAllocator`]**: weighted random routing-mark selection over
//!   an atomically-swappable [`MarkTable`] snapshot (`arc-swap`), so
//!   allocations never observe a half-replaced configuration.
//!
//! - **[`Netcontrol`]**: capability trait over the daemon's RPC
//!   surface, implemented for the real socket client and by fakes in
//!   tests.
//!
//! - **Domain model** ([`model`]): [`Device`] records with an optional
//!   [`UserBinding`] extension, validated [`MacAddress`] identity, and
//!   the pure [`validate_mac`]/[`validate_ipv4`] syntax checks.

pub mod error;
pub mod marks;
pub mod model;
pub mod names;
pub mod netcontrol;
pub mod registry;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use marks::{MarkAllocator, MarkEntry, MarkTable};
pub use model::{Device, DeviceId, DeviceUpdate, MacAddress, UserBinding, validate_ipv4, validate_mac};
pub use names::{NameGenerator, RandomNameGenerator};
pub use netcontrol::Netcontrol;
pub use registry::{DeviceRegistry, MarkStatus};
pub use store::DeviceStore;
