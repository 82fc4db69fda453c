//! Built-in commands for the commander dispatch daemon.
//!
//! Each module implements one command against the `commander_core` contract.
//! Host integration (desktop notifications, service units) goes through the
//! [`bus::SystemBus`] trait so commands stay testable without a real host.

pub mod bus;
pub mod render;

mod echo;
mod notify;
mod services;
mod template;
mod update_dnsmasq;
mod update_hostapd;

pub use echo::EchoCommand;
pub use notify::NotifyCommand;
pub use services::ServicesCommand;
pub use template::TemplateCommand;
pub use update_dnsmasq::UpdateDnsmasqCommand;
pub use update_hostapd::UpdateHostapdCommand;

#[cfg(test)]
pub(crate) mod testing;
