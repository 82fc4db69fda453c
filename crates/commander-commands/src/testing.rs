//! Test doubles shared by the command test modules.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::bus::{SystemBus, UnitStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    Notify {
        title: String,
        message: String,
        timeout_ms: u32,
    },
    ListUnits,
    ReloadOrRestart {
        unit: String,
    },
}

/// Records every bus interaction; optionally fails all calls.
pub struct RecordingBus {
    pub calls: Mutex<Vec<BusCall>>,
    pub fail: bool,
    pub units: Vec<UnitStatus>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
            units: Vec::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_units(units: Vec<UnitStatus>) -> Self {
        Self {
            units,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<BusCall> {
        self.calls.lock().expect("bus call log").clone()
    }

    fn record(&self, call: BusCall) -> Result<()> {
        self.calls.lock().expect("bus call log").push(call);
        if self.fail {
            bail!("bus unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl SystemBus for RecordingBus {
    async fn notify(&self, title: &str, message: &str, timeout_ms: u32) -> Result<()> {
        self.record(BusCall::Notify {
            title: title.to_string(),
            message: message.to_string(),
            timeout_ms,
        })
    }

    async fn list_units(&self) -> Result<Vec<UnitStatus>> {
        self.record(BusCall::ListUnits)?;
        Ok(self.units.clone())
    }

    async fn reload_or_restart(&self, unit: &str) -> Result<()> {
        self.record(BusCall::ReloadOrRestart {
            unit: unit.to_string(),
        })
    }
}

pub fn unit(name: &str) -> UnitStatus {
    UnitStatus {
        unit: name.to_string(),
        load: "loaded".to_string(),
        active: "active".to_string(),
        sub: "running".to_string(),
        description: format!("{name} unit"),
    }
}
