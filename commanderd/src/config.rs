//! Daemon configuration: optional TOML file merged over built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use commander_commands::render::RenderTarget;
use serde::Deserialize;

pub const DEFAULT_SOCKET: &str = "/tmp/commanderd.sock";
const DEFAULT_TEMPLATE_DIR: &str = "/etc/commanderd/templates";
const DEFAULT_NOTIFY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub socket: PathBuf,
    pub notify_timeout_ms: u32,
    pub template: RenderTarget,
    pub dnsmasq: ServiceTemplate,
    pub hostapd: ServiceTemplate,
}

/// A template-driven command that also bounces a service unit.
#[derive(Debug, Clone)]
pub struct ServiceTemplate {
    pub target: RenderTarget,
    pub unit: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    socket: Option<PathBuf>,
    notify: Option<RawNotify>,
    template: Option<RawTarget>,
    dnsmasq: Option<RawService>,
    hostapd: Option<RawService>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNotify {
    timeout_ms: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTarget {
    template: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawService {
    template: Option<PathBuf>,
    output: Option<PathBuf>,
    unit: Option<String>,
}

impl Config {
    /// Built-in defaults, used when no config file is present.
    pub fn default_values() -> Self {
        let templates = Path::new(DEFAULT_TEMPLATE_DIR);
        Self {
            socket: PathBuf::from(DEFAULT_SOCKET),
            notify_timeout_ms: DEFAULT_NOTIFY_TIMEOUT_MS,
            template: RenderTarget {
                template: templates.join("example.conf.tmpl"),
                output: PathBuf::from("/tmp/commanderd_example.conf"),
            },
            dnsmasq: ServiceTemplate {
                target: RenderTarget {
                    template: templates.join("dnsmasq.conf.tmpl"),
                    output: PathBuf::from("/tmp/dnsmasq.conf"),
                },
                unit: "dnsmasq.service".to_string(),
            },
            hostapd: ServiceTemplate {
                target: RenderTarget {
                    template: templates.join("hostapd.conf.tmpl"),
                    output: PathBuf::from("/tmp/hostapd.conf"),
                },
                unit: "hostapd.service".to_string(),
            },
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default_values();
        let Some(path) = path else {
            return Ok(config);
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        if let Some(socket) = raw.socket {
            config.socket = socket;
        }
        if let Some(timeout) = raw.notify.and_then(|notify| notify.timeout_ms) {
            config.notify_timeout_ms = timeout;
        }
        if let Some(template) = raw.template {
            apply_target(&mut config.template, template.template, template.output);
        }
        if let Some(service) = raw.dnsmasq {
            apply_service(&mut config.dnsmasq, service);
        }
        if let Some(service) = raw.hostapd {
            apply_service(&mut config.hostapd, service);
        }

        Ok(config)
    }
}

fn apply_target(target: &mut RenderTarget, template: Option<PathBuf>, output: Option<PathBuf>) {
    if let Some(template) = template {
        target.template = template;
    }
    if let Some(output) = output {
        target.output = output;
    }
}

fn apply_service(service: &mut ServiceTemplate, raw: RawService) {
    apply_target(&mut service.target, raw.template, raw.output);
    if let Some(unit) = raw.unit {
        service.unit = unit;
    }
}
