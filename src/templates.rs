//! Command line templates for every external tool invocation.
//!
//! Templates use `{{placeholder}}` syntax and are filled from a
//! [`CommandParts`]. All of them can be replaced from the `[templates]`
//! table of the configuration file, for example to lower `--min-rate` or to
//! point at a differently named binary.
//!
//! | placeholder     | value                                   |
//! |-----------------|-----------------------------------------|
//! | `{{target}}`    | target specification, passed unmodified |
//! | `{{ports}}`     | comma separated open ports              |
//! | `{{output}}`    | report base path for `-oA`              |
//! | `{{interface}}` | network interface name                  |
//! | `{{file}}`      | a file path                             |
//! | `{{url}}`       | a download URL                          |
//! | `{{bin}}`       | a binary name                           |
//! | `{{dir}}`       | a directory path                        |
use crate::input::Protocol;
use anyhow::Result;
use log::debug;
use serde_derive::{Deserialize, Serialize};
use text_placeholder::Template;

/// Values substituted into a command template. Unused fields stay empty.
#[derive(Serialize, Debug, Default, Clone)]
pub struct CommandParts {
    pub target: String,
    pub ports: String,
    pub output: String,
    pub interface: String,
    pub file: String,
    pub url: String,
    pub bin: String,
    pub dir: String,
}

impl CommandParts {
    pub fn target(target: &str) -> Self {
        Self {
            target: target.to_owned(),
            ..Self::default()
        }
    }
}

/// Fills `format` with `parts`.
pub fn render(format: &str, parts: &CommandParts) -> Result<String> {
    let template = Template::new(format);
    let command = template.fill_with_struct(parts)?;
    debug!("Rendered command template {format:?} into {command:?}");
    Ok(command)
}

/// The command lines used by both orchestrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub host_discovery: String,
    pub udp_discovery: String,
    pub tcp_discovery: String,
    pub udp_deep: String,
    pub tcp_deep: String,
    pub fast_tcp: String,
    pub fast_udp: String,
    pub interface_address: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            host_discovery: "nmap -sn {{target}}".to_owned(),
            udp_discovery: "nmap --min-rate=10000 -p- -sU -T4 -Pn {{target}}".to_owned(),
            tcp_discovery: "nmap --min-rate=10000 -p- -sT -T4 -Pn {{target}}".to_owned(),
            udp_deep: concat!(
                "nmap --min-rate=10000 -p {{ports}} -sC -sV -sU -T4 -Pn {{target}} ",
                "-oA {{output}}"
            )
            .to_owned(),
            tcp_deep: concat!(
                "nmap --min-rate=10000 -p {{ports}} -sC -sV -sT -T4 -Pn {{target}} ",
                "-oA {{output}}"
            )
            .to_owned(),
            fast_tcp: "rustscan -a {{target}} -g".to_owned(),
            fast_udp: "rustscan -a {{target}} --udp -g".to_owned(),
            interface_address: "ip -4 addr show {{interface}}".to_owned(),
        }
    }
}

impl Templates {
    /// Replaces every template that is set in `config`.
    pub fn merge(&mut self, config: &TemplateConfig) {
        macro_rules! merge_templates {
            ($($field: ident),+) => {
                $(
                    if let Some(e) = &config.$field {
                        self.$field = e.clone();
                    }
                )+
            }
        }

        merge_templates!(
            host_discovery,
            udp_discovery,
            tcp_discovery,
            udp_deep,
            tcp_deep,
            fast_tcp,
            fast_udp,
            interface_address
        );
    }

    /// Full-range open port discovery through nmap.
    pub fn discovery(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Tcp => &self.tcp_discovery,
            Protocol::Udp => &self.udp_discovery,
        }
    }

    /// Service and version scan restricted to known open ports.
    pub fn deep(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Tcp => &self.tcp_deep,
            Protocol::Udp => &self.udp_deep,
        }
    }

    /// Open port discovery through the fast scanner.
    pub fn fast(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Tcp => &self.fast_tcp,
            Protocol::Udp => &self.fast_udp,
        }
    }
}

/// The `[templates]` table of the configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateConfig {
    host_discovery: Option<String>,
    udp_discovery: Option<String>,
    tcp_discovery: Option<String>,
    udp_deep: Option<String>,
    tcp_deep: Option<String>,
    fast_tcp: Option<String>,
    fast_udp: Option<String>,
    interface_address: Option<String>,
}
