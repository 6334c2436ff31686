//! Environment-driven configuration, matching the Python original's
//! `options.py` names and defaults (§6, §1.1 of the expanded spec).

use std::net::IpAddr;
use std::path::PathBuf;

const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
const DEFAULT_LISTEN_PORT: u16 = 56145;

/// Agent configuration assembled once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: IpAddr,
    pub listen_port: u16,
    pub config_folder: PathBuf,
    pub packages_folder: PathBuf,
    /// The data-source provider type this agent process hosts. One running
    /// agent serves exactly one provider, mirroring the original's
    /// per-process extension hosting model.
    pub provider: String,
}

impl Config {
    /// Reads `NEXUSAGENT_*` environment variables, falling back to the
    /// platform defaults the original agent uses.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    /// Testable variant: takes a lookup function instead of reading the
    /// process environment directly.
    pub fn from_reader(read: impl Fn(&str) -> Option<String>) -> Self {
        let listen_address = read("NEXUSAGENT_SYSTEM__JSONRPCLISTENADDRESS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.parse().unwrap());

        let listen_port = read("NEXUSAGENT_SYSTEM__JSONRPCLISTENPORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LISTEN_PORT);

        let config_folder = read("NEXUSAGENT_PATHS__CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(default_config_folder);

        let packages_folder = read("NEXUSAGENT_PATHS__PACKAGES")
            .map(PathBuf::from)
            .unwrap_or_else(|| config_folder.join("packages"));

        let provider = read("NEXUSAGENT_PROVIDER")
            .unwrap_or_else(|| crate::datasource::registry::SAMPLE_PROVIDER.to_owned());

        Self { listen_address, listen_port, config_folder, packages_folder, provider }
    }
}

fn default_config_folder() -> PathBuf {
    let root = if cfg!(windows) {
        std::env::var("LOCALAPPDATA").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
    } else {
        dirs_home().join(".local").join("share")
    };
    root.join("nexus-agent").join("config")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reader(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| vars.get(key).map(|v| (*v).to_owned())
    }

    #[test]
    fn defaults_to_the_documented_listen_address_and_port() {
        let cfg = Config::from_reader(reader(HashMap::new()));
        assert_eq!(cfg.listen_address, DEFAULT_LISTEN_ADDRESS.parse::<IpAddr>().unwrap());
        assert_eq!(cfg.listen_port, DEFAULT_LISTEN_PORT);
    }

    #[test]
    fn reads_listen_address_and_port_from_env() {
        let mut vars = HashMap::new();
        vars.insert("NEXUSAGENT_SYSTEM__JSONRPCLISTENADDRESS", "127.0.0.1");
        vars.insert("NEXUSAGENT_SYSTEM__JSONRPCLISTENPORT", "9000");
        let cfg = Config::from_reader(reader(vars));
        assert_eq!(cfg.listen_address, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(cfg.listen_port, 9000);
    }

    #[test]
    fn packages_folder_defaults_under_config_folder() {
        let mut vars = HashMap::new();
        vars.insert("NEXUSAGENT_PATHS__CONFIG", "/tmp/nexus-cfg");
        let cfg = Config::from_reader(reader(vars));
        assert_eq!(cfg.packages_folder, PathBuf::from("/tmp/nexus-cfg/packages"));
    }

    #[test]
    fn provider_defaults_to_the_built_in_sample_source() {
        let cfg = Config::from_reader(reader(HashMap::new()));
        assert_eq!(cfg.provider, crate::datasource::registry::SAMPLE_PROVIDER);
    }

    #[test]
    fn provider_reads_from_env() {
        let mut vars = HashMap::new();
        vars.insert("NEXUSAGENT_PROVIDER", "Acme.Vendor.Custom");
        let cfg = Config::from_reader(reader(vars));
        assert_eq!(cfg.provider, "Acme.Vendor.Custom");
    }
}
