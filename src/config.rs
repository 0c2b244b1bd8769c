//! Process configuration.
//!
//! Flags win over environment variables, which win over the defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "roster", version, about = "In-memory users and products JSON API")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_everything() {
        let config = Config::try_parse_from(["roster", "--host", "127.0.0.1", "--port", "8080"]).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn rejects_a_port_out_of_range() {
        assert!(Config::try_parse_from(["roster", "--port", "70000"]).is_err());
    }
}
