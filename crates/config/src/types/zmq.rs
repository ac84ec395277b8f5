//! ZeroMQ endpoint address value

use std::fmt;
use std::str::FromStr;

use strata_convert::{ConvertError, ConvertResult, Convertible};

/// Transport protocol of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZmqTransport {
    /// In-process
    Inproc,
    /// Inter-process
    Ipc,
    /// TCP
    Tcp,
    /// Reliable multicast
    Pgm,
    /// Encapsulated reliable multicast
    Epgm,
    /// Virtual machine sockets
    Vmci,
}

impl ZmqTransport {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "inproc" => Some(Self::Inproc),
            "ipc" => Some(Self::Ipc),
            "tcp" => Some(Self::Tcp),
            "pgm" => Some(Self::Pgm),
            "epgm" => Some(Self::Epgm),
            "vmci" => Some(Self::Vmci),
            _ => None,
        }
    }
}

/// Reach of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZmqDomain {
    /// Within one process
    Local,
    /// Within one node
    Node,
    /// Network wide
    Network,
}

/// Validated `protocol://address` endpoint, stored lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZmqAddress {
    endpoint: String,
    protocol: ZmqTransport,
}

impl ZmqAddress {
    /// Validate an endpoint address
    pub fn new(endpoint: &str) -> ConvertResult<Self> {
        let Some((protocol, _)) = endpoint.split_once("://") else {
            return Err(invalid("Protocol specification required"));
        };
        let transport = ZmqTransport::from_name(protocol)
            .ok_or_else(|| invalid(format!("Unknown protocol '{protocol}'")))?;
        Ok(Self {
            endpoint: endpoint.to_lowercase(),
            protocol: transport,
        })
    }

    /// Transport protocol
    pub fn protocol(&self) -> ZmqTransport {
        self.protocol
    }

    /// Part after `://`
    pub fn address(&self) -> &str {
        self.endpoint
            .split_once("://")
            .map_or("", |(_, address)| address)
    }

    /// Reach of the endpoint
    pub fn domain(&self) -> ZmqDomain {
        match self.protocol {
            ZmqTransport::Inproc => ZmqDomain::Local,
            ZmqTransport::Ipc => ZmqDomain::Node,
            ZmqTransport::Tcp
                if self.address().starts_with("127.0.0.1")
                    || self.address().starts_with("localhost") =>
            {
                ZmqDomain::Node
            }
            _ => ZmqDomain::Network,
        }
    }

    /// Full endpoint text
    pub fn as_str(&self) -> &str {
        &self.endpoint
    }
}

fn invalid(message: impl Into<String>) -> ConvertError {
    ConvertError::invalid_value(ZmqAddress::TYPE_NAME, message)
}

impl fmt::Display for ZmqAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint)
    }
}

impl FromStr for ZmqAddress {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Convertible for ZmqAddress {
    const TYPE_NAME: &'static str = "ZMQAddress";

    fn to_config_string(&self) -> String {
        self.endpoint.clone()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("inproc://my-endpoint", ZmqTransport::Inproc, ZmqDomain::Local)]
    #[case("ipc://path/to/socket", ZmqTransport::Ipc, ZmqDomain::Node)]
    #[case("tcp://127.0.0.1:5555", ZmqTransport::Tcp, ZmqDomain::Node)]
    #[case("TCP://LocalHost:5555", ZmqTransport::Tcp, ZmqDomain::Node)]
    #[case("tcp://192.168.0.1:5555", ZmqTransport::Tcp, ZmqDomain::Network)]
    #[case("epgm://eth0;239.192.1.1:5555", ZmqTransport::Epgm, ZmqDomain::Network)]
    fn protocol_and_domain(
        #[case] endpoint: &str,
        #[case] protocol: ZmqTransport,
        #[case] domain: ZmqDomain,
    ) {
        let address = ZmqAddress::new(endpoint).unwrap();
        assert_eq!(address.protocol(), protocol);
        assert_eq!(address.domain(), domain);
    }

    #[test]
    fn value_is_lowercased() {
        let address = ZmqAddress::new("TCP://Host:5555").unwrap();
        assert_eq!(address.as_str(), "tcp://host:5555");
        assert_eq!(address.address(), "host:5555");
    }

    #[test]
    fn rejects_bad_endpoints() {
        assert_eq!(
            ZmqAddress::new("myfile.txt").unwrap_err().to_string(),
            "Protocol specification required"
        );
        assert_eq!(
            ZmqAddress::new("udp://host").unwrap_err().to_string(),
            "Unknown protocol 'udp'"
        );
    }
}
