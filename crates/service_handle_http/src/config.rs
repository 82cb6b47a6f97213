use std::net::IpAddr;

/// Where and how to reach the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServiceConfig {
    pub ip: IpAddr,
    pub port: u16,
    /// `false` selects plain HTTP.
    pub tls: bool,
}

impl HttpServiceConfig {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self {
            ip,
            port,
            tls: true,
        }
    }

    pub fn insecure(mut self) -> Self {
        self.tls = false;
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }

    /// `scheme://host:port` with IPv6 hosts bracketed.
    pub fn base_url(&self) -> String {
        match self.ip {
            IpAddr::V4(ip) => format!("{}://{ip}:{}", self.scheme(), self.port),
            IpAddr::V6(ip) => format!("{}://[{ip}]:{}", self.scheme(), self.port),
        }
    }
}
