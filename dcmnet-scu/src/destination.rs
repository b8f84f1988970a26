//! Remote SCP connection parameters, spec §4.G.
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Destination {
    pub host: String,
    pub port: u16,
    pub calling_ae_title: String,
    pub called_ae_title: String,
    pub timeout: Duration,
}

impl Destination {
    pub fn new(host: impl Into<String>, port: u16, calling_ae_title: impl Into<String>, called_ae_title: impl Into<String>) -> Self {
        Destination {
            host: host.into(),
            port,
            calling_ae_title: calling_ae_title.into(),
            called_ae_title: called_ae_title.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
