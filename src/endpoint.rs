use std::fmt;
use std::io;
use std::net::SocketAddr;

/// A (host, port) pair naming either a bind target or a connect
/// destination. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolves to the first usable socket address.
    pub async fn resolve(&self) -> io::Result<SocketAddr> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port)).await?;
        addrs.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {self}"),
            )
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_loopback() {
        let addr = Endpoint::new("127.0.0.1", 12346).resolve().await.unwrap();
        assert_eq!(addr, "127.0.0.1:12346".parse().unwrap());
    }

    #[tokio::test]
    async fn unresolvable_host_is_an_error() {
        let res = Endpoint::new("host.invalid.", 12346).resolve().await;
        assert!(res.is_err());
    }

    #[test]
    fn displays_as_host_port() {
        assert_eq!(Endpoint::new("0.0.0.0", 12346).to_string(), "0.0.0.0:12346");
    }
}
