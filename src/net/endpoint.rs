//! Upstream relay endpoint parsed from a proxy URL.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::EndpointError;

const DEFAULT_SOCKS_PORT: u16 = 1080;

/// Proxy protocol named by the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyScheme {
    Socks5,
    /// SOCKS5 with hostname resolution on the relay.
    Socks5h,
    Http,
    Https,
}

impl ProxyScheme {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "socks5" => Some(Self::Socks5),
            "socks5h" => Some(Self::Socks5h),
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Socks5 => "socks5",
            Self::Socks5h => "socks5h",
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Self::Socks5 | Self::Socks5h => DEFAULT_SOCKS_PORT,
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

/// Credentials embedded in the proxy URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Address and credentials of an upstream SOCKS5/HTTP relay.
///
/// Opaque to the circuit breaker; handed to the underlying dialer as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    scheme: ProxyScheme,
    host: String,
    port: u16,
    credentials: Option<Credentials>,
}

impl ProxyEndpoint {
    /// Parse proxy URL text.
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        Self::from_url(&Url::parse(input)?)
    }

    /// Take scheme, host, port and credentials from an already parsed URL.
    /// The query string is ignored here.
    pub fn from_url(url: &Url) -> Result<Self, EndpointError> {
        let scheme = ProxyScheme::from_scheme(url.scheme())
            .ok_or_else(|| EndpointError::UnsupportedScheme(url.scheme().to_string()))?;

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(EndpointError::MissingHost),
        };

        let credentials = if url.username().is_empty() {
            None
        } else {
            Some(Credentials {
                username: decode(url.username()),
                password: url.password().map(decode),
            })
        };

        Ok(Self {
            scheme,
            port: url.port().unwrap_or_else(|| scheme.default_port()),
            host,
            credentials,
        })
    }

    pub fn scheme(&self) -> ProxyScheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// `host:port` of the relay, IPv6 hosts bracketed.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Renders `scheme://host:port`; credentials are never printed.
impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
