use std::fmt;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_INFLUX_URL: &str = "http://localhost:8086/hargo";

/// Connection parameters derived from an InfluxDB URL such as
/// `http://host:8086/database`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxConfig {
    /// `scheme://host:port`, without a trailing slash.
    pub addr: String,
    pub database: String,
    pub credentials: Option<Credentials>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl InfluxConfig {
    /// Parses `raw` and derives the server address and database name.
    ///
    /// Credentials are used only when both username and password are
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is invalid, has no host, or names no
    /// database.
    pub fn from_url(
        raw: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidInfluxUrl {
            url: raw.to_owned(),
            source: err,
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| ConfigError::InfluxUrlMissingHost {
                url: raw.to_owned(),
            })?;
        let addr = match url.port_or_known_default() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };
        let database = url.path().replace('/', "");
        if database.is_empty() {
            return Err(ConfigError::InfluxUrlMissingDatabase {
                url: raw.to_owned(),
            });
        }

        let credentials = match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials {
                    username: username.to_owned(),
                    password: password.to_owned(),
                })
            }
            _ => None,
        };

        Ok(Self {
            addr,
            database,
            credentials,
        })
    }

    pub(super) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.addr, path)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Display for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.database)
    }
}
