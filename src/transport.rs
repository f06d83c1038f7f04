//! Transport to the remote citation parsing service.
//!
//! A [`Transport`] submits raw citation text and hands back the service's XML
//! response as a readable stream. The interpreter only ever sees that stream.

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use url::form_urlencoded;

use crate::Result;

/// Default FreeCite endpoint accepting `citation=<text>` form posts.
pub const DEFAULT_ENDPOINT: &str = "http://freecite.library.brown.edu/citations/create";

/// Something that can turn citation text into a service response stream.
pub trait Transport {
    /// Submits `citation` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns `CitationError::ServiceUnreachable` when the service cannot be
    /// reached or refuses the request.
    fn fetch(&self, citation: &str) -> Result<Box<dyn BufRead>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, citation: &str) -> Result<Box<dyn BufRead>> {
        (**self).fetch(citation)
    }
}

/// Builds the `application/x-www-form-urlencoded` request body for `citation`.
///
/// # Examples
///
/// ```
/// use freecite::transport::encode_request_body;
/// assert_eq!(encode_request_body("Smith & Doe, 2001"), "citation=Smith+%26+Doe%2C+2001");
/// ```
pub fn encode_request_body(citation: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("citation", citation)
        .finish()
}

/// Settings for reaching the citation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// URL the citation form is posted to.
    pub endpoint: String,
    /// Overall request timeout in seconds. Zero disables the timeout.
    pub timeout_secs: u64,
    /// Optional `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use reqwest::blocking::Client;
    use reqwest::header::{ACCEPT, CONTENT_TYPE};
    use std::io::{BufRead, BufReader};
    use std::time::Duration;
    use tracing::debug;

    use super::{ServiceConfig, Transport, encode_request_body};
    use crate::{CitationError, Result};

    /// Blocking HTTP transport posting citations to a FreeCite endpoint.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
        config: ServiceConfig,
    }

    impl HttpTransport {
        /// Creates a transport for the default public endpoint.
        ///
        /// # Errors
        ///
        /// Returns `CitationError::Other` if the HTTP client cannot be built.
        pub fn new() -> Result<Self> {
            Self::with_config(ServiceConfig::default())
        }

        /// Creates a transport from explicit settings.
        ///
        /// # Errors
        ///
        /// Returns `CitationError::Other` if the HTTP client cannot be built.
        pub fn with_config(config: ServiceConfig) -> Result<Self> {
            let mut builder = Client::builder();
            // reqwest's blocking client defaults to 30s; zero means no limit
            builder = if config.timeout_secs == 0 {
                builder.timeout(None::<Duration>)
            } else {
                builder.timeout(Duration::from_secs(config.timeout_secs))
            };
            if let Some(agent) = &config.user_agent {
                builder = builder.user_agent(agent.as_str());
            }
            let client = builder
                .build()
                .map_err(|e| CitationError::Other(format!("Could not build HTTP client: {}", e)))?;
            Ok(Self { client, config })
        }

        pub fn config(&self) -> &ServiceConfig {
            &self.config
        }
    }

    impl Transport for HttpTransport {
        fn fetch(&self, citation: &str) -> Result<Box<dyn BufRead>> {
            debug!(endpoint = %self.config.endpoint, "posting citation to FreeCite");
            let response = self
                .client
                .post(self.config.endpoint.as_str())
                .header(ACCEPT, "text/xml")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_request_body(citation))
                .send()?
                .error_for_status()?;
            debug!(status = %response.status(), "FreeCite responded");
            Ok(Box::new(BufReader::new(response)))
        }
    }
}
