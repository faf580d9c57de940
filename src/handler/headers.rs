//! Response header augmentation
//!
//! The file-serving layer produces a response first; this step then sets the
//! CORS and cache headers on it, whatever its status.

use hyper::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL,
};
use hyper::Response;

use crate::config::HeadersConfig;
use crate::error::ServerError;

/// Ordered set of headers stamped onto every outgoing response
#[derive(Debug, Clone)]
pub struct ResponseHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl ResponseHeaders {
    pub fn from_config(config: &HeadersConfig) -> Result<Self, ServerError> {
        Self { headers: Vec::new() }
            .with_header(ACCESS_CONTROL_ALLOW_ORIGIN, &config.allow_origin)?
            .with_header(ACCESS_CONTROL_ALLOW_METHODS, &config.allow_methods)?
            .with_header(ACCESS_CONTROL_ALLOW_HEADERS, &config.allow_headers)?
            .with_header(CACHE_CONTROL, &config.cache_control)
    }

    /// Append another header; empty values are skipped
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, ServerError> {
        if value.is_empty() {
            return Ok(self);
        }
        let parsed = HeaderValue::from_str(value).map_err(|_| ServerError::InvalidHeader {
            name: name.as_str().to_string(),
            value: value.to_string(),
        })?;
        self.headers.push((name, parsed));
        Ok(self)
    }

    /// Set every header on the response, replacing values already present
    pub fn apply<B>(&self, response: &mut Response<B>) {
        let target = response.headers_mut();
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }
}
