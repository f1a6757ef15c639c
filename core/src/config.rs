//! Endpoint table and environment configuration.

use url::Url;

use crate::error::{ApiError, Result};

pub const DEFAULT_API_ROOT: &str = "https://api.pushbullet.com/v2/";
pub const TOKEN_ENV: &str = "PUSHBULLET_TOKEN";
pub const API_ROOT_ENV: &str = "PUSHBULLET_API_ROOT";

/// Resource endpoints under one versioned API root.
///
/// Built once when the client is constructed and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub contacts: Url,
    pub pushes: Url,
    pub devices: Url,
    pub me: Url,
    pub subscriptions: Url,
    pub channels: Url,
    pub upload_request: Url,
}

impl Endpoints {
    /// Derive every endpoint from `api_root`. A missing trailing slash is
    /// added so `https://host/v2` and `https://host/v2/` behave the same.
    pub fn new(api_root: &str) -> Result<Self> {
        let mut root = api_root.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        let root = Url::parse(&root)
            .map_err(|e| ApiError::Configuration(format!("invalid API root `{api_root}`: {e}")))?;
        if root.cannot_be_a_base() {
            return Err(ApiError::Configuration(format!(
                "API root `{api_root}` cannot be a base URL"
            )));
        }

        let join = |path: &str| {
            root.join(path)
                .map_err(|e| ApiError::Configuration(format!("cannot join `{path}`: {e}")))
        };

        Ok(Self {
            contacts: join("contacts")?,
            pushes: join("pushes")?,
            devices: join("devices")?,
            me: join("users/me")?,
            subscriptions: join("subscriptions")?,
            channels: join("channel-info")?,
            upload_request: join("upload-request")?,
        })
    }

    /// Honour `PUSHBULLET_API_ROOT` when set, else the public API.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_ROOT_ENV) {
            Ok(root) if !root.trim().is_empty() => Self::new(&root),
            _ => Ok(Self::default()),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_ROOT).expect("DEFAULT_API_ROOT is a valid URL")
    }
}

/// `{base}/{segment}` with the segment percent-encoded.
pub(crate) fn member_url(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

/// `{base}?{key}={value}` with the value form-encoded.
pub(crate) fn query_url(base: &Url, key: &str, value: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair(key, value);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_point_at_public_api() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.me.as_str(), "https://api.pushbullet.com/v2/users/me");
        assert_eq!(
            endpoints.channels.as_str(),
            "https://api.pushbullet.com/v2/channel-info"
        );
        assert_eq!(
            endpoints.upload_request.as_str(),
            "https://api.pushbullet.com/v2/upload-request"
        );
    }

    #[test]
    fn missing_trailing_slash_is_added() {
        let endpoints = Endpoints::new("http://localhost:3000/v2").unwrap();
        assert_eq!(endpoints.devices.as_str(), "http://localhost:3000/v2/devices");
    }

    #[test]
    fn invalid_root_is_a_configuration_error() {
        let err = Endpoints::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn member_url_encodes_segment() {
        let endpoints = Endpoints::default();
        let url = member_url(&endpoints.contacts, "a b/c");
        assert_eq!(url.as_str(), "https://api.pushbullet.com/v2/contacts/a%20b%2Fc");
    }

    #[test]
    fn query_url_appends_pair() {
        let endpoints = Endpoints::default();
        let url = query_url(&endpoints.channels, "tag", "jblow");
        assert_eq!(
            url.as_str(),
            "https://api.pushbullet.com/v2/channel-info?tag=jblow"
        );
    }
}
