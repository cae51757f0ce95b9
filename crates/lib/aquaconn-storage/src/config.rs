use std::env;

use typed_builder::TypedBuilder;

use crate::error::{Result, StorageError};

pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENDPOINT: &str = "AWS_S3_ENDPOINT";
pub const REGION: &str = "AWS_DEFAULT_REGION";
pub const BUCKET_NAME: &str = "AWS_BUCKET_NAME";

const DEFAULT_REGION: &str = "us-east-1";

/// Connection details for an S3-compatible store. Credentials only ever come from the
/// environment.
#[derive(Clone, TypedBuilder)]
pub struct S3Config {
    /// Base url such as `https://s3.example.org`.
    #[builder(setter(into))]
    pub endpoint: String,
    #[builder(default = DEFAULT_REGION.to_string(), setter(into))]
    pub region: String,
    #[builder(setter(into))]
    pub access_key_id: String,
    #[builder(setter(into))]
    pub secret_access_key: String,
    #[builder(default, setter(strip_option, into))]
    pub session_token: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub default_bucket: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("default_bucket", &self.default_bucket)
            .finish_non_exhaustive()
    }
}

impl S3Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(StorageError::MissingEnv(name));

        Ok(Self {
            endpoint: normalize_endpoint(&required(ENDPOINT)?),
            region: get(REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id: required(ACCESS_KEY_ID)?,
            secret_access_key: required(SECRET_ACCESS_KEY)?,
            session_token: get(SESSION_TOKEN),
            default_bucket: get(BUCKET_NAME),
        })
    }

    /// The host (and port) the endpoint points at, as sent in the `Host` header.
    pub fn host(&self) -> &str {
        let without_scheme = self
            .endpoint
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.endpoint);
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }

    /// Scheme and host of the endpoint. Request paths are appended to this, so they are
    /// exactly the paths that get signed.
    pub fn base_url(&self) -> String {
        let scheme = self
            .endpoint
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or("https");
        format!("{}://{}", scheme, self.host())
    }

    pub fn bucket<'a>(&'a self, bucket: Option<&'a str>) -> Result<&'a str> {
        bucket
            .or(self.default_bucket.as_deref())
            .ok_or(StorageError::NoBucket)
    }
}

/// Adds `https://` when no scheme is given and drops any path after the host.
fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    let (scheme, rest) = endpoint.split_once("://").unwrap_or(("https", endpoint));
    let host = rest.split('/').next().unwrap_or(rest);
    format!("{}://{}", scheme, host)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_from_variables() {
        let config = S3Config::from_lookup(lookup(&[
            (ENDPOINT, "s3.example.org/"),
            (ACCESS_KEY_ID, "key"),
            (SECRET_ACCESS_KEY, "secret"),
            (SESSION_TOKEN, ""),
            (BUCKET_NAME, "forecasts"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "https://s3.example.org");
        assert_eq!(config.host(), "s3.example.org");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.session_token, None);
        assert_eq!(config.bucket(None).unwrap(), "forecasts");
        assert_eq!(config.bucket(Some("other")).unwrap(), "other");
    }

    #[test]
    fn test_endpoint_path_is_dropped() {
        let config = S3Config::from_lookup(lookup(&[
            (ENDPOINT, "https://s3.example.org/s3/"),
            (ACCESS_KEY_ID, "key"),
            (SECRET_ACCESS_KEY, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "https://s3.example.org");
        assert_eq!(config.base_url(), "https://s3.example.org");

        let config = S3Config::builder()
            .endpoint("http://localhost:9000/minio")
            .access_key_id("key")
            .secret_access_key("secret")
            .build();
        assert_eq!(config.host(), "localhost:9000");
        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(normalize_endpoint("localhost:9000/"), "https://localhost:9000");
    }

    #[test]
    fn test_missing_credentials() {
        let result = S3Config::from_lookup(lookup(&[(ENDPOINT, "http://localhost:9000")]));
        assert!(matches!(result, Err(StorageError::MissingEnv(ACCESS_KEY_ID))));

        let config = S3Config::builder()
            .endpoint("http://localhost:9000")
            .access_key_id("key")
            .secret_access_key("secret")
            .build();
        assert_eq!(config.host(), "localhost:9000");
        assert!(matches!(config.bucket(None), Err(StorageError::NoBucket)));
    }
}
