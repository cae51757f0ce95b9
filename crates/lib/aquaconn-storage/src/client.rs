use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::blocking::{Client, Response};
use reqwest::Method;

use crate::config::S3Config;
use crate::error::{Result, StorageError};
use crate::signing::{amz_date, sha256_hex, RequestParts, Signer, AMZ_DATE, CONTENT_SHA256, SECURITY_TOKEN};
use crate::url::{uri_encode, ObjectUrl};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Minimal S3 client using path-style addressing (`<endpoint>/<bucket>/<key>`), which every
/// S3-compatible store understands.
#[derive(Debug, Clone)]
pub struct S3Client {
    config: S3Config,
    http: Client,
}

impl S3Client {
    pub fn new(config: S3Config) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: S3Config, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Object url in the default bucket, or in `bucket` when given.
    pub fn object_url(&self, bucket: Option<&str>, key: &str) -> Result<ObjectUrl> {
        Ok(ObjectUrl::new(self.config.bucket(bucket)?, key))
    }

    pub fn put_object(&self, url: &ObjectUrl, body: Vec<u8>) -> Result<()> {
        let size = body.len();
        self.send(Method::PUT, &object_path(url), body)?;
        info!("Uploaded {} bytes to {}", size, url);
        Ok(())
    }

    pub fn put_file(&self, url: &ObjectUrl, file_path: &Path) -> Result<()> {
        let body = fs::read(file_path).map_err(|source| StorageError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        debug!("Uploading {} to {}", file_path.display(), url);
        self.put_object(url, body)
    }

    pub fn get_object(&self, url: &ObjectUrl) -> Result<Vec<u8>> {
        let response = self.send(Method::GET, &object_path(url), Vec::new())?;
        let body = response.bytes()?.to_vec();
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Names of the buckets visible with these credentials. Doubles as a reachability check.
    pub fn list_buckets(&self) -> Result<Vec<String>> {
        let response = self.send(Method::GET, "/", Vec::new())?;
        parse_bucket_names(&response.text()?)
    }

    fn send(&self, method: Method, path: &str, body: Vec<u8>) -> Result<Response> {
        let now = Utc::now();
        let payload_hash = sha256_hex(&body);

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), self.config.host().to_string());
        headers.insert(CONTENT_SHA256.to_string(), payload_hash.clone());
        headers.insert(AMZ_DATE.to_string(), amz_date(&now));
        if let Some(token) = &self.config.session_token {
            headers.insert(SECURITY_TOKEN.to_string(), token.clone());
        }
        let parts = RequestParts {
            method: method.as_str(),
            path,
            query: &[],
            headers: &headers,
            payload_hash: &payload_hash,
        };
        let authorization = Signer::new(&self.config).authorization(&parts, &now)?;

        let url = format!("{}{}", self.config.base_url(), path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("authorization", authorization);
        for (name, value) in headers.iter().filter(|(name, _)| name.as_str() != "host") {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(body).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response)
    }
}

fn object_path(url: &ObjectUrl) -> String {
    format!(
        "/{}/{}",
        uri_encode(&url.bucket, false),
        uri_encode(&url.key, true)
    )
}

/// Reads the `<Name>` elements of a `ListAllMyBucketsResult` document.
pub fn parse_bucket_names(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut names = Vec::new();
    let mut in_name = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"Name" => in_name = true,
            Event::End(e) if e.name().as_ref() == b"Name" => in_name = false,
            Event::Text(text) if in_name => {
                names.push(text.unescape()?.into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_is_encoded() {
        let url = ObjectUrl::new("forecasts", "runs/2024-05-01 12:00/connectivity.csv");
        assert_eq!(
            object_path(&url),
            "/forecasts/runs/2024-05-01%2012%3A00/connectivity.csv"
        );
    }

    #[test]
    fn test_parse_bucket_listing() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>abc</ID><DisplayName>owner</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>forecasts</Name><CreationDate>2024-01-01T00:00:00.000Z</CreationDate></Bucket>
    <Bucket><Name>fish&amp;lice</Name><CreationDate>2024-01-02T00:00:00.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;
        assert_eq!(
            parse_bucket_names(xml).unwrap(),
            vec!["forecasts".to_string(), "fish&lice".to_string()]
        );
    }
}
