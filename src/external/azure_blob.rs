use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::config::StorageConfig;
use crate::external::blob_store::{check_blob_path, BlobStore, StorageError};

const API_VERSION: &str = "2019-12-12";

static BLOB_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<Blob>.*?<Name>(.*?)</Name>").expect("blob name pattern is valid")
});

static NEXT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<NextMarker>(.*?)</NextMarker>").expect("marker pattern is valid")
});

/// Endpoint and query credentials resolved from [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct AzureSettings {
    pub endpoint: Url,
    pub sas_pairs: Vec<(String, String)>,
    /// An account key was supplied without a SAS token. Shared-key signing
    /// is not implemented, so requests go out anonymously.
    pub account_key_ignored: bool,
}

impl AzureSettings {
    /// Explicit settings win over values embedded in the connection string.
    pub fn resolve(config: &StorageConfig) -> Result<Self, String> {
        let parts = config
            .connection_string
            .as_deref()
            .map(parse_connection_string)
            .unwrap_or_default();

        let account = config
            .account
            .clone()
            .or_else(|| parts.get("AccountName").cloned());

        let sas_token = config
            .sas_token
            .clone()
            .or_else(|| parts.get("SharedAccessSignature").cloned());

        let account_key_ignored = sas_token.is_none()
            && (config.account_key.is_some() || parts.contains_key("AccountKey"));
        if account_key_ignored {
            warn!("An account key is configured (AZURE_STORAGE_KEY or AccountKey) but shared-key signing is not supported; requests will be sent without credentials, set AZURE_STORAGE_SAS_TOKEN instead");
        }

        let endpoint = match config
            .endpoint
            .clone()
            .or_else(|| parts.get("BlobEndpoint").cloned())
        {
            Some(endpoint) => endpoint,
            None => {
                let account = account.ok_or_else(|| {
                    "Azure storage account not configured (set AZURE_STORAGE_ACCOUNT or AZURE_STORAGE_CONNECTION_STRING)"
                        .to_string()
                })?;
                let protocol = parts
                    .get("DefaultEndpointsProtocol")
                    .map(String::as_str)
                    .unwrap_or("https");
                let suffix = parts
                    .get("EndpointSuffix")
                    .map(String::as_str)
                    .unwrap_or("core.windows.net");
                format!("{}://{}.blob.{}", protocol, account, suffix)
            }
        };

        let endpoint = Url::parse(&endpoint)
            .map_err(|e| format!("invalid blob endpoint '{}': {}", endpoint, e))?;
        if endpoint.cannot_be_a_base() {
            return Err(format!("invalid blob endpoint '{}'", endpoint));
        }

        let sas_pairs = sas_token
            .map(|token| {
                url::form_urlencoded::parse(token.trim_start_matches('?').as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            endpoint,
            sas_pairs,
            account_key_ignored,
        })
    }

    pub fn blob_url(&self, container: &str, path: &str) -> Url {
        let mut url = self.container_url(container);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path.split('/'));
        }
        self.append_sas(&mut url);
        url
    }

    pub fn list_url(&self, container: &str, marker: Option<&str>) -> Url {
        let mut url = self.container_url(container);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("restype", "container");
            query.append_pair("comp", "list");
            if let Some(marker) = marker {
                query.append_pair("marker", marker);
            }
        }
        self.append_sas(&mut url);
        url
    }

    fn container_url(&self, container: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(container);
        }
        url
    }

    fn append_sas(&self, url: &mut Url) {
        if self.sas_pairs.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in &self.sas_pairs {
            query.append_pair(key, value);
        }
    }
}

/// Azure Blob Storage over its REST API.
///
/// Configuration problems are kept until the first request so that a
/// misconfigured deployment still starts and reports the error per call.
pub struct AzureBlobStore {
    client: reqwest::Client,
    settings: Result<AzureSettings, String>,
}

impl AzureBlobStore {
    pub fn from_config(config: &StorageConfig) -> Self {
        let settings = AzureSettings::resolve(config);
        if let Err(reason) = &settings {
            warn!("Azure blob storage is not usable yet: {}", reason);
        }

        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn settings(&self) -> Result<&AzureSettings, StorageError> {
        self.settings
            .as_ref()
            .map_err(|reason| StorageError::NotConfigured(reason.clone()))
    }

    async fn get_text(&self, url: Url, container: &str, path: &str) -> Result<String, StorageError> {
        let resp = self
            .client
            .get(url)
            .header("x-ms-version", API_VERSION)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                container: container.to_string(),
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StorageError::BadResponse(format!(
                "Failed to fetch from Azure: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        resp.text()
            .await
            .map_err(|e| StorageError::BadResponse(e.to_string()))
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn fetch_text(
        &self,
        container: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        let settings = self.settings()?;
        check_blob_path(container, path)?;

        let url = settings.blob_url(container, path);
        debug!("GET blob {}/{}", container, path);
        self.get_text(url, container, path).await
    }

    async fn list_blob_names(
        &self,
        container: &str,
    ) -> Result<Vec<String>, StorageError> {
        let settings = self.settings()?;

        let mut names = Vec::new();
        let mut marker: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let url = settings.list_url(container, marker.as_deref());
            let body = self.get_text(url, container, "").await?;
            pages += 1;

            names.extend(parse_blob_names(&body));

            match parse_next_marker(&body) {
                Some(next) if Some(&next) != marker.as_ref() => marker = Some(next),
                _ => break,
            }
        }

        debug!("Listed {} blobs in {} page(s) from {}", names.len(), pages, container);
        Ok(names)
    }
}

pub fn parse_connection_string(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

pub fn parse_blob_names(xml: &str) -> Vec<String> {
    BLOB_NAME_RE
        .captures_iter(xml)
        .map(|cap| decode_xml_entities(&cap[1]))
        .collect()
}

pub fn parse_next_marker(xml: &str) -> Option<String> {
    NEXT_MARKER_RE
        .captures(xml)
        .map(|cap| decode_xml_entities(cap[1].trim()))
        .filter(|marker| !marker.is_empty())
}

fn decode_xml_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
