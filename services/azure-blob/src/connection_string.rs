use std::collections::HashMap;

use blobsign_core::{Error, Result};
use log::debug;

use crate::constants::*;
use crate::{Config, Credential};

/// Keys recognized in an [Azure connection string][1].
///
/// Every key knows its own name and default. Keys not listed here are
/// ignored while parsing.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKey {
    /// Storage account name, used as host prefix and in the canonical resource.
    AccountName,
    /// Base64 encoded shared key. Mandatory outside development storage.
    AccountKey,
    /// Scheme of the constructed endpoint, `http` or `https`.
    DefaultEndpointsProtocol,
    /// Host suffix of the constructed endpoint.
    EndpointSuffix,
    /// Literal blob endpoint, replaces the constructed one.
    BlobEndpoint,
    /// Switch to the local development storage emulator.
    UseDevelopmentStorage,
    /// Base URI of the development storage emulator.
    DevelopmentStorageProxyUri,
}

impl ConnectionKey {
    /// All recognized keys.
    pub const ALL: [ConnectionKey; 7] = [
        ConnectionKey::AccountName,
        ConnectionKey::AccountKey,
        ConnectionKey::DefaultEndpointsProtocol,
        ConnectionKey::EndpointSuffix,
        ConnectionKey::BlobEndpoint,
        ConnectionKey::UseDevelopmentStorage,
        ConnectionKey::DevelopmentStorageProxyUri,
    ];

    /// Name of the key as written in a connection string.
    pub fn name(self) -> &'static str {
        match self {
            ConnectionKey::AccountName => "AccountName",
            ConnectionKey::AccountKey => "AccountKey",
            ConnectionKey::DefaultEndpointsProtocol => "DefaultEndpointsProtocol",
            ConnectionKey::EndpointSuffix => "EndpointSuffix",
            ConnectionKey::BlobEndpoint => "BlobEndpoint",
            ConnectionKey::UseDevelopmentStorage => "UseDevelopmentStorage",
            ConnectionKey::DevelopmentStorageProxyUri => "DevelopmentStorageProxyUri",
        }
    }

    /// Value used when the key is absent.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            ConnectionKey::DefaultEndpointsProtocol => Some("https"),
            ConnectionKey::EndpointSuffix => Some("core.windows.net"),
            ConnectionKey::UseDevelopmentStorage => Some("false"),
            ConnectionKey::DevelopmentStorageProxyUri => Some(DEVSTORE_BLOB_URI),
            ConnectionKey::AccountName
            | ConnectionKey::AccountKey
            | ConnectionKey::BlobEndpoint => None,
        }
    }

    /// Look up a key by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

/// Recognized key/value pairs of a connection string.
#[derive(Debug, Default)]
struct ConnectionString {
    values: HashMap<ConnectionKey, String>,
}

impl ConnectionString {
    /// Split into `;` separated segments, each split on the first `=`.
    ///
    /// Later duplicates replace earlier ones.
    fn parse(conn_str: &str) -> Result<Self> {
        let mut values = HashMap::new();

        for field in conn_str.trim().replace(['\r', '\n'], "").split(';') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }

            let (key, value) = field.split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field starting with: {}",
                    display_field(field)
                ))
            })?;

            match ConnectionKey::from_name(key.trim()) {
                Some(key) => {
                    values.insert(key, value.trim().to_string());
                }
                None => debug!("ignore unknown connection string key: {}", key.trim()),
            }
        }

        Ok(Self { values })
    }

    fn get(&self, key: ConnectionKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    fn get_or_default(&self, key: ConnectionKey) -> Option<&str> {
        self.get(key).or_else(|| key.default_value())
    }

    fn use_development_storage(&self) -> bool {
        self.get_or_default(ConnectionKey::UseDevelopmentStorage)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Name the key a malformed segment starts with, never its content.
fn display_field(field: &str) -> &'static str {
    ConnectionKey::ALL
        .into_iter()
        .find(|key| {
            field
                .get(..key.name().len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(key.name()))
        })
        .map_or("<redacted>", ConnectionKey::name)
}

/// Parses an [Azure connection string][1] into a complete [`Config`].
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let cs = ConnectionString::parse(conn_str)?;

    if cs.use_development_storage() {
        return development_config(&cs);
    }

    let account_key = cs.get(ConnectionKey::AccountKey).ok_or_else(|| {
        Error::config_invalid("connection string is missing required key AccountKey")
    })?;

    let scheme = cs
        .get_or_default(ConnectionKey::DefaultEndpointsProtocol)
        .unwrap_or("https");
    if scheme != "http" && scheme != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {scheme}"
        )));
    }

    let endpoint = cs.get(ConnectionKey::BlobEndpoint);
    let account_name = match cs.get(ConnectionKey::AccountName) {
        Some(v) => v.to_string(),
        None => endpoint.and_then(account_name_from_endpoint).ok_or_else(|| {
            Error::config_invalid(
                "connection string is missing AccountName and it can't be derived from BlobEndpoint",
            )
        })?,
    };

    let credential = Credential::with_shared_key(&account_name, account_key)?;

    let mut config = Config::new(credential).with_scheme(scheme);
    if let Some(suffix) = cs.get_or_default(ConnectionKey::EndpointSuffix) {
        config = config.with_endpoint_suffix(suffix);
    }
    if let Some(endpoint) = endpoint {
        config = config.with_endpoint(endpoint);
    }

    Ok(config)
}

fn development_config(cs: &ConnectionString) -> Result<Config> {
    let account_name = cs
        .get(ConnectionKey::AccountName)
        .unwrap_or(DEVSTORE_ACCOUNT_NAME);
    let account_key = cs
        .get(ConnectionKey::AccountKey)
        .unwrap_or(DEVSTORE_ACCOUNT_KEY);
    let proxy_uri = cs
        .get_or_default(ConnectionKey::DevelopmentStorageProxyUri)
        .unwrap_or(DEVSTORE_BLOB_URI)
        .trim_end_matches('/');

    let credential = Credential::with_shared_key(account_name, account_key)?;
    Ok(Config::new(credential)
        .with_scheme("http")
        .with_endpoint(format!("{proxy_uri}/{account_name}")))
}

/// Derive `account` from an endpoint like `https://account.blob.core.windows.net`.
fn account_name_from_endpoint(endpoint: &str) -> Option<String> {
    let host = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    let host = host.split(['/', ':']).next()?;

    match host.split_once(".blob.") {
        Some((account, _)) if !account.is_empty() => Some(account.to_string()),
        _ => None,
    }
}
