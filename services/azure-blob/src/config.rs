use blobsign_core::{Error, Result};
use http::Uri;
use percent_encoding::utf8_percent_encode;

use crate::connection_string;
use crate::constants::AZURE_QUERY_ENCODE_SET;
use crate::Credential;

/// Config carries the resolved credential and endpoint of a blob account.
///
/// It is immutable once built and can be shared freely between tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    credential: Credential,
    scheme: String,
    endpoint_suffix: String,
    endpoint: Option<String>,
}

impl Config {
    /// Create a config for the given credential with default scheme
    /// (`https`) and endpoint suffix (`core.windows.net`).
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            scheme: "https".to_string(),
            endpoint_suffix: "core.windows.net".to_string(),
            endpoint: None,
        }
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// DefaultEndpointsProtocol=https;
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// EndpointSuffix=core.windows.net
    /// ```
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`](blobsign_core::ErrorKind::ConfigInvalid)
    /// when a segment has no `=`, `AccountKey` is missing or is not valid base64.
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Set the scheme used by constructed endpoints.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the host suffix used by constructed endpoints.
    pub fn with_endpoint_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.endpoint_suffix = suffix.into();
        self
    }

    /// Set a literal endpoint, like `http://127.0.0.1:10000/devstoreaccount1`
    /// or `myaccount.blob.example.com`.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The credential used to sign requests.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Azure storage account name.
    pub fn account_name(&self) -> &str {
        self.credential.account_name()
    }

    /// Scheme of constructed endpoints.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host suffix of constructed endpoints.
    pub fn endpoint_suffix(&self) -> &str {
        &self.endpoint_suffix
    }

    /// Literal endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Base of every request uri, without trailing `/`.
    ///
    /// - `{scheme}://{account}.blob.{suffix}` by default
    /// - the literal endpoint when set, prefixed by scheme if it has none
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(ep) if ep.contains("://") => ep.trim_end_matches('/').to_string(),
            Some(ep) => format!("{}://{}", self.scheme, ep.trim_end_matches('/')),
            None => format!(
                "{}://{}.blob.{}",
                self.scheme,
                self.account_name(),
                self.endpoint_suffix
            ),
        }
    }

    /// Build the uri of `path` with the given query parameters.
    ///
    /// `path` is the raw blob path like `/container/dir/blob name`. It is
    /// percent encoded here with `/` kept, so callers must not encode it
    /// beforehand. Query names and values are encoded the same way.
    pub fn build_uri(&self, path: &str, query: &[(&str, &str)]) -> Result<Uri> {
        let mut s = self.endpoint_url();

        s.push('/');
        s.extend(utf8_percent_encode(
            path.trim_start_matches('/'),
            &AZURE_QUERY_ENCODE_SET,
        ));

        for (idx, (k, v)) in query.iter().enumerate() {
            s.push(if idx == 0 { '?' } else { '&' });
            s.extend(utf8_percent_encode(k, &AZURE_QUERY_ENCODE_SET));
            s.push('=');
            s.extend(utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET));
        }

        s.parse::<Uri>().map_err(|e| {
            Error::request_invalid(format!("failed to build uri for path {path}")).with_source(e)
        })
    }
}
