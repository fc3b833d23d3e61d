use blobsign_core::hash::base64_hmac_sha256;
use blobsign_core::time::{format_rfc3339, now, DateTime};
use blobsign_core::Result;
use http::Uri;

use crate::constants::BLOB_SAS_VERSION;
use crate::{Config, Credential};

/// Read-only delegation links are signed for `r` only.
const BLOB_SAS_PERMISSIONS: &str = "r";
const BLOB_SAS_RESOURCE: &str = "b";
const BLOB_SAS_PROTOCOL: &str = "https";

/// Shared access signature granting read access to a single blob.
///
/// The signature covers six fields joined by `\n`: permissions, start
/// (always empty), expiry, canonical resource `/{account}/{path}`,
/// identifier (always empty) and version.
///
/// - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)
#[derive(Debug)]
pub struct BlobSharedAccessSignature {
    credential: Credential,
    path: String,
    expiry: DateTime,
}

impl BlobSharedAccessSignature {
    /// Create a signature for `path` (`/container/blob`) valid until `expiry`.
    pub fn new(credential: &Credential, path: &str, expiry: DateTime) -> Self {
        Self {
            credential: credential.clone(),
            path: path.trim_start_matches('/').to_string(),
            expiry,
        }
    }

    /// The string the signature is computed over.
    pub fn string_to_sign(&self) -> String {
        let expiry = format_rfc3339(self.expiry);
        let resource = format!("/{}/{}", self.credential.account_name(), self.path);

        [
            BLOB_SAS_PERMISSIONS,
            "",
            expiry.as_str(),
            resource.as_str(),
            "",
            BLOB_SAS_VERSION,
        ]
        .join("\n")
    }

    fn signature(&self) -> String {
        base64_hmac_sha256(
            self.credential.account_key(),
            self.string_to_sign().as_bytes(),
        )
    }

    /// Query pairs to append to the blob uri, values already url encoded.
    ///
    /// The expiry is never checked locally, the service enforces it.
    pub fn token(&self) -> Vec<(String, String)> {
        vec![
            ("sr".to_string(), BLOB_SAS_RESOURCE.to_string()),
            ("sp".to_string(), BLOB_SAS_PERMISSIONS.to_string()),
            ("se".to_string(), urlencoded(&format_rfc3339(self.expiry))),
            ("sv".to_string(), BLOB_SAS_VERSION.to_string()),
            ("spr".to_string(), BLOB_SAS_PROTOCOL.to_string()),
            ("sig".to_string(), urlencoded(&self.signature())),
        ]
    }
}

/// The six line string signed into a delegation link for `path`.
pub fn string_to_sign_link(credential: &Credential, path: &str, expiry: DateTime) -> String {
    BlobSharedAccessSignature::new(credential, path, expiry).string_to_sign()
}

/// Build a shareable read-only uri for `path`, valid until `expiry`.
///
/// `expiry` defaults to one hour from now. No request is sent.
pub fn sign_link(config: &Config, path: &str, expiry: Option<DateTime>) -> Result<Uri> {
    let expiry = expiry.unwrap_or_else(|| now() + chrono::TimeDelta::hours(1));
    let sas = BlobSharedAccessSignature::new(config.credential(), path, expiry);

    let mut uri = config.build_uri(path, &[])?.to_string();
    for (idx, (k, v)) in sas.token().into_iter().enumerate() {
        uri.push(if idx == 0 { '?' } else { '&' });
        uri.push_str(&k);
        uri.push('=');
        uri.push_str(&v);
    }

    Ok(uri.parse()?)
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
