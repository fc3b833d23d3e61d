use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use blobsign_core::hash::base64_hmac_sha256;
use blobsign_core::time::{format_http_date, now, DateTime};
use blobsign_core::{Context, Error, Result, SignRequest, SigningMethod, SigningRequest};
use http::header::{self, HeaderName};
use http::request::Parts;
use http::HeaderValue;
use log::debug;

use crate::blob_sas::BlobSharedAccessSignature;
use crate::constants::*;
use crate::Credential;

const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

/// Standard headers in the order they appear in the string to sign.
static STANDARD_HEADERS: [HeaderName; 11] = [
    header::CONTENT_ENCODING,
    header::CONTENT_LANGUAGE,
    header::CONTENT_LENGTH,
    CONTENT_MD5,
    header::CONTENT_TYPE,
    header::DATE,
    header::IF_MODIFIED_SINCE,
    header::IF_MATCH,
    header::IF_NONE_MATCH,
    header::IF_UNMODIFIED_SINCE,
    header::RANGE,
];

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
///
/// Header signing stamps `x-ms-date` (and `x-ms-version` when absent)
/// before the snapshot is signed. Query signing appends a read-only
/// delegation link valid for the requested duration.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new request signer for Azure Blob Storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid("credential is required"));
        };

        let method = match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        };
        let now_time = self.time.unwrap_or_else(now);

        let mut ctx = SigningRequest::build(req)?;

        match method {
            SigningMethod::Query(d) => {
                let expiry = now_time
                    + chrono::TimeDelta::from_std(d).map_err(|e| {
                        Error::request_invalid("expires_in is out of range").with_source(e)
                    })?;
                let path = blob_path(&ctx, cred.account_name());
                let sas = BlobSharedAccessSignature::new(cred, &path, expiry);
                for (k, v) in sas.token() {
                    ctx.query_push(k, v);
                }
            }
            SigningMethod::Header => {
                ctx.headers
                    .insert(X_MS_DATE, format_http_date(now_time).parse()?);
                if !ctx.headers.contains_key(X_MS_VERSION) {
                    ctx.headers
                        .insert(X_MS_VERSION, HeaderValue::from_static(AZURE_VERSION));
                }

                let mut value: HeaderValue = sign(cred, &ctx)?.parse()?;
                value.set_sensitive(true);
                ctx.headers.insert(header::AUTHORIZATION, value);
            }
        }

        ctx.apply(req)
    }
}

/// Path of the blob below the account, as delegation links sign it.
///
/// Path style endpoints (`http://127.0.0.1:10000/{account}/...`) carry the
/// account as first segment, which is dropped here. Virtual hosted
/// endpoints (`{account}.blob.core.windows.net`) keep the path as is.
fn blob_path(req: &SigningRequest, account_name: &str) -> String {
    let path = req.path_percent_decoded();

    let virtual_hosted = req
        .authority
        .host()
        .strip_prefix(account_name)
        .is_some_and(|rest| rest.starts_with('.'));
    if !virtual_hosted {
        if let Some(rest) = path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(account_name))
            .filter(|rest| rest.starts_with('/'))
        {
            return rest.to_string();
        }
    }

    path.into_owned()
}

/// Compute the `Authorization` header value of a finalized request snapshot.
///
/// Returns `SharedKey {account}:{signature}`. Every header that takes part
/// in the string to sign must already be set on `req`.
pub fn sign(cred: &Credential, req: &SigningRequest) -> Result<String> {
    let string_to_sign = string_to_sign(req, cred.account_name())?;
    let signature = base64_hmac_sha256(cred.account_key(), string_to_sign.as_bytes());

    Ok(format!("SharedKey {}:{}", cred.account_name(), signature))
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// Absent headers contribute an empty line, and so does a `Content-Length`
/// of `0`.
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
pub fn string_to_sign(req: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(256);

    s.push_str(req.method.as_str());
    s.push('\n');
    for name in &STANDARD_HEADERS {
        let value = req.header_get_or_default(name)?;
        if *name != header::CONTENT_LENGTH || value != "0" {
            s.push_str(value);
        }
        s.push('\n');
    }
    s.push_str(&canonicalize_header(req)?);
    s.push_str(&canonicalize_resource(req, account_name));

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// Every `x-ms-*` header as `name:value\n`, sorted by name.
///
/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(req: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        req.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// `/{account}{path}` followed by `\nname:value` for every query parameter.
///
/// Names are lower cased and sorted, values percent decoded. Values of a
/// repeated name are sorted and joined by `,`.
///
/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(req: &SigningRequest, account_name: &str) -> String {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in req.query_percent_decoded() {
        grouped.entry(k.to_lowercase()).or_default().push(v);
    }

    let query = grouped
        .into_iter()
        .map(|(k, mut values)| {
            values.sort();
            (k, values.join(","))
        })
        .collect();

    format!(
        "/{}{}{}",
        account_name,
        req.path,
        SigningRequest::query_to_string(query, ":", "\n")
    )
}
