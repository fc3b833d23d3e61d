use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure blob services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";

/// Pinned service version sent as `x-ms-version`.
///
/// Changing it changes remote size limits and behavior.
pub const AZURE_VERSION: &str = "2019-12-12";

/// Signed version of delegation links.
///
/// Older than [`AZURE_VERSION`]: the six field string to sign only exists
/// for this version.
pub const BLOB_SAS_VERSION: &str = "2012-02-12";

// Env values used to load credentials.
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
pub const AZURE_STORAGE_ACCOUNT: &str = "AZURE_STORAGE_ACCOUNT";
pub const AZURE_STORAGE_KEY: &str = "AZURE_STORAGE_KEY";

// Development storage (Azurite) defaults.
pub const DEVSTORE_ACCOUNT_NAME: &str = "devstoreaccount1";
pub const DEVSTORE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
pub const DEVSTORE_BLOB_URI: &str = "http://127.0.0.1:10000";

pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
