//! Azure Blob Storage request signer
//!
//! This crate signs Azure Blob Storage requests with Shared Key
//! authorization and builds read-only delegation links. A small [`Client`]
//! covers the usual blob operations on top of the signer.
//!
//! ## Example
//!
//! ```no_run
//! use blobsign_azure_blob::{Config, RequestSigner, StaticCredentialProvider};
//! use blobsign_core::{Context, Result, Signer};
//!
//! # async fn example() -> Result<()> {
//! let config = Config::try_from_connection_string(
//!     "AccountName=account;AccountKey=a2V5;EndpointSuffix=core.windows.net",
//! )?;
//!
//! let signer = Signer::new(
//!     Context::new(),
//!     StaticCredentialProvider::new(config.credential().clone()),
//!     RequestSigner::new(),
//! );
//!
//! let uri = config.build_uri("/container/blob.txt", &[])?;
//! let mut parts = http::Request::get(uri).body(())?.into_parts().0;
//! signer.sign(&mut parts, None).await?;
//!
//! assert!(parts.headers.contains_key("authorization"));
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::{AZURE_VERSION, BLOB_SAS_VERSION};

mod connection_string;
pub use connection_string::ConnectionKey;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{sign, string_to_sign, RequestSigner};

mod blob_sas;
pub use blob_sas::{sign_link, string_to_sign_link, BlobSharedAccessSignature};

mod path;
pub use path::split_path;

mod provide_credential;
pub use provide_credential::*;

mod error;
pub use error::{Error, Result};

mod client;
pub use client::{BlobWrite, Client};
