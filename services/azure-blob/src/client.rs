// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Method, Request, Response, StatusCode, Uri};
use log::debug;
use quick_xml::de;
use serde::Deserialize;

use blobsign_core::time::DateTime;
use blobsign_core::{Context, Signer};

use crate::constants::X_MS_BLOB_TYPE;
use crate::error::{Error, Result};
use crate::{sign_link, split_path, Config, Credential, RequestSigner, StaticCredentialProvider};

/// Content written by [`Client::put_blob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobWrite {
    /// Upload the whole body as a block blob in one request.
    Block(Bytes),
    /// Create an empty append blob, then append the body as its first block.
    Append(Bytes),
}

/// Client sends signed blob requests through the context transport.
///
/// Every operation is a single request/response exchange. Any status other
/// than the expected one is returned as [`Error::UnexpectedResponse`], and
/// nothing is retried.
#[derive(Clone, Debug)]
pub struct Client {
    config: Config,
    signer: Signer<Credential>,
}

impl Client {
    /// Create a client signing with the credential of `config`.
    pub fn new(ctx: Context, config: Config) -> Self {
        let signer = Signer::new(
            ctx,
            StaticCredentialProvider::new(config.credential().clone()),
            RequestSigner::new(),
        );

        Self { config, signer }
    }

    /// Create a client from an Azure connection string.
    pub fn from_connection_string(ctx: Context, conn_str: &str) -> Result<Self> {
        Ok(Self::new(ctx, Config::try_from_connection_string(conn_str)?))
    }

    /// Replace the request signer, mostly to pin the signing time in tests.
    pub fn with_request_signer(mut self, builder: RequestSigner) -> Self {
        self.signer = Signer::new(
            self.signer.context().clone(),
            StaticCredentialProvider::new(self.config.credential().clone()),
            builder,
        );
        self
    }

    /// Config used to build uris.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create `container`.
    pub async fn create_container(&self, container: &str) -> Result<()> {
        let req = self.request(
            Method::PUT,
            container,
            &[("restype", "container")],
            None,
            Bytes::new(),
        )?;
        self.send(req, StatusCode::CREATED).await?;
        Ok(())
    }

    /// Write a blob at `path` (`/container/blob`).
    pub async fn put_blob(&self, path: &str, write: BlobWrite) -> Result<()> {
        match write {
            BlobWrite::Block(body) => {
                let req = self.request(Method::PUT, path, &[], Some("BlockBlob"), body)?;
                self.send(req, StatusCode::CREATED).await?;
            }
            BlobWrite::Append(body) => {
                let req = self.request(Method::PUT, path, &[], Some("AppendBlob"), Bytes::new())?;
                self.send(req, StatusCode::CREATED).await?;

                if !body.is_empty() {
                    self.append_block(path, body).await?;
                }
            }
        }
        Ok(())
    }

    /// Append `body` to the existing append blob at `path`.
    pub async fn append_block(&self, path: &str, body: Bytes) -> Result<()> {
        let req = self.request(Method::PUT, path, &[("comp", "appendblock")], None, body)?;
        self.send(req, StatusCode::CREATED).await?;
        Ok(())
    }

    /// Read the whole blob at `path`.
    pub async fn get_blob(&self, path: &str) -> Result<Bytes> {
        let req = self.request(Method::GET, path, &[], None, Bytes::new())?;
        let resp = self.send(req, StatusCode::OK).await?;
        Ok(resp.into_body())
    }

    /// Delete the blob at `path`.
    pub async fn delete_blob(&self, path: &str) -> Result<()> {
        let req = self.request(Method::DELETE, path, &[], None, Bytes::new())?;
        self.send(req, StatusCode::ACCEPTED).await?;
        Ok(())
    }

    /// List the names of blobs under `path` (`/container[/prefix]`).
    ///
    /// Pages are followed through `NextMarker` until the listing is
    /// exhausted.
    pub async fn list_blobs(&self, path: &str) -> Result<Vec<String>> {
        let (container, prefix) = split_path(path);

        let mut names = Vec::new();
        let mut marker = String::new();
        loop {
            let mut query = vec![("restype", "container"), ("comp", "list")];
            if let Some(prefix) = prefix {
                query.push(("prefix", prefix));
            }
            if !marker.is_empty() {
                query.push(("marker", marker.as_str()));
            }

            let req = self.request(Method::GET, container, &query, None, Bytes::new())?;
            let resp = self.send(req, StatusCode::OK).await?;
            let page = parse_list_blobs(resp.body())?;

            names.extend(page.blobs.blob.into_iter().map(|b| b.name));
            if page.next_marker.is_empty() {
                break;
            }
            marker = page.next_marker;
        }

        Ok(names)
    }

    /// Build a read-only link to `path`, see [`sign_link`].
    pub fn signed_link(&self, path: &str, expiry: Option<DateTime>) -> Result<Uri> {
        Ok(sign_link(&self.config, path, expiry)?)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        blob_type: Option<&str>,
        body: Bytes,
    ) -> blobsign_core::Result<Request<Bytes>> {
        let uri = self.config.build_uri(path, query)?;

        let mut req = Request::builder().method(method.clone()).uri(uri);
        if method == Method::PUT {
            req = req.header(CONTENT_LENGTH, body.len().to_string());
        }
        if let Some(blob_type) = blob_type {
            req = req.header(X_MS_BLOB_TYPE, blob_type);
        }

        Ok(req.body(body)?)
    }

    async fn send(&self, req: Request<Bytes>, expected: StatusCode) -> Result<Response<Bytes>> {
        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, None).await?;

        debug!("send blob request: {} {}", parts.method, parts.uri);
        let resp = self
            .signer
            .context()
            .http_send(Request::from_parts(parts, body))
            .await?;

        if resp.status() != expected {
            debug!(
                "blob request failed, expected {expected} but got {}",
                resp.status()
            );
            return Err(Error::from_response(resp));
        }
        Ok(resp)
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct EnumerationResults {
    blobs: Blobs,
    next_marker: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Blobs {
    blob: Vec<BlobItem>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobItem {
    name: String,
}

fn parse_list_blobs(body: &[u8]) -> blobsign_core::Result<EnumerationResults> {
    let body = String::from_utf8_lossy(body);
    let body = body.trim_start_matches('\u{feff}');

    de::from_str(body).map_err(|e| {
        blobsign_core::Error::unexpected("failed to parse list blobs response").with_source(e)
    })
}
