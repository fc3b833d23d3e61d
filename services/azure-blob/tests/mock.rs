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

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use blobsign_azure_blob::{sign, Client, Config, Credential, RequestSigner};
use blobsign_core::time::{parse_rfc3339, DateTime};
use blobsign_core::{Context, HttpSend, Result, SigningRequest};
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, StatusCode, Uri};

/// A request seen by [`MockHttpSend`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    /// Recompute the authorization of this request from scratch.
    pub fn expected_authorization(&self, cred: &Credential) -> String {
        let mut headers = self.headers.clone();
        headers.remove(http::header::AUTHORIZATION);

        let mut req = Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone())
            .body(())
            .unwrap();
        *req.headers_mut() = headers;

        let (mut parts, _) = req.into_parts();
        let snapshot = SigningRequest::build(&mut parts).unwrap();
        sign(cred, &snapshot).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.to_str().unwrap())
    }
}

/// MockHttpSend records every request and answers with queued responses.
///
/// An empty queue answers `500`.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<VecDeque<Response<Bytes>>>>,
}

impl MockHttpSend {
    pub fn respond(&self, status: StatusCode, body: &str) -> &Self {
        let resp = Response::builder()
            .status(status)
            .body(Bytes::from(body.to_string()))
            .unwrap();
        self.responses.lock().unwrap().push_back(resp);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.requests.lock().unwrap().push(Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });

        let resp = self.responses.lock().unwrap().pop_front();
        Ok(resp.unwrap_or_else(|| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Bytes::new())
                .unwrap()
        }))
    }
}

pub fn test_time() -> DateTime {
    parse_rfc3339("2022-03-01T08:12:34Z").unwrap()
}

pub fn test_config() -> Config {
    Config::try_from_connection_string("AccountName=account;AccountKey=a2V5").unwrap()
}

/// A client with a pinned signing time talking to `mock`.
pub fn test_client(mock: &MockHttpSend) -> Client {
    let _ = env_logger::builder().is_test(true).try_init();

    Client::new(Context::new().with_http_send(mock.clone()), test_config())
        .with_request_signer(RequestSigner::new().with_time(test_time()))
}
