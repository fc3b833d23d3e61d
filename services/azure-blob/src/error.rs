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
use http::{HeaderMap, StatusCode};

/// Result of blob client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration, signing or transport failure.
    #[error(transparent)]
    Core(#[from] blobsign_core::Error),

    /// The service answered with a status other than the one the operation
    /// expects. Never retried.
    #[error("unexpected response status {status}: {body}")]
    UnexpectedResponse {
        /// Status code of the response.
        status: StatusCode,
        /// Headers of the response.
        headers: HeaderMap,
        /// Body of the response, lossily decoded as utf-8.
        body: String,
    },
}

impl Error {
    /// Build an error from a rejected response.
    pub fn from_response(resp: http::Response<Bytes>) -> Self {
        let (parts, body) = resp.into_parts();
        Error::UnexpectedResponse {
            status: parts.status,
            headers: parts.headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    /// Status code of the remote rejection, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Core(_) => None,
            Error::UnexpectedResponse { status, .. } => Some(*status),
        }
    }
}
