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

use async_trait::async_trait;
use blobsign_core::{Context, ProvideCredential, Result};
use log::debug;

use crate::constants::*;
use crate::{Config, Credential};

/// EnvCredentialProvider loads the credential from environment variables.
///
/// - `AZURE_STORAGE_CONNECTION_STRING`: a full connection string
/// - `AZURE_STORAGE_ACCOUNT` + `AZURE_STORAGE_KEY`: used when no connection
///   string is set
///
/// A malformed value is reported as a configuration error instead of being
/// skipped.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if let Some(conn_str) = ctx.env_var(AZURE_STORAGE_CONNECTION_STRING) {
            let config = Config::try_from_connection_string(&conn_str)?;
            return Ok(Some(config.credential().clone()));
        }

        match (
            ctx.env_var(AZURE_STORAGE_ACCOUNT),
            ctx.env_var(AZURE_STORAGE_KEY),
        ) {
            (Some(account_name), Some(account_key)) => Ok(Some(Credential::with_shared_key(
                &account_name,
                &account_key,
            )?)),
            _ => {
                debug!("no azure blob credential found in env");
                Ok(None)
            }
        }
    }
}
