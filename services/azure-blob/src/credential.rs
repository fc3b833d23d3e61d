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

use blobsign_core::hash::base64_decode;
use blobsign_core::utils::Redact;
use blobsign_core::{Error, Result, SigningCredential};
use std::fmt::{Debug, Formatter};

/// Credential holds the account name and the decoded shared key.
///
/// The key is decoded once, when the credential is built, so a credential
/// that exists can always sign.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    account_name: String,
    account_key: Vec<u8>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_name", &Redact::from(&self.account_name))
            .field("account_key", &Redact::from(&self.account_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.account_name.is_empty() && !self.account_key.is_empty()
    }
}

impl Credential {
    /// Create a credential from an already decoded account key.
    pub fn new(account_name: impl Into<String>, account_key: impl Into<Vec<u8>>) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
        }
    }

    /// Create a credential from a base64 encoded account key.
    ///
    /// Fails with a configuration error if the key is not valid base64.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Result<Self> {
        let account_key = base64_decode(account_key.trim())
            .map_err(|e| Error::config_invalid("account key is not valid base64").with_source(e))?;

        Ok(Self::new(account_name, account_key))
    }

    /// Azure storage account name.
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Decoded account key, used as HMAC key.
    pub fn account_key(&self) -> &[u8] {
        &self.account_key
    }
}
