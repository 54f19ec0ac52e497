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

use crate::{Credential, EcdsaCredential, SigningIdentity};
use async_trait::async_trait;
use awssig_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides static AWS credentials.
///
/// This provider is used when you have the access key ID and secret access key
/// (or a SigV4A private key) directly and want to use them without any
/// dynamic loading.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    identity: SigningIdentity,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with access key ID and secret access key.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            identity: Credential::new(access_key_id, secret_access_key).into(),
        }
    }

    /// Create a new StaticCredentialProvider with a P-256 key pair.
    pub fn new_ecdsa(credential: EcdsaCredential) -> Self {
        Self {
            identity: credential.into(),
        }
    }

    /// Set the session token.
    pub fn with_session_token(mut self, token: &str) -> Self {
        self.identity = match self.identity {
            SigningIdentity::Symmetric(c) => c.with_session_token(token).into(),
            SigningIdentity::Asymmetric(c) => c.with_session_token(token).into(),
        };
        self
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = SigningIdentity;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.identity.clone()))
    }
}
