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

use awssig_core::time::{now, DateTime};
use awssig_core::utils::{Redact, RedactedKey};
use awssig_core::{Error, Result, SigningCredential};
use p256::ecdsa::{SigningKey, VerifyingKey};
use std::fmt::{Debug, Formatter};

use crate::key::derive_ecdsa_signing_key;

/// Credential that holds the access_key and secret_key.
#[derive(Default, Clone)]
pub struct Credential {
    /// Access key id for aws services.
    pub access_key_id: String,
    /// Secret access key for aws services.
    pub secret_access_key: String,
    /// Session token for aws services.
    pub session_token: Option<String>,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,
}

impl Credential {
    /// Create a credential without session token or expiry.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            ..Default::default()
        }
    }

    /// Set the session token.
    pub fn with_session_token(mut self, token: &str) -> Self {
        self.session_token = Some(token.to_string());
        self
    }

    /// Check that both halves of the key pair are present.
    pub(crate) fn check(&self) -> Result<()> {
        if self.access_key_id.is_empty() {
            return Err(Error::invalid_credentials("access key id is empty"));
        }
        if self.secret_access_key.is_empty() {
            return Err(Error::invalid_credentials("secret access key is empty"));
        }
        Ok(())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return false;
        }
        // Take 120s as buffer to avoid edge cases.
        if let Some(valid) = self
            .expires_in
            .map(|v| v > now() + chrono::TimeDelta::try_minutes(2).expect("in bounds"))
        {
            return valid;
        }

        true
    }
}

/// EcdsaCredential holds the P-256 key pair used by SigV4A.
#[derive(Clone)]
pub struct EcdsaCredential {
    /// Access key id for aws services.
    pub access_key_id: String,
    /// Session token for aws services.
    pub session_token: Option<String>,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,

    signing_key: SigningKey,
}

impl EcdsaCredential {
    /// Create a credential from an existing P-256 signing key.
    pub fn new(access_key_id: &str, signing_key: SigningKey) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            session_token: None,
            expires_in: None,
            signing_key,
        }
    }

    /// Create a credential from a raw 32 bytes big endian P-256 private key.
    ///
    /// Fails with `InvalidKey` if the bytes are not a valid scalar of the
    /// curve (zero, or not smaller than the group order).
    pub fn from_private_key(access_key_id: &str, private_key: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(private_key).map_err(|e| {
            Error::invalid_key("private key is not a valid P-256 scalar")
                .with_source(anyhow::anyhow!("{e}"))
        })?;
        Ok(Self::new(access_key_id, signing_key))
    }

    /// Derive the SigV4A key pair from a symmetric credential.
    ///
    /// The derivation is deterministic: the same access key id and secret
    /// always yield the same key pair. Session token and expiry are carried
    /// over.
    pub fn derive(cred: &Credential) -> Result<Self> {
        cred.check()?;

        let signing_key = derive_ecdsa_signing_key(&cred.access_key_id, &cred.secret_access_key)?;
        Ok(Self {
            access_key_id: cred.access_key_id.clone(),
            session_token: cred.session_token.clone(),
            expires_in: cred.expires_in,
            signing_key,
        })
    }

    /// Set the session token.
    pub fn with_session_token(mut self, token: &str) -> Self {
        self.session_token = Some(token.to_string());
        self
    }

    /// The private key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The public key matching this credential.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.access_key_id.is_empty() {
            return Err(Error::invalid_credentials("access key id is empty"));
        }
        Ok(())
    }
}

impl Debug for EcdsaCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaCredential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("signing_key", &RedactedKey("P-256"))
            .field("session_token", &Redact::from(&self.session_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for EcdsaCredential {
    fn is_valid(&self) -> bool {
        if self.access_key_id.is_empty() {
            return false;
        }
        if let Some(valid) = self
            .expires_in
            .map(|v| v > now() + chrono::TimeDelta::try_minutes(2).expect("in bounds"))
        {
            return valid;
        }

        true
    }
}

/// SigningIdentity is the identity a request is signed with.
///
/// Exactly one variant is active per signing operation. A symmetric identity
/// can sign both SigV4 and SigV4A requests (the latter through key
/// derivation); an asymmetric one only SigV4A.
#[derive(Clone, Debug)]
pub enum SigningIdentity {
    /// Access key id and secret access key.
    Symmetric(Credential),
    /// Access key id and P-256 private key.
    Asymmetric(EcdsaCredential),
}

impl SigningIdentity {
    /// Access key id of this identity.
    pub fn access_key_id(&self) -> &str {
        match self {
            SigningIdentity::Symmetric(c) => &c.access_key_id,
            SigningIdentity::Asymmetric(c) => &c.access_key_id,
        }
    }

    /// Session token of this identity, if any.
    pub fn session_token(&self) -> Option<&str> {
        match self {
            SigningIdentity::Symmetric(c) => c.session_token.as_deref(),
            SigningIdentity::Asymmetric(c) => c.session_token.as_deref(),
        }
    }
}

impl From<Credential> for SigningIdentity {
    fn from(value: Credential) -> Self {
        SigningIdentity::Symmetric(value)
    }
}

impl From<EcdsaCredential> for SigningIdentity {
    fn from(value: EcdsaCredential) -> Self {
        SigningIdentity::Asymmetric(value)
    }
}

impl SigningCredential for SigningIdentity {
    fn is_valid(&self) -> bool {
        match self {
            SigningIdentity::Symmetric(c) => c.is_valid(),
            SigningIdentity::Asymmetric(c) => c.is_valid(),
        }
    }
}
