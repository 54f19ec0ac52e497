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

use awssig_core::hash::{hex_hmac_sha256, verify_hex_hmac_sha256};
use awssig_core::{Error, Result};
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, VerifyingKey};
use zeroize::Zeroizing;

use crate::credential::SigningIdentity;
use crate::key::{derive_ecdsa_signing_key, derive_signing_key};
use crate::scope::{CredentialScope, SigningRegion};

/// Key material ready to sign strings for one scope.
#[derive(Clone)]
pub(crate) enum SigningKey {
    /// SigV4 `kSigning`.
    Hmac(Zeroizing<Vec<u8>>),
    /// SigV4A private key.
    Ecdsa(p256::ecdsa::SigningKey),
}

impl SigningKey {
    /// Resolve the key for `identity` in `scope`.
    ///
    /// Symmetric identities get the HMAC chain for a single region scope
    /// and the derived P-256 key for a region set. Asymmetric identities
    /// can only sign region sets.
    pub(crate) fn resolve(identity: &SigningIdentity, scope: &CredentialScope) -> Result<Self> {
        match (identity, scope.region()) {
            (SigningIdentity::Symmetric(cred), SigningRegion::Region(_)) => {
                cred.check()?;
                Ok(SigningKey::Hmac(derive_signing_key(
                    &cred.secret_access_key,
                    scope,
                )?))
            }
            (SigningIdentity::Symmetric(cred), SigningRegion::RegionSet(_)) => {
                cred.check()?;
                Ok(SigningKey::Ecdsa(derive_ecdsa_signing_key(
                    &cred.access_key_id,
                    &cred.secret_access_key,
                )?))
            }
            (SigningIdentity::Asymmetric(cred), SigningRegion::RegionSet(_)) => {
                cred.check()?;
                Ok(SigningKey::Ecdsa(cred.signing_key().clone()))
            }
            (SigningIdentity::Asymmetric(_), SigningRegion::Region(_)) => {
                Err(Error::unsupported_config(
                    "an asymmetric key can only sign SigV4A requests",
                ))
            }
        }
    }

    /// Sign `string_to_sign` and return the lowercase hex signature.
    ///
    /// ECDSA uses RFC 6979 nonces, so the same input always yields the same
    /// 64 bytes `r || s` signature.
    pub(crate) fn sign(&self, string_to_sign: &str) -> Result<String> {
        match self {
            SigningKey::Hmac(key) => Ok(hex_hmac_sha256(key, string_to_sign.as_bytes())),
            SigningKey::Ecdsa(key) => {
                let signature: Signature = key.try_sign(string_to_sign.as_bytes()).map_err(|e| {
                    Error::signature_computation("failed to compute ECDSA signature")
                        .with_source(anyhow::anyhow!("{e}"))
                })?;
                Ok(hex::encode(signature.to_bytes()))
            }
        }
    }
}

/// Verify a SigV4 signature by recomputing it from the secret key.
pub fn verify_v4(
    canonical_request: &str,
    scope: &CredentialScope,
    secret_access_key: &str,
    signature: &str,
) -> Result<bool> {
    let key = derive_signing_key(secret_access_key, scope)?;
    let string_to_sign = scope.string_to_sign(canonical_request);
    Ok(verify_hex_hmac_sha256(
        &key,
        string_to_sign.as_bytes(),
        signature,
    ))
}

/// Verify a SigV4A signature against the signer's public key.
///
/// `signature` is hex, either the fixed width `r || s` form or DER.
pub fn verify_v4a(
    canonical_request: &str,
    scope: &CredentialScope,
    public_key: &VerifyingKey,
    signature: &str,
) -> Result<bool> {
    let raw = hex::decode(signature).map_err(|e| {
        Error::invalid_key("signature is not valid hex").with_source(anyhow::Error::from(e))
    })?;
    let signature = if raw.len() == 64 {
        Signature::from_slice(&raw)
    } else {
        Signature::from_der(&raw)
    }
    .map_err(|e| {
        Error::invalid_key("malformed ECDSA signature").with_source(anyhow::anyhow!("{e}"))
    })?;

    let string_to_sign = scope.string_to_sign(canonical_request);
    Ok(public_key
        .verify(string_to_sign.as_bytes(), &signature)
        .is_ok())
}

/// Build a P-256 public key from its hex encoded affine coordinates.
pub fn verifying_key_from_coordinates(x: &str, y: &str) -> Result<VerifyingKey> {
    let decode = |v: &str| -> Result<Vec<u8>> {
        let bs = hex::decode(v).map_err(|e| {
            Error::invalid_key("coordinate is not valid hex").with_source(anyhow::Error::from(e))
        })?;
        if bs.len() != 32 {
            return Err(Error::invalid_key(format!(
                "coordinate must be 32 bytes, got {}",
                bs.len()
            )));
        }
        Ok(bs)
    };

    let mut sec1 = Vec::with_capacity(65);
    sec1.push(0x04);
    sec1.extend_from_slice(&decode(x)?);
    sec1.extend_from_slice(&decode(y)?);

    VerifyingKey::from_sec1_bytes(&sec1).map_err(|e| {
        Error::invalid_key("point is not on curve P-256").with_source(anyhow::anyhow!("{e}"))
    })
}
