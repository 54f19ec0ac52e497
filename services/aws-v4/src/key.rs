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

use awssig_core::hash::hmac_sha256;
use awssig_core::time::format_date;
use awssig_core::{Error, Result};
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, NonZeroScalar, Scalar};
use zeroize::Zeroizing;

use crate::constants::{AWS4_ECDSA_P256_SHA256, AWS4_REQUEST};
use crate::scope::CredentialScope;

/// Derive the SigV4 signing key for a scope.
///
/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
pub(crate) fn derive_signing_key(secret: &str, scope: &CredentialScope) -> Result<Zeroizing<Vec<u8>>> {
    if secret.is_empty() {
        return Err(Error::invalid_credentials("secret access key is empty"));
    }

    // Sign secret
    let secret = Zeroizing::new(format!("AWS4{secret}"));
    // Sign date
    let sign_date = Zeroizing::new(hmac_sha256(
        secret.as_bytes(),
        format_date(scope.time()).as_bytes(),
    ));
    // Sign region
    let sign_region = Zeroizing::new(hmac_sha256(
        &sign_date,
        scope.region().as_str().as_bytes(),
    ));
    // Sign service
    let sign_service = Zeroizing::new(hmac_sha256(&sign_region, scope.service().as_bytes()));
    // Sign request
    Ok(Zeroizing::new(hmac_sha256(
        &sign_service,
        AWS4_REQUEST.as_bytes(),
    )))
}

/// Derive the SigV4A P-256 private key from an access key pair.
///
/// This is the NIST SP 800-108 counter mode KDF with HMAC-SHA256, keyed by
/// `"AWS4A" + secret`. The fixed input is
///
/// ```text
/// i32be(1) || "AWS4-ECDSA-P256-SHA256" || 0x00 || access_key_id || counter || i32be(256)
/// ```
///
/// The 32 bytes output `k0` is accepted when `k0 <= n - 2` (`n` being the
/// curve order) and the private key is `k0 + 1`. Otherwise the counter is
/// bumped and the KDF runs again.
pub(crate) fn derive_ecdsa_signing_key(access_key_id: &str, secret: &str) -> Result<SigningKey> {
    let input_key = Zeroizing::new(format!("AWS4A{secret}"));

    let mut fixed_input = Vec::with_capacity(
        4 + AWS4_ECDSA_P256_SHA256.len() + 1 + access_key_id.len() + 1 + 4,
    );
    for counter in 1..=u8::MAX {
        fixed_input.clear();
        fixed_input.extend_from_slice(&1i32.to_be_bytes());
        fixed_input.extend_from_slice(AWS4_ECDSA_P256_SHA256.as_bytes());
        fixed_input.push(0);
        fixed_input.extend_from_slice(access_key_id.as_bytes());
        fixed_input.push(counter);
        fixed_input.extend_from_slice(&256i32.to_be_bytes());

        let k0 = Zeroizing::new(hmac_sha256(input_key.as_bytes(), &fixed_input));
        if let Some(key) = private_key_from_candidate(&k0) {
            return Ok(key);
        }
    }

    // Each round fails with probability below 2^-32.
    Err(Error::signature_computation(
        "failed to derive a P-256 key from the secret access key",
    ))
}

/// Returns `k0 + 1` as a signing key when `k0 <= n - 2`.
fn private_key_from_candidate(k0: &[u8]) -> Option<SigningKey> {
    // `from_repr` rejects any k0 >= n.
    let k0: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(k0)).into();
    // k0 == n - 1 wraps to zero.
    let d: Option<NonZeroScalar> = NonZeroScalar::new(k0? + Scalar::ONE).into();
    d.map(SigningKey::from)
}
