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

//! Hash related utils.

use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;

/// Hex encoded SHA256 of the empty string.
pub const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Hex encoded SHA256 hash.
///
/// Use this function instead of `hex::encode(sha256(content))` can reduce
/// extra copy.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

type HmacSha256 = Hmac<Sha256>;

fn new_hmac_sha256(key: &[u8], content: &[u8]) -> HmacSha256 {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = HmacSha256::new_from_slice(key).unwrap();
    h.update(content);
    h
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    new_hmac_sha256(key, content)
        .finalize()
        .into_bytes()
        .to_vec()
}

/// Hex encoded HMAC with SHA256 hash.
///
/// Every SigV4 signature is one of these, keyed by the derived signing key.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    hex::encode(new_hmac_sha256(key, content).finalize().into_bytes())
}

/// Verify a hex encoded HMAC with SHA256 hash in constant time.
///
/// Returns `false` if `expected` is not valid hex.
pub fn verify_hex_hmac_sha256(key: &[u8], content: &[u8], expected: &str) -> bool {
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    new_hmac_sha256(key, content)
        .verify_slice(&expected)
        .is_ok()
}
