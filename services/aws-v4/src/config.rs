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

use crate::constants::{DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};

/// BodyHeaderPolicy controls whether the resolved payload hash is exposed
/// as the `x-amz-content-sha256` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyHeaderPolicy {
    /// Never add the header.
    #[default]
    None,
    /// Add the header whenever the request is signed in header mode.
    AddHeaderIfSigned,
}

/// Options that change how a request is signed.
///
/// Use [`SigningConfig::default`] for most services and
/// [`SigningConfig::s3`] for S3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningConfig {
    /// Percent encode the already encoded path once more.
    ///
    /// Default `true`, `false` for S3.
    pub double_url_encode: bool,
    /// Remove `.` and `..` segments and collapse repeated slashes.
    ///
    /// Default `true`, `false` for S3.
    pub normalize_uri_path: bool,
    /// Hash the payload into the signature.
    ///
    /// `None` lets the signer decide: non-S3 services always sign the
    /// payload, S3 signs it only over plain HTTP.
    pub payload_signing_enabled: Option<bool>,
    /// Sign streaming bodies chunk by chunk.
    ///
    /// Default `false`, `true` for S3.
    pub chunked_encoding_enabled: bool,
    /// Size of every chunk but the last.
    pub chunk_size: usize,
    /// Whether to emit `x-amz-content-sha256`.
    pub body_header_policy: BodyHeaderPolicy,
    /// Apply the S3 specific payload rules.
    pub s3: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            double_url_encode: true,
            normalize_uri_path: true,
            payload_signing_enabled: None,
            chunked_encoding_enabled: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            body_header_policy: BodyHeaderPolicy::None,
            s3: false,
        }
    }
}

impl SigningConfig {
    /// Defaults for Amazon S3.
    pub fn s3() -> Self {
        Self {
            double_url_encode: false,
            normalize_uri_path: false,
            payload_signing_enabled: None,
            chunked_encoding_enabled: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            body_header_policy: BodyHeaderPolicy::AddHeaderIfSigned,
            s3: true,
        }
    }

    /// Set double_url_encode.
    pub fn with_double_url_encode(mut self, v: bool) -> Self {
        self.double_url_encode = v;
        self
    }

    /// Set normalize_uri_path.
    pub fn with_normalize_uri_path(mut self, v: bool) -> Self {
        self.normalize_uri_path = v;
        self
    }

    /// Set payload_signing_enabled.
    pub fn with_payload_signing(mut self, v: bool) -> Self {
        self.payload_signing_enabled = Some(v);
        self
    }

    /// Set chunked_encoding_enabled.
    pub fn with_chunked_encoding(mut self, v: bool) -> Self {
        self.chunked_encoding_enabled = v;
        self
    }

    /// Set chunk_size, raised to the 8 KiB minimum if smaller.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(MIN_CHUNK_SIZE);
        self
    }

    /// Set body_header_policy.
    pub fn with_body_header_policy(mut self, policy: BodyHeaderPolicy) -> Self {
        self.body_header_policy = policy;
        self
    }
}
