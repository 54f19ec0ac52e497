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

use std::fmt::{self, Display, Formatter};

use awssig_core::hash::{hex_sha256, EMPTY_STRING_SHA256};
use awssig_core::time::{format_date, format_iso8601, DateTime};
use awssig_core::{Error, Result};

use crate::constants::{
    AWS4_ECDSA_P256_SHA256, AWS4_ECDSA_P256_SHA256_PAYLOAD, AWS4_HMAC_SHA256,
    AWS4_HMAC_SHA256_PAYLOAD, AWS4_REQUEST, STREAMING_AWS4_ECDSA_P256_SHA256_PAYLOAD,
    STREAMING_AWS4_HMAC_SHA256_PAYLOAD,
};

/// Where a signature is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningRegion {
    /// A single region, signed with SigV4.
    Region(String),
    /// A region set such as `*`, `aws-global` or `us-east-1,us-west-2`,
    /// signed with SigV4A.
    RegionSet(String),
}

impl SigningRegion {
    /// Returns true for SigV4A region sets.
    pub fn is_region_set(&self) -> bool {
        matches!(self, SigningRegion::RegionSet(_))
    }

    /// The region or region set string.
    pub fn as_str(&self) -> &str {
        match self {
            SigningRegion::Region(v) | SigningRegion::RegionSet(v) => v,
        }
    }
}

/// CredentialScope binds a signature to a day, a region (or region set)
/// and a service.
///
/// Renders as `YYYYMMDD/<region>/<service>/aws4_request` for SigV4 and
/// `YYYYMMDD/<service>/aws4_request` for SigV4A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    time: DateTime,
    region: SigningRegion,
    service: String,
}

impl CredentialScope {
    /// Create a new scope, rejecting empty region or service.
    pub fn new(time: DateTime, region: SigningRegion, service: &str) -> Result<Self> {
        if service.is_empty() {
            return Err(Error::invalid_region_or_service("service is empty"));
        }
        if region.as_str().is_empty() {
            let what = if region.is_region_set() {
                "region set"
            } else {
                "region"
            };
            return Err(Error::invalid_region_or_service(format!("{what} is empty")));
        }

        Ok(Self {
            time,
            region,
            service: service.to_string(),
        })
    }

    /// Signing time.
    pub fn time(&self) -> DateTime {
        self.time
    }

    /// Region or region set.
    pub fn region(&self) -> &SigningRegion {
        &self.region
    }

    /// Service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// `X-Amz-Date` value of this scope.
    pub fn timestamp(&self) -> String {
        format_iso8601(self.time)
    }

    /// Algorithm used for the request signature.
    pub fn algorithm(&self) -> &'static str {
        if self.region.is_region_set() {
            AWS4_ECDSA_P256_SHA256
        } else {
            AWS4_HMAC_SHA256
        }
    }

    /// Algorithm used for chunk signatures.
    pub fn chunk_algorithm(&self) -> &'static str {
        if self.region.is_region_set() {
            AWS4_ECDSA_P256_SHA256_PAYLOAD
        } else {
            AWS4_HMAC_SHA256_PAYLOAD
        }
    }

    /// Payload hash token announcing a chunk signed body.
    pub fn streaming_payload(&self) -> &'static str {
        if self.region.is_region_set() {
            STREAMING_AWS4_ECDSA_P256_SHA256_PAYLOAD
        } else {
            STREAMING_AWS4_HMAC_SHA256_PAYLOAD
        }
    }

    /// Build the string to sign for a canonical request.
    ///
    /// ```text
    /// AWS4-HMAC-SHA256
    /// 20150830T123600Z
    /// 20150830/us-east-1/iam/aws4_request
    /// <hex sha256 of canonical request>
    /// ```
    pub fn string_to_sign(&self, canonical_request: &str) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.algorithm(),
            self.timestamp(),
            self,
            hex_sha256(canonical_request.as_bytes())
        )
    }

    /// Build the string to sign for one chunk of a chunk signed body.
    pub fn chunk_string_to_sign(&self, previous_signature: &str, chunk: &[u8]) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.chunk_algorithm(),
            self.timestamp(),
            self,
            previous_signature,
            EMPTY_STRING_SHA256,
            hex_sha256(chunk)
        )
    }
}

impl Display for CredentialScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.region {
            SigningRegion::Region(region) => write!(
                f,
                "{}/{}/{}/{}",
                format_date(self.time),
                region,
                self.service,
                AWS4_REQUEST
            ),
            SigningRegion::RegionSet(_) => write!(
                f,
                "{}/{}/{}",
                format_date(self.time),
                self.service,
                AWS4_REQUEST
            ),
        }
    }
}
