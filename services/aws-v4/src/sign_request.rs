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

use crate::canonical::{signed_header_names, CanonicalRequest};
use crate::chunked::{encoded_content_length, ChunkSigner};
use crate::constants::{
    AWS_CHUNKED, MAX_PRESIGN_EXPIRATION_SECONDS, MIN_CHUNK_SIZE, UNSIGNED_PAYLOAD, X_AMZ_ALGORITHM_QUERY,
    X_AMZ_CONTENT_SHA_256, X_AMZ_CREDENTIAL_QUERY, X_AMZ_DATE, X_AMZ_DATE_QUERY,
    X_AMZ_DECODED_CONTENT_LENGTH, X_AMZ_EXPIRES_QUERY, X_AMZ_REGION_SET, X_AMZ_REGION_SET_QUERY,
    X_AMZ_SECURITY_TOKEN, X_AMZ_SECURITY_TOKEN_QUERY, X_AMZ_SIGNATURE_QUERY,
    X_AMZ_SIGNED_HEADERS_QUERY,
};
use crate::scope::{CredentialScope, SigningRegion};
use crate::signature::SigningKey;
use crate::{BodyHeaderPolicy, SigningConfig, SigningIdentity};
use awssig_core::hash::{hex_sha256, EMPTY_STRING_SHA256};
use awssig_core::time::DateTime;
use awssig_core::{
    Context, Error, Result, SignRequest, SignableBody, SigningMethod, SigningRequest,
};
use http::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_LENGTH, HOST};
use http::HeaderValue;
use log::debug;

/// RequestSigner that implement AWS SigV4 and SigV4A.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
/// - [Signature Version 4A](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html)
///
/// A `RequestSigner` holds no per request state and can be shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: SigningRegion,
    config: SigningConfig,
}

impl RequestSigner {
    /// Create a new SigV4 signer for a single region.
    ///
    /// S3 gets [`SigningConfig::s3`], every other service
    /// [`SigningConfig::default`].
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: SigningRegion::Region(region.into()),
            config: default_config(service),
        }
    }

    /// Create a new SigV4A signer for a region set such as `*`.
    pub fn new_v4a(service: &str, region_set: &str) -> Self {
        Self {
            service: service.into(),
            region: SigningRegion::RegionSet(region_set.into()),
            config: default_config(service),
        }
    }

    /// Replace the signing options.
    pub fn with_config(mut self, config: SigningConfig) -> Self {
        self.config = config;
        self
    }

    /// Current signing options.
    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Sign `req` with `identity` and return the signed copy.
    ///
    /// `req` itself is never modified. Errors that do not depend on key
    /// material (scope, expiration, unsupported option combinations) are
    /// reported before any hashing happens.
    pub fn sign(
        &self,
        ctx: &Context,
        req: &SigningRequest,
        identity: &SigningIdentity,
        method: SigningMethod,
    ) -> Result<SignedRequest> {
        let now = ctx.now();
        let scope = CredentialScope::new(now, self.region.clone(), &self.service)?;
        let expires = expiration_seconds(method, now)?;
        let payload = self.resolve_payload(req, method)?;

        let key = SigningKey::resolve(identity, &scope)?;

        let mut signed = req.clone();
        if !signed.headers.contains_key(HOST) {
            signed
                .headers
                .insert(HOST, HeaderValue::from_str(signed.authority.as_str())?);
        }

        let payload_hash = match &payload {
            Payload::Hash(hash) => hash.clone(),
            Payload::Unsigned => UNSIGNED_PAYLOAD.to_string(),
            Payload::Chunked { .. } => scope.streaming_payload().to_string(),
        };
        debug!("resolved payload hash: {payload_hash}");

        match expires {
            None => self.prepare_headers(&mut signed, &scope, identity, &payload, &payload_hash)?,
            Some(expires) => self.prepare_query(&mut signed, &scope, identity, expires),
        }

        // build canonical request and string to sign.
        let creq = CanonicalRequest::new(&signed, &self.config, &payload_hash)?;
        let creq_string = creq.to_string();
        debug!("calculated canonical request: {creq_string}");
        debug!("calculated scope: {scope}");

        let string_to_sign = scope.string_to_sign(&creq_string);
        debug!("calculated string to sign: {string_to_sign}");

        let signature = key.sign(&string_to_sign)?;

        if expires.is_some() {
            signed.query_push(X_AMZ_SIGNATURE_QUERY, signature.clone());
        } else {
            let mut authorization = HeaderValue::from_str(&format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                scope.algorithm(),
                identity.access_key_id(),
                scope,
                creq.signed_headers(),
                signature
            ))?;
            authorization.set_sensitive(true);
            signed.headers.insert(AUTHORIZATION, authorization);
        }

        let chunk_signer = match payload {
            Payload::Chunked { chunk_size, .. } => Some(ChunkSigner::new(
                scope,
                key,
                signature.clone(),
                chunk_size,
            )),
            _ => None,
        };

        Ok(SignedRequest {
            request: signed,
            signature,
            canonical_request: creq,
            chunk_signer,
        })
    }

    /// Decide which payload hash token goes into the canonical request.
    fn resolve_payload(&self, req: &SigningRequest, method: SigningMethod) -> Result<Payload> {
        let sign_payload = match self.config.payload_signing_enabled {
            Some(v) => v,
            // S3 skips hashing over TLS unless asked to.
            None if self.config.s3 => req.scheme != http::uri::Scheme::HTTPS,
            None => true,
        };

        if matches!(req.body, SignableBody::Unsigned) {
            return Ok(Payload::Unsigned);
        }
        // Presigned S3 URLs never cover the payload.
        if self.config.s3 && method.is_query() {
            return Ok(Payload::Unsigned);
        }

        if let SignableBody::Streaming { decoded_length } = req.body {
            if !self.config.chunked_encoding_enabled {
                if self.config.payload_signing_enabled == Some(true) {
                    return Err(Error::unsupported_config(
                        "payload signing requires chunked encoding for streaming bodies",
                    ));
                }
                return Ok(Payload::Unsigned);
            }
            if method.is_query() {
                return Err(Error::unsupported_config(
                    "chunked signing is not supported for presigned requests",
                ));
            }
            if !sign_payload {
                return Ok(Payload::Unsigned);
            }
            if self.config.chunk_size < MIN_CHUNK_SIZE {
                return Err(Error::unsupported_config(format!(
                    "chunk size must be at least {MIN_CHUNK_SIZE} bytes, got {}",
                    self.config.chunk_size
                )));
            }
            return Ok(Payload::Chunked {
                decoded_length,
                chunk_size: self.config.chunk_size,
            });
        }

        if !sign_payload {
            return Ok(Payload::Unsigned);
        }

        Ok(match &req.body {
            SignableBody::Empty => Payload::Hash(EMPTY_STRING_SHA256.to_string()),
            SignableBody::Bytes(bs) => Payload::Hash(hex_sha256(bs)),
            SignableBody::Precomputed(hash) => Payload::Hash(hash.clone()),
            SignableBody::Streaming { .. } | SignableBody::Unsigned => Payload::Unsigned,
        })
    }

    fn prepare_headers(
        &self,
        req: &mut SigningRequest,
        scope: &CredentialScope,
        identity: &SigningIdentity,
        payload: &Payload,
        payload_hash: &str,
    ) -> Result<()> {
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::from_str(&scope.timestamp())?);

        if let SigningRegion::RegionSet(region_set) = scope.region() {
            req.headers
                .insert(X_AMZ_REGION_SET, HeaderValue::from_str(region_set)?);
        }

        if let Some(token) = identity.session_token() {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to valid leaking.
            value.set_sensitive(true);
            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        if let Payload::Chunked {
            decoded_length,
            chunk_size,
        } = payload
        {
            let encoding = match req.headers.get(CONTENT_ENCODING) {
                None => AWS_CHUNKED.to_string(),
                Some(v) => {
                    let v = v.to_str()?;
                    if v.split(',').any(|e| e.trim() == AWS_CHUNKED) {
                        v.to_string()
                    } else {
                        format!("{AWS_CHUNKED},{v}")
                    }
                }
            };
            req.headers
                .insert(CONTENT_ENCODING, HeaderValue::from_str(&encoding)?);

            if let Some(decoded_length) = decoded_length {
                req.headers.insert(
                    X_AMZ_DECODED_CONTENT_LENGTH,
                    HeaderValue::from(*decoded_length),
                );
                let signature_len = if scope.region().is_region_set() {
                    128
                } else {
                    64
                };
                req.headers.insert(
                    CONTENT_LENGTH,
                    HeaderValue::from(encoded_content_length(
                        *decoded_length,
                        *chunk_size,
                        signature_len,
                    )),
                );
            }
        }

        let chunked = matches!(payload, Payload::Chunked { .. });
        if chunked || self.config.body_header_policy == BodyHeaderPolicy::AddHeaderIfSigned {
            req.headers
                .insert(X_AMZ_CONTENT_SHA_256, HeaderValue::from_str(payload_hash)?);
        }

        Ok(())
    }

    fn prepare_query(
        &self,
        req: &mut SigningRequest,
        scope: &CredentialScope,
        identity: &SigningIdentity,
        expires: u64,
    ) {
        let signed_headers = signed_header_names(&req.headers);

        req.query_push(X_AMZ_ALGORITHM_QUERY, scope.algorithm());
        req.query_push(
            X_AMZ_CREDENTIAL_QUERY,
            format!("{}/{}", identity.access_key_id(), scope),
        );
        req.query_push(X_AMZ_DATE_QUERY, scope.timestamp());
        req.query_push(X_AMZ_EXPIRES_QUERY, expires.to_string());
        req.query_push(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers);
        if let SigningRegion::RegionSet(region_set) = scope.region() {
            req.query_push(X_AMZ_REGION_SET_QUERY, region_set.as_str());
        }
        if let Some(token) = identity.session_token() {
            req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token);
        }
    }
}

impl SignRequest for RequestSigner {
    type Credential = SigningIdentity;

    fn sign_request(
        &self,
        ctx: &Context,
        req: &SigningRequest,
        credential: Option<&Self::Credential>,
        method: SigningMethod,
    ) -> Result<SigningRequest> {
        let Some(identity) = credential else {
            return Ok(req.clone());
        };

        Ok(self.sign(ctx, req, identity, method)?.request)
    }
}

/// SignedRequest is the result of a successful signing operation.
#[derive(Debug)]
pub struct SignedRequest {
    /// The request with signing headers or query parameters added.
    pub request: SigningRequest,
    /// The request signature, also the seed of a chunk signature chain.
    pub signature: String,
    /// The canonical request that was signed.
    pub canonical_request: CanonicalRequest,

    chunk_signer: Option<ChunkSigner>,
}

impl SignedRequest {
    /// Take the chunk signer for a chunk signed body.
    ///
    /// Returns `None` unless the body was [`SignableBody::Streaming`] and
    /// chunked signing was applied.
    pub fn take_chunk_signer(&mut self) -> Option<ChunkSigner> {
        self.chunk_signer.take()
    }
}

/// Resolved payload handling for one signing operation.
enum Payload {
    Hash(String),
    Unsigned,
    Chunked {
        decoded_length: Option<u64>,
        chunk_size: usize,
    },
}

fn default_config(service: &str) -> SigningConfig {
    if service == "s3" {
        SigningConfig::s3()
    } else {
        SigningConfig::default()
    }
}

/// Validate the presign lifetime, `None` for header signing.
fn expiration_seconds(method: SigningMethod, now: DateTime) -> Result<Option<u64>> {
    let secs = match method {
        SigningMethod::Header => return Ok(None),
        SigningMethod::Query(d) => d.as_secs() as i64,
        SigningMethod::QueryUntil(t) => (t - now).num_seconds(),
    };

    if secs < 1 || secs as u64 > MAX_PRESIGN_EXPIRATION_SECONDS {
        return Err(Error::unsupported_config(format!(
            "expiration must be between 1 and {MAX_PRESIGN_EXPIRATION_SECONDS} seconds, got {secs}"
        )));
    }
    Ok(Some(secs as u64))
}
