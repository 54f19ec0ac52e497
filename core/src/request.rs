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

use std::mem;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::time::DateTime;
use crate::{Error, Result};

/// Characters left untouched when writing query pairs back into a URI.
///
/// Everything except the RFC 3986 unreserved set is percent encoded.
static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signing context for request.
///
/// A `SigningRequest` is an owned snapshot of the request to sign. Signers
/// never modify the snapshot they are given: they clone it, add their
/// headers or query parameters to the copy and return the copy.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as it appears on the wire (percent encoded).
    pub path: String,
    /// HTTP query parameters, percent decoded, in request order.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// How the payload takes part in the signature.
    pub body: SignableBody,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    ///
    /// The parts are left untouched; use [`SigningRequest::apply`] to write
    /// the signed result back.
    pub fn build(parts: &http::request::Parts) -> Result<Self> {
        let uri = &parts.uri;
        let authority = uri.authority().cloned().ok_or_else(|| {
            Error::invalid_request("request without authority is invalid for signing")
        })?;

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority,
            path: uri.path().to_string(),
            query: uri
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            headers: parts.headers.clone(),
            body: SignableBody::Empty,
        })
    }

    /// Attach the payload accessor to this request.
    pub fn with_body(mut self, body: SignableBody) -> Self {
        self.body = body;
        self
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let uri = self.uri()?;

        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = uri;

        Ok(())
    }

    /// Build the fully qualified URI of this request.
    ///
    /// For presigned requests this is the URL handed out to clients.
    pub fn uri(&self) -> Result<Uri> {
        let paq = {
            let path = if self.path.is_empty() { "/" } else { &self.path };
            if self.query.is_empty() {
                path.to_string()
            } else {
                let mut s = String::with_capacity(path.len() + self.query_size() + 1);
                s.push_str(path);
                s.push('?');
                s.push_str(&self.query_to_uri_string());
                s
            }
        };

        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(PathAndQuery::from_str(&paq)?)
            .build()?;
        Ok(uri)
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Get the first query value by key.
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render query pairs for a URI, percent encoding keys and values.
    fn query_to_uri_string(&self) -> String {
        let mut s = String::with_capacity(self.query_size() * 2);
        for (i, (k, v)) in self.query.iter().enumerate() {
            if i > 0 {
                s.push('&');
            }

            s.extend(utf8_percent_encode(k, &QUERY_ENCODE_SET));
            if !v.is_empty() {
                s.push('=');
                s.extend(utf8_percent_encode(v, &QUERY_ENCODE_SET));
            }
        }
        s
    }
}

/// SignableBody describes how the request payload takes part in signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SignableBody {
    /// The request has no body.
    #[default]
    Empty,
    /// The complete body is available in memory and will be hashed.
    Bytes(Bytes),
    /// The caller already computed the lowercase hex SHA-256 of the body.
    Precomputed(String),
    /// The body is streamed and will be signed chunk by chunk.
    ///
    /// `decoded_length` is the length of the raw payload before chunk
    /// framing, if known.
    Streaming {
        /// Length of the payload before chunk framing.
        decoded_length: Option<u64>,
    },
    /// The body is explicitly excluded from the signature.
    Unsigned,
}

impl From<Bytes> for SignableBody {
    fn from(value: Bytes) -> Self {
        SignableBody::Bytes(value)
    }
}

impl From<&'static [u8]> for SignableBody {
    fn from(value: &'static [u8]) -> Self {
        SignableBody::Bytes(Bytes::from_static(value))
    }
}

impl From<&'static str> for SignableBody {
    fn from(value: &'static str) -> Self {
        SignableBody::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

/// SigningMethod is the method that used in signing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query, valid for the given duration after signing.
    Query(Duration),
    /// Signing with query, valid until the given instant.
    QueryUntil(DateTime),
}

impl SigningMethod {
    /// Returns true if the signature is carried in the query string.
    pub fn is_query(&self) -> bool {
        !matches!(self, SigningMethod::Header)
    }
}
