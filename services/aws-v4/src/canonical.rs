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

//! Canonical request construction.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use awssig_core::{Result, SigningRequest};
use http::HeaderMap;
use percent_encoding::{percent_decode_str, percent_encode, utf8_percent_encode};

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, HEADERS_EXCLUDED_FROM_SIGNING};
use crate::SigningConfig;

/// CanonicalRequest is the normalized text form of a request that gets
/// hashed into the string to sign.
///
/// Built fresh for every signing operation, its `Display` output is the
/// exact byte sequence AWS recomputes on the server side:
///
/// ```text
/// <method>
/// <canonical uri>
/// <canonical query>
/// <name>:<value>      (one line per signed header)
///
/// <signed headers>
/// <payload hash>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    headers: Vec<(String, String)>,
    signed_headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Canonicalize `req` with the given payload hash token.
    ///
    /// Every header present on `req` is signed except the ones that are
    /// never signed (`authorization`, `user-agent`, ...). Callers are
    /// expected to have inserted `host`, `x-amz-date` and friends already.
    pub fn new(req: &SigningRequest, config: &SigningConfig, payload_hash: &str) -> Result<Self> {
        let headers = canonical_headers(&req.headers)?;
        let signed_headers = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        Ok(Self {
            method: req.method.as_str().to_uppercase(),
            uri: canonical_uri(&req.path, config.double_url_encode, config.normalize_uri_path),
            query: canonical_query(&req.query),
            headers,
            signed_headers,
            payload_hash: payload_hash.to_string(),
        })
    }

    /// The `;` joined list of signed header names.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// The canonical URI line.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The canonical query line.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The payload hash line.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Sorted, `;` joined names of the headers that will be signed.
pub(crate) fn signed_header_names(headers: &HeaderMap) -> String {
    let mut names: Vec<&str> = headers
        .keys()
        .map(|k| k.as_str())
        .filter(|k| !HEADERS_EXCLUDED_FROM_SIGNING.contains(k))
        .collect();
    names.sort_unstable();
    names.join(";")
}

/// Build the canonical URI from the path as it appears on the wire.
///
/// Every segment is percent decoded and encoded again with the AWS
/// UriEncode rules. With `double_encode` the wire form is encoded once
/// more instead, so `%20` becomes `%2520`.
pub(crate) fn canonical_uri(path: &str, double_encode: bool, normalize: bool) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    let path = if normalize {
        normalize_path(path)
    } else {
        path.to_string()
    };

    let mut out = String::with_capacity(path.len() * 2);
    for (i, seg) in path.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        if double_encode {
            out.extend(utf8_percent_encode(seg, &AWS_URI_ENCODE_SET));
        } else {
            let decoded: Vec<u8> = percent_decode_str(seg).collect();
            out.extend(percent_encode(&decoded, &AWS_URI_ENCODE_SET));
        }
    }
    if !out.starts_with('/') {
        out.insert(0, '/');
    }
    out
}

/// Remove `.` and `..` segments and empty segments, keeping a trailing
/// slash.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            seg => segments.push(seg),
        }
    }

    let mut out = String::with_capacity(path.len());
    for seg in &segments {
        out.push('/');
        out.push_str(seg);
    }
    if segments.is_empty() || path.ends_with('/') {
        out.push('/');
    }
    out
}

/// Build the canonical query from decoded pairs.
///
/// Pairs are encoded first and then sorted by key and value, empty values
/// are rendered as `key=`.
pub(crate) fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercased names with their normalized, comma joined values, sorted by
/// name.
fn canonical_headers(headers: &HeaderMap) -> Result<Vec<(String, String)>> {
    let mut out: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if HEADERS_EXCLUDED_FROM_SIGNING.contains(&name.as_str()) {
            continue;
        }
        out.entry(name.as_str())
            .or_default()
            .push(normalize_header_value(value.to_str()?));
    }

    Ok(out
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.join(",")))
        .collect())
}

/// Trim the value and collapse inner whitespace runs into one space.
fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
