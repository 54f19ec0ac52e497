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

use super::{identity, init_signing_test, signing_request, ACCESS_KEY_ID, SECRET_ACCESS_KEY};
use anyhow::Result;
use awssig_aws_v4::{verify_v4, Credential, CredentialScope, RequestSigner, SigningRegion};
use awssig_aws_v4::StaticCredentialProvider;
use awssig_core::{ErrorKind, SignableBody, Signer, SigningMethod};
use http::Request;
use pretty_assertions::assert_eq;
use std::time::Duration;

const SIGNING_TIME: i64 = 1440938160;

fn object_request() -> Request<()> {
    Request::get("https://examplebucket.s3.amazonaws.com/test.txt")
        .body(())
        .expect("request must be valid")
}

#[test]
fn test_expiration_bounds() -> Result<()> {
    let ctx = init_signing_test(SIGNING_TIME);
    let signer = RequestSigner::new("s3", "us-east-1");
    let req = signing_request(object_request(), SignableBody::Empty);

    for secs in [0, 604801] {
        let err = signer
            .sign(
                &ctx,
                &req,
                &identity(),
                SigningMethod::Query(Duration::from_secs(secs)),
            )
            .expect_err("expiration out of range must fail");
        assert_eq!(err.kind(), ErrorKind::UnsupportedSigningConfiguration);
    }

    // The upper bound itself is accepted.
    signer.sign(
        &ctx,
        &req,
        &identity(),
        SigningMethod::Query(Duration::from_secs(604800)),
    )?;
    Ok(())
}

#[test]
fn test_presigned_url() -> Result<()> {
    let ctx = init_signing_test(SIGNING_TIME);
    let req = signing_request(object_request(), SignableBody::Empty);

    let signed = RequestSigner::new("s3", "us-east-1").sign(
        &ctx,
        &req,
        &identity(),
        SigningMethod::Query(Duration::from_secs(900)),
    )?;

    let uri = signed.request.uri()?.to_string();
    assert!(uri.starts_with("https://examplebucket.s3.amazonaws.com/test.txt?"));
    assert!(uri.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
    assert!(uri.contains(
        "X-Amz-Credential=AKIDEXAMPLE%2F20150830%2Fus-east-1%2Fs3%2Faws4_request"
    ));
    assert!(uri.contains("X-Amz-Date=20150830T123600Z"));
    assert!(uri.contains("X-Amz-Expires=900"));
    assert!(uri.contains("X-Amz-SignedHeaders=host"));
    assert!(uri.contains(&format!("X-Amz-Signature={}", signed.signature)));
    assert!(!signed.request.headers.contains_key("authorization"));
    assert!(!signed.request.headers.contains_key("x-amz-date"));
    assert_eq!(signed.canonical_request.payload_hash(), "UNSIGNED-PAYLOAD");

    let scope = CredentialScope::new(
        ctx.now(),
        SigningRegion::Region("us-east-1".to_string()),
        "s3",
    )?;
    assert!(verify_v4(
        &signed.canonical_request.to_string(),
        &scope,
        SECRET_ACCESS_KEY,
        &signed.signature
    )?);
    Ok(())
}

#[test]
fn test_presigned_url_with_session_token() -> Result<()> {
    let ctx = init_signing_test(SIGNING_TIME);
    let req = signing_request(object_request(), SignableBody::Empty);
    let identity = Credential::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY)
        .with_session_token("security_token")
        .into();

    let signed = RequestSigner::new("s3", "us-east-1").sign(
        &ctx,
        &req,
        &identity,
        SigningMethod::Query(Duration::from_secs(3600)),
    )?;

    assert_eq!(
        signed.request.query_get("X-Amz-Security-Token"),
        Some("security_token")
    );
    // The token is part of the signed query.
    assert!(signed
        .canonical_request
        .query()
        .contains("X-Amz-Security-Token=security_token"));
    assert!(!signed.request.headers.contains_key("x-amz-security-token"));
    Ok(())
}

#[test]
fn test_presign_keeps_existing_query() -> Result<()> {
    let ctx = init_signing_test(SIGNING_TIME);
    let req = signing_request(
        Request::get("https://examplebucket.s3.amazonaws.com/test.txt?versionId=a%20b&acl")
            .body(())
            .expect("request must be valid"),
        SignableBody::Empty,
    );

    let signed = RequestSigner::new("s3", "us-east-1").sign(
        &ctx,
        &req,
        &identity(),
        SigningMethod::Query(Duration::from_secs(60)),
    )?;

    let query = signed.canonical_request.query();
    assert!(query.starts_with("X-Amz-Algorithm=AWS4-HMAC-SHA256&"));
    assert!(query.ends_with("&acl=&versionId=a%20b"));
    Ok(())
}

#[tokio::test]
async fn test_presign_through_signer() -> Result<()> {
    let ctx = init_signing_test(SIGNING_TIME);
    let signer = Signer::new(
        ctx,
        StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY),
        RequestSigner::new("s3", "us-east-1"),
    );

    let (mut parts, _) = object_request().into_parts();
    signer
        .sign(
            &mut parts,
            SignableBody::Unsigned,
            SigningMethod::Query(Duration::from_secs(3600)),
        )
        .await?;

    let query = parts.uri.query().expect("presigned url must have query");
    assert!(query.contains("X-Amz-Expires=3600"));
    assert!(query.contains("X-Amz-Signature="));
    assert_eq!(parts.headers["host"], "examplebucket.s3.amazonaws.com");
    Ok(())
}
