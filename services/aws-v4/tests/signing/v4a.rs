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

use super::{identity, init_signing_test, signing_request, PUBLIC_KEY_X, PUBLIC_KEY_Y};
use super::{ACCESS_KEY_ID, SECRET_ACCESS_KEY};
use anyhow::Result;
use awssig_aws_v4::{
    verify_v4a, verifying_key_from_coordinates, Credential, CredentialScope, EcdsaCredential,
    RequestSigner, SigningConfig, SigningRegion,
};
use awssig_core::{SignableBody, SigningMethod};
use bytes::Bytes;
use http::Request;
use pretty_assertions::assert_eq;
use std::time::Duration;

const HEADER_SIGNING_TIME: i64 = 1596476903;
const QUERY_SIGNING_TIME: i64 = 1596476801;

fn header_request() -> Request<()> {
    Request::post("https://demo.us-east-1.amazonaws.com/")
        .header("Host", "demo.us-east-1.amazonaws.com")
        .header("x-amz-archive-description", "test  test")
        .body(())
        .expect("request must be valid")
}

fn query_request() -> Request<()> {
    Request::get("http://testing.us-east-1.amazonaws.com/test%20path/help")
        .header("Host", "testing.us-east-1.amazonaws.com")
        .body(())
        .expect("request must be valid")
}

fn verify(canonical_request: &str, time: i64, service: &str, signature: &str) -> Result<bool> {
    let ctx = init_signing_test(time);
    let scope = CredentialScope::new(
        ctx.now(),
        SigningRegion::RegionSet("aws-global".to_string()),
        service,
    )?;
    let public_key = verifying_key_from_coordinates(PUBLIC_KEY_X, PUBLIC_KEY_Y)?;
    Ok(verify_v4a(canonical_request, &scope, &public_key, signature)?)
}

#[test]
fn test_derived_public_key() -> Result<()> {
    let cred = EcdsaCredential::derive(&Credential::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY))?;
    let expected = verifying_key_from_coordinates(PUBLIC_KEY_X, PUBLIC_KEY_Y)?;
    assert_eq!(cred.verifying_key(), &expected);
    Ok(())
}

#[test]
fn test_header_signing() -> Result<()> {
    let ctx = init_signing_test(HEADER_SIGNING_TIME);
    let req = signing_request(
        header_request(),
        SignableBody::Bytes(Bytes::from_static(br#"{"TableName": "foo"}"#)),
    );

    let signed = RequestSigner::new_v4a("demo", "aws-global").sign(
        &ctx,
        &req,
        &identity(),
        SigningMethod::Header,
    )?;

    let expected = "POST\n/\n\nhost:demo.us-east-1.amazonaws.com\nx-amz-archive-description:test test\nx-amz-date:20200803T174823Z\nx-amz-region-set:aws-global\n\nhost;x-amz-archive-description;x-amz-date;x-amz-region-set\na15c8292b1d12abbbbe4148605f7872fbdf645618fee5ab0e8072a7b34f155e2";
    assert_eq!(signed.canonical_request.to_string(), expected);

    let authorization = signed.request.headers["authorization"].to_str()?;
    let signature = authorization
        .split("Signature=")
        .nth(1)
        .expect("authorization must carry a signature");
    assert_eq!(signature, signed.signature);
    assert!(verify(expected, HEADER_SIGNING_TIME, "demo", signature)?);
    Ok(())
}

#[test]
fn test_query_signing() -> Result<()> {
    let ctx = init_signing_test(QUERY_SIGNING_TIME);
    let req = signing_request(query_request(), SignableBody::Empty);

    let signed = RequestSigner::new_v4a("testing", "aws-global").sign(
        &ctx,
        &req,
        &identity(),
        SigningMethod::Query(Duration::from_secs(604800)),
    )?;

    let expected = "GET\n/test%2520path/help\nX-Amz-Algorithm=AWS4-ECDSA-P256-SHA256&X-Amz-Credential=AKIDEXAMPLE%2F20200803%2Ftesting%2Faws4_request&X-Amz-Date=20200803T174641Z&X-Amz-Expires=604800&X-Amz-Region-Set=aws-global&X-Amz-SignedHeaders=host\nhost:testing.us-east-1.amazonaws.com\n\nhost\ne3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    assert_eq!(signed.canonical_request.to_string(), expected);

    let signature = signed
        .request
        .query_get("X-Amz-Signature")
        .expect("presigned request must carry a signature");
    assert!(verify(expected, QUERY_SIGNING_TIME, "testing", signature)?);
    assert!(!signed.request.headers.contains_key("authorization"));
    Ok(())
}

#[test]
fn test_s3_presigning() -> Result<()> {
    let ctx = init_signing_test(QUERY_SIGNING_TIME);
    let req = signing_request(query_request(), SignableBody::Empty);

    let signed = RequestSigner::new_v4a("testing", "aws-global")
        .with_config(SigningConfig::s3().with_double_url_encode(true))
        .sign(
            &ctx,
            &req,
            &identity(),
            SigningMethod::Query(Duration::from_secs(604800)),
        )?;

    let expected = "GET\n/test%2520path/help\nX-Amz-Algorithm=AWS4-ECDSA-P256-SHA256&X-Amz-Credential=AKIDEXAMPLE%2F20200803%2Ftesting%2Faws4_request&X-Amz-Date=20200803T174641Z&X-Amz-Expires=604800&X-Amz-Region-Set=aws-global&X-Amz-SignedHeaders=host\nhost:testing.us-east-1.amazonaws.com\n\nhost\nUNSIGNED-PAYLOAD";
    assert_eq!(signed.canonical_request.to_string(), expected);
    // Presigned S3 requests never carry the body hash header.
    assert!(!signed.request.headers.contains_key("x-amz-content-sha256"));

    assert!(verify(expected, QUERY_SIGNING_TIME, "testing", &signed.signature)?);
    Ok(())
}

#[test]
fn test_s3_header_signing_policy() -> Result<()> {
    let ctx = init_signing_test(HEADER_SIGNING_TIME);
    let body = SignableBody::Bytes(Bytes::from_static(br#"{"TableName": "foo"}"#));

    // Explicitly enabled: the digest is signed and exposed.
    let signed = RequestSigner::new_v4a("demo", "aws-global")
        .with_config(SigningConfig::s3().with_payload_signing(true))
        .sign(
            &ctx,
            &signing_request(header_request(), body.clone()),
            &identity(),
            SigningMethod::Header,
        )?;
    assert_eq!(
        signed.request.headers["x-amz-content-sha256"],
        "a15c8292b1d12abbbbe4148605f7872fbdf645618fee5ab0e8072a7b34f155e2"
    );

    // Disabled or left unset over https: the header is still there, unsigned.
    for config in [
        SigningConfig::s3().with_payload_signing(false),
        SigningConfig::s3(),
    ] {
        let signed = RequestSigner::new_v4a("demo", "aws-global")
            .with_config(config)
            .sign(
                &ctx,
                &signing_request(header_request(), body.clone()),
                &identity(),
                SigningMethod::Header,
            )?;
        assert_eq!(signed.request.headers["x-amz-content-sha256"], "UNSIGNED-PAYLOAD");
        assert_eq!(signed.canonical_request.payload_hash(), "UNSIGNED-PAYLOAD");
    }
    Ok(())
}

#[test]
fn test_asymmetric_identity() -> Result<()> {
    let ctx = init_signing_test(HEADER_SIGNING_TIME);
    let cred = EcdsaCredential::derive(&Credential::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY))?;
    let req = signing_request(header_request(), SignableBody::Empty);

    let from_secret = RequestSigner::new_v4a("demo", "aws-global").sign(
        &ctx,
        &req,
        &identity(),
        SigningMethod::Header,
    )?;
    let from_key = RequestSigner::new_v4a("demo", "aws-global").sign(
        &ctx,
        &req,
        &cred.into(),
        SigningMethod::Header,
    )?;

    // Same key and RFC 6979 nonces give the same signature.
    assert_eq!(from_secret.signature, from_key.signature);
    Ok(())
}
