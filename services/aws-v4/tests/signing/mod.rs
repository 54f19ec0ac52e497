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

mod chunked;
mod presigned;
mod v4a;

use awssig_aws_v4::{Credential, SigningIdentity};
use awssig_core::time::from_timestamp;
use awssig_core::{Context, FixedClock, SignableBody, SigningRequest};
use http::Request;

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

/// Public key derived from [`ACCESS_KEY_ID`] and [`SECRET_ACCESS_KEY`].
pub const PUBLIC_KEY_X: &str = "b6618f6a65740a99e650b33b6b4b5bd0d43b176d721a3edfea7e7d2d56d936b1";
pub const PUBLIC_KEY_Y: &str = "865ed22a7eadc9c5cb9d2cbaca1b3699139fedc5043dc6661864218330c8e518";

/// Initialize test environment with a clock frozen at `secs`.
pub fn init_signing_test(secs: i64) -> Context {
    let _ = env_logger::builder().is_test(true).try_init();

    Context::new().with_clock(FixedClock::new(
        from_timestamp(secs).expect("timestamp must be valid"),
    ))
}

pub fn identity() -> SigningIdentity {
    Credential::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY).into()
}

/// Build the signing snapshot of an http request.
pub fn signing_request<T>(req: Request<T>, body: SignableBody) -> SigningRequest {
    let (parts, _) = req.into_parts();
    SigningRequest::build(&parts)
        .expect("request must be signable")
        .with_body(body)
}
