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

//! Core components for signing AWS API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! signers in this workspace.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds the clock used to stamp signatures
//! - **SigningRequest**: An owned snapshot of the request to sign, including
//!   how its payload takes part in the signature ([`SignableBody`])
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: The orchestrator that coordinates credential loading and request signing
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use awssig_core::{Context, ProvideCredential, Result, SignRequest, SigningCredential};
//! use awssig_core::{SignableBody, Signer, SigningMethod, SigningRequest};
//!
//! #[derive(Clone, Debug)]
//! struct Token(String);
//!
//! impl SigningCredential for Token {
//!     fn is_valid(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct StaticToken;
//!
//! #[async_trait]
//! impl ProvideCredential for StaticToken {
//!     type Credential = Token;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
//!         Ok(Some(Token("my-token".to_string())))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct BearerSigner;
//!
//! impl SignRequest for BearerSigner {
//!     type Credential = Token;
//!
//!     fn sign_request(
//!         &self,
//!         _: &Context,
//!         req: &SigningRequest,
//!         token: Option<&Token>,
//!         _: SigningMethod,
//!     ) -> Result<SigningRequest> {
//!         let mut req = req.clone();
//!         if let Some(token) = token {
//!             let value = format!("Bearer {}", token.0);
//!             req.headers.insert(http::header::AUTHORIZATION, value.parse()?);
//!         }
//!         Ok(req)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), StaticToken, BearerSigner);
//!
//! let (mut parts, _) = http::Request::get("https://example.com")
//!     .body(())?
//!     .into_parts();
//! signer.sign(&mut parts, SignableBody::Empty, SigningMethod::Header).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Clock, Context, FixedClock, SystemClock};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::{SignableBody, SigningMethod, SigningRequest};
mod signer;
pub use signer::Signer;
