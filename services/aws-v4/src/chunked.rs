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

//! Chunk signed upload bodies.
//!
//! - [Signature calculations for the Authorization header: Transferring payload in multiple chunks](https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-streaming.html)

use std::fmt::{Debug, Formatter};
use std::io::{ErrorKind as IoErrorKind, Read};

use awssig_core::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;

use crate::constants::MIN_CHUNK_SIZE;
use crate::scope::CredentialScope;
use crate::signature::SigningKey;

const CHUNK_SIGNATURE: &str = ";chunk-signature=";
const CRLF: &[u8] = b"\r\n";

/// ChunkSigner carries the signature chain of one chunk signed body.
///
/// Every chunk signature covers the previous one, starting from the seed
/// signature of the request itself. Chunks must therefore be signed in the
/// order they are sent, and the chain ends with the zero length chunk.
#[derive(Clone)]
pub struct ChunkSigner {
    scope: CredentialScope,
    key: SigningKey,
    previous_signature: String,
    chunk_size: usize,
    finished: bool,
}

impl Debug for ChunkSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSigner")
            .field("scope", &self.scope.to_string())
            .field("previous_signature", &self.previous_signature)
            .field("chunk_size", &self.chunk_size)
            .field("finished", &self.finished)
            .finish()
    }
}

impl ChunkSigner {
    pub(crate) fn new(
        scope: CredentialScope,
        key: SigningKey,
        seed_signature: String,
        chunk_size: usize,
    ) -> Self {
        Self {
            scope,
            key,
            previous_signature: seed_signature,
            chunk_size,
            finished: false,
        }
    }

    /// The last signature of the chain, the seed signature before any chunk
    /// has been signed.
    pub fn previous_signature(&self) -> &str {
        &self.previous_signature
    }

    /// Maximum size of a chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns true once the zero length chunk has been signed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Sign the next chunk and advance the chain.
    ///
    /// An empty chunk terminates the chain, no chunk can be signed after it.
    pub fn sign_chunk(&mut self, chunk: &[u8]) -> Result<String> {
        if self.finished {
            return Err(Error::unexpected(
                "chunk signature chain is already terminated",
            ));
        }

        let string_to_sign = self
            .scope
            .chunk_string_to_sign(&self.previous_signature, chunk);
        let signature = self.key.sign(&string_to_sign)?;
        debug!("signed chunk of {} bytes: {signature}", chunk.len());

        self.previous_signature.clone_from(&signature);
        if chunk.is_empty() {
            self.finished = true;
        }
        Ok(signature)
    }

    /// Sign the next chunk and frame it for the wire:
    /// `<hex-len>;chunk-signature=<signature>\r\n<data>\r\n`.
    pub fn frame_chunk(&mut self, chunk: &[u8]) -> Result<Bytes> {
        let signature = self.sign_chunk(chunk)?;
        let header = format!("{:x}{CHUNK_SIGNATURE}{signature}", chunk.len());

        let mut buf = BytesMut::with_capacity(header.len() + chunk.len() + 2 * CRLF.len());
        buf.put_slice(header.as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(chunk);
        buf.put_slice(CRLF);
        Ok(buf.freeze())
    }

    /// Wrap a reader into a stream of framed chunks.
    pub fn wrap<R: Read>(self, reader: R) -> ChunkedBody<R> {
        ChunkedBody {
            buf: vec![0; self.chunk_size],
            signer: self,
            reader,
            done: false,
        }
    }
}

/// ChunkedBody turns a reader into framed, signed chunks.
///
/// It yields every full chunk, a trailing partial chunk and finally the zero
/// length chunk, then stops. It can not be restarted.
pub struct ChunkedBody<R> {
    signer: ChunkSigner,
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> ChunkedBody<R> {
    /// Read up to one chunk, retrying on interrupts.
    fn fill(&mut self) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for ChunkedBody<R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let n = match self.fill() {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(Error::from(e)));
            }
        };
        if n == 0 {
            self.done = true;
        }

        let framed = self.signer.frame_chunk(&self.buf[..n]);
        if framed.is_err() {
            self.done = true;
        }
        Some(framed)
    }
}

/// Length of a chunk signed body on the wire.
///
/// `signature_len` is the length of one hex signature: 64 for SigV4, 128
/// for SigV4A. `chunk_size` is raised to the 8 KiB minimum if smaller.
pub fn encoded_content_length(decoded_length: u64, chunk_size: usize, signature_len: usize) -> u64 {
    let chunk_size = chunk_size.max(MIN_CHUNK_SIZE) as u64;
    let framed = |len: u64| -> u64 {
        let hex_len = format!("{len:x}").len() as u64;
        hex_len + (CHUNK_SIGNATURE.len() + signature_len + 2 * CRLF.len()) as u64 + len
    };

    let full = decoded_length / chunk_size;
    let rest = decoded_length % chunk_size;
    let mut total = full * framed(chunk_size) + framed(0);
    if rest > 0 {
        total += framed(rest);
    }
    total
}
