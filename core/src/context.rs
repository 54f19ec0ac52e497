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

use crate::time::{self, DateTime};
use std::fmt::Debug;
use std::sync::Arc;

/// Context provides the environment for the request signing.
///
/// The only external dependency of a signing operation is the clock, so the
/// context carries nothing else. Tests replace it with a [`FixedClock`] to get
/// deterministic output.
///
/// ## Example
///
/// ```
/// use awssig_core::{Context, FixedClock};
/// use awssig_core::time::from_timestamp;
///
/// let ctx = Context::new().with_clock(FixedClock::new(from_timestamp(1596476903).unwrap()));
/// assert_eq!(ctx.now().timestamp(), 1596476903);
/// ```
#[derive(Clone)]
pub struct Context {
    clock: Arc<dyn Clock>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context backed by the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock implementation.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Current time, truncated to whole seconds.
    #[inline]
    pub fn now(&self) -> DateTime {
        self.clock.now()
    }
}

/// Clock is the time source used to stamp signatures.
pub trait Clock: Debug + Send + Sync + 'static {
    /// Return the current time in UTC with second precision.
    fn now(&self) -> DateTime;
}

/// SystemClock reads the wall clock of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        time::now()
    }
}

/// FixedClock always returns the same instant.
///
/// This is useful for testing or for reproducing a signature.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime);

impl FixedClock {
    /// Create a clock frozen at `time`.
    pub fn new(time: DateTime) -> Self {
        Self(time)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}
