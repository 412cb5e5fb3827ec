//! Shared test doubles: a recording transport, deterministic clocks, and a
//! counting token minter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::{Clock, ConfigurationError, MintedToken, TokenMinter};
use crate::transport::{BoxFuture, HttpTransport, TransportFailure, WireRequest, WireResponse};

#[derive(Clone)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

struct FakeTransportState {
    requests: Vec<WireRequest>,
    response_status: u16,
    response_body: Vec<u8>,
}

impl FakeTransport {
    pub(crate) fn new(response_status: u16, response_body: impl Into<Vec<u8>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                requests: Vec::new(),
                response_status,
                response_body: response_body.into(),
            })),
        }
    }

    /// How many requests reached the transport.
    pub(crate) fn calls(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub(crate) fn last_request(&self) -> Option<WireRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }
}

impl HttpTransport for FakeTransport {
    fn send<'a>(
        &'a self,
        request: WireRequest,
    ) -> BoxFuture<'a, Result<WireResponse, TransportFailure>> {
        Box::pin(async move {
            let (status, body) = {
                let mut state = self.state.lock().unwrap();
                state.requests.push(request);
                (state.response_status, state.response_body.clone())
            };
            Ok(WireResponse {
                status,
                headers: Default::default(),
                body,
            })
        })
    }
}

#[derive(Debug, Clone, Copy)]
/// [`Clock`] pinned to one instant.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn unix_now(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
/// [`Clock`] that only moves when a test advances it.
pub(crate) struct SteppingClock {
    now: AtomicU64,
}

impl SteppingClock {
    pub(crate) fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub(crate) fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for SteppingClock {
    fn unix_now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MintCounter {
    mints: AtomicU64,
}

impl MintCounter {
    pub(crate) fn mints(&self) -> u64 {
        self.mints.load(Ordering::SeqCst)
    }
}

/// [`TokenMinter`] that hands out `minted-N` tokens and counts how often it
/// was asked.
pub(crate) struct CountingMinter {
    counter: Arc<MintCounter>,
    ttl_secs: u64,
}

impl CountingMinter {
    pub(crate) fn new(ttl_secs: u64) -> Self {
        Self {
            counter: Arc::new(MintCounter::default()),
            ttl_secs,
        }
    }

    pub(crate) fn counter(&self) -> Arc<MintCounter> {
        Arc::clone(&self.counter)
    }
}

impl TokenMinter for CountingMinter {
    fn mint(&self, now: u64) -> Result<MintedToken, ConfigurationError> {
        let n = self.counter.mints.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MintedToken {
            token: format!("minted-{n}"),
            expires_at: now + self.ttl_secs,
        })
    }
}

pub(crate) fn assert_param(params: &[(String, String)], key: &str, value: &str) {
    assert!(
        params.iter().any(|(k, v)| k == key && v == value),
        "missing param {key}={value}; got: {params:?}"
    );
}
