use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::auth::{Clock, ConfigurationError};
use crate::domain::{ApplicationId, BearerToken, PrivateKeyPem};
use crate::transport::WireRequest;

/// A cached token is refreshed once it is within this many seconds of expiry.
pub const EXPIRY_MARGIN_SECS: u64 = 15;

/// Lifetime of a freshly minted token.
const DEFAULT_TOKEN_TTL_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A bearer token together with its expiry instant (Unix seconds).
pub struct MintedToken {
    pub token: String,
    pub expires_at: u64,
}

/// Produces bearer tokens on demand.
///
/// Split out from [`BearerAuth`] so tests can count mints without a real
/// RSA key.
pub trait TokenMinter: Send + Sync {
    fn mint(&self, now: u64) -> Result<MintedToken, ConfigurationError>;
}

/// [`TokenMinter`] that signs RS256 tokens with an application's RSA key.
///
/// Claims: `application_id`, `iat`, `exp`, and `sub` when a subject is set.
pub struct JwtMinter {
    application_id: ApplicationId,
    encoding_key: jsonwebtoken::EncodingKey,
    subject: Option<String>,
    ttl_secs: u64,
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    application_id: &'a str,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

impl JwtMinter {
    /// Parse the PEM into a signing key, failing fast on unusable material.
    pub fn new(
        application_id: ApplicationId,
        private_key: &PrivateKeyPem,
    ) -> Result<Self, ConfigurationError> {
        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|err| ConfigurationError::InvalidPrivateKey {
                message: err.to_string(),
            })?;
        Ok(Self {
            application_id,
            encoding_key,
            subject: None,
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        })
    }

    /// Set the `sub` claim carried by minted tokens.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl TokenMinter for JwtMinter {
    fn mint(&self, now: u64) -> Result<MintedToken, ConfigurationError> {
        let expires_at = now + self.ttl_secs;
        let claims = TokenClaims {
            application_id: self.application_id.as_str(),
            iat: now,
            exp: expires_at,
            sub: self.subject.as_deref(),
        };
        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|err| {
            ConfigurationError::InvalidPrivateKey {
                message: err.to_string(),
            }
        })?;
        Ok(MintedToken { token, expires_at })
    }
}

enum TokenSource {
    Static(BearerToken),
    Minted {
        minter: Box<dyn TokenMinter>,
        clock: Arc<dyn Clock>,
        cache: Mutex<Option<MintedToken>>,
    },
}

/// Bearer authentication: `Authorization: Bearer <token>`.
///
/// Tokens are either static or minted lazily and cached until within
/// [`EXPIRY_MARGIN_SECS`] of expiry. The mint happens inside the cache lock;
/// signing is CPU-local, so of N concurrent observers of a stale token
/// exactly one mints and the rest reuse the fresh value.
pub struct BearerAuth {
    source: TokenSource,
}

impl BearerAuth {
    pub(crate) fn from_static(token: BearerToken) -> Self {
        Self {
            source: TokenSource::Static(token),
        }
    }

    pub(crate) fn minting(minter: Box<dyn TokenMinter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source: TokenSource::Minted {
                minter,
                clock,
                cache: Mutex::new(None),
            },
        }
    }

    pub fn apply(&self, request: &mut WireRequest) -> Result<(), ConfigurationError> {
        let token = self.current_token()?;
        request.header("Authorization", format!("Bearer {token}"));
        Ok(())
    }

    fn current_token(&self) -> Result<String, ConfigurationError> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.as_str().to_owned()),
            TokenSource::Minted {
                minter,
                clock,
                cache,
            } => {
                let now = clock.unix_now();
                let mut cached = match cache.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if let Some(minted) = cached.as_ref() {
                    if now + EXPIRY_MARGIN_SECS < minted.expires_at {
                        return Ok(minted.token.clone());
                    }
                }
                let minted = minter.mint(now)?;
                let token = minted.token.clone();
                *cached = Some(minted);
                Ok(token)
            }
        }
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            TokenSource::Static(_) => f.write_str("BearerAuth::Static(..)"),
            TokenSource::Minted { .. } => f.write_str("BearerAuth::Minted(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{CountingMinter, SteppingClock};
    use std::sync::Barrier;
    use std::thread;
    use url::Url;

    fn request() -> WireRequest {
        let url = Url::parse("https://api.altavox.com/v1/calls").unwrap();
        WireRequest::new(reqwest::Method::POST, url)
    }

    #[test]
    fn static_tokens_are_used_verbatim() {
        let auth = BearerAuth::from_static(BearerToken::new("abc.def.ghi").unwrap());
        let mut wire = request();
        auth.apply(&mut wire).unwrap();
        assert_eq!(
            wire.headers.get("Authorization").map(String::as_str),
            Some("Bearer abc.def.ghi")
        );
    }

    #[test]
    fn sequential_calls_reuse_the_cached_token() {
        let minter = CountingMinter::new(900);
        let counter = minter.counter();
        let clock = Arc::new(SteppingClock::new(1_700_000_000));
        let auth = BearerAuth::minting(Box::new(minter), clock);

        for _ in 0..5 {
            auth.apply(&mut request()).unwrap();
        }
        assert_eq!(counter.mints(), 1);
    }

    #[test]
    fn a_token_near_expiry_is_reminted() {
        let minter = CountingMinter::new(900);
        let counter = minter.counter();
        let clock = Arc::new(SteppingClock::new(1_700_000_000));
        let auth = BearerAuth::minting(Box::new(minter), Arc::clone(&clock) as Arc<dyn Clock>);

        auth.apply(&mut request()).unwrap();
        assert_eq!(counter.mints(), 1);

        // Still comfortably inside the margin.
        clock.advance(900 - EXPIRY_MARGIN_SECS - 1);
        auth.apply(&mut request()).unwrap();
        assert_eq!(counter.mints(), 1);

        // Crossing into the margin triggers a fresh mint.
        clock.advance(1);
        auth.apply(&mut request()).unwrap();
        assert_eq!(counter.mints(), 2);
    }

    #[test]
    fn concurrent_first_use_mints_exactly_once() {
        let minter = CountingMinter::new(900);
        let counter = minter.counter();
        let clock = Arc::new(SteppingClock::new(1_700_000_000));
        let auth = Arc::new(BearerAuth::minting(Box::new(minter), clock));

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let auth = Arc::clone(&auth);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut wire = request();
                    auth.apply(&mut wire).unwrap();
                    wire.headers.get("Authorization").cloned().unwrap()
                })
            })
            .collect();

        let tokens: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counter.mints(), 1);
        assert!(tokens.iter().all(|token| token == &tokens[0]));
    }
}
