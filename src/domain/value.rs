use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Altavox account API key.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Parameter name used on the wire (`api_key`).
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Altavox account API secret.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct ApiSecret(String);

impl ApiSecret {
    /// Parameter name used on the wire (`api_secret`).
    pub const FIELD: &'static str = "api_secret";

    /// Create a validated [`ApiSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Secret used to compute request signatures.
///
/// Invariant: must not be empty. Never sent on the wire; only its keyed hash is.
pub struct SignatureSecret(String);

impl SignatureSecret {
    /// Create a validated [`SignatureSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: "signature_secret",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the secret bytes for signing.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Altavox application id, the issuer of minted bearer tokens.
///
/// Invariant: non-empty after trimming.
pub struct ApplicationId(String);

impl ApplicationId {
    /// Claim name used in minted tokens (`application_id`).
    pub const FIELD: &'static str = "application_id";

    /// Create a validated [`ApplicationId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// PEM-encoded RSA private key used to mint bearer tokens.
///
/// Invariant: must not be empty. Whether the PEM parses as an RSA key is
/// checked when the client is built, not here.
pub struct PrivateKeyPem(String);

impl PrivateKeyPem {
    /// Create a validated (non-empty) [`PrivateKeyPem`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "private_key",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the PEM bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKeyPem(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Pre-issued bearer token presented as-is in the `Authorization` header.
///
/// Invariant: non-empty after trimming.
pub struct BearerToken(String);

impl BearerToken {
    /// Create a validated [`BearerToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "token" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Phone number normalized to E.164.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct Msisdn(String);

impl Msisdn {
    /// Parse a phone number that carries an explicit country prefix.
    pub fn new(input: impl Into<String>) -> Result<Self, ValidationError> {
        Self::parse(None, input)
    }

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit
    /// country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: "number" });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self(e164))
    }

    /// Normalized E.164 representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender id shown to the recipient (`from`).
///
/// Invariant: non-empty after trimming. Alphanumeric senders must be enabled
/// for your account.
pub struct SenderId(String);

impl SenderId {
    /// Parameter name used on the wire (`from`).
    pub const FIELD: &'static str = "from";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Message body text (`text`).
///
/// Invariant: non-empty after trimming. The original value (including
/// whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Parameter name used on the wire (`text`).
    pub const FIELD: &'static str = "text";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Identifier of an in-flight verification (`request_id`).
///
/// Invariant: non-empty after trimming.
pub struct RequestId(String);

impl RequestId {
    /// Parameter name used on the wire (`request_id`).
    pub const FIELD: &'static str = "request_id";

    /// Create a validated [`RequestId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifier of a voice call as returned by the voice API.
///
/// Invariant: non-empty after trimming.
pub struct CallUuid(String);

impl CallUuid {
    /// Create a validated [`CallUuid`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "uuid" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated uuid.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
