//! JSON web tokens used for authenticating API requests.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, config::AuthConfig, user::UserID};

/// Whether a token grants access to the API or may only be exchanged for new tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// A short lived token sent with each API request.
    Access,
    /// A long lived token that can only be used at the refresh endpoint.
    Refresh,
}

impl TokenType {
    /// The name stored in the token blocklist.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// A unique ID for the token, used to revoke it.
    pub jti: String,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
    /// What the token may be used for.
    pub token_type: TokenType,
    /// Whether the user was an admin when the token was issued.
    pub is_admin: bool,
}

impl Claims {
    /// The ID of the user the token was issued to.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if the subject is not a user ID.
    pub fn user_id(&self) -> Result<UserID, Error> {
        self.sub
            .parse::<i64>()
            .map(UserID::new)
            .map_err(|_| Error::InvalidToken)
    }
}

/// The keys used to sign and verify tokens with HS256.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create the signing and verification keys from a shared secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// A freshly issued access and refresh token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    /// Token for accessing protected routes.
    pub access_token: String,
    /// Token for getting a new token pair.
    pub refresh_token: String,
}

/// Create a signed token for `user_id` that expires `lifetime` after `issued_at`.
///
/// # Errors
/// Returns [Error::TokenCreation] if the token could not be encoded.
pub fn encode_token(
    user_id: UserID,
    is_admin: bool,
    token_type: TokenType,
    issued_at: OffsetDateTime,
    lifetime: Duration,
    keys: &JwtKeys,
) -> Result<String, Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + lifetime).unix_timestamp(),
        token_type,
        is_admin,
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, was signed with
/// another key or has expired.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected token: {error}");
            Error::InvalidToken
        })
}

/// Issue a new access and refresh token for a user.
///
/// # Errors
/// Returns [Error::TokenCreation] if either token could not be encoded.
pub fn issue_token_pair(
    user_id: UserID,
    is_admin: bool,
    config: &AuthConfig,
    keys: &JwtKeys,
) -> Result<TokenPair, Error> {
    let now = OffsetDateTime::now_utc();

    Ok(TokenPair {
        access_token: encode_token(
            user_id,
            is_admin,
            TokenType::Access,
            now,
            config.access_token_duration,
            keys,
        )?,
        refresh_token: encode_token(
            user_id,
            is_admin,
            TokenType::Refresh,
            now,
            config.refresh_token_duration,
            keys,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::{Error, config::AuthConfig, user::UserID};

    use super::{JwtKeys, TokenType, decode_token, encode_token, issue_token_pair};

    fn keys() -> JwtKeys {
        JwtKeys::from_secret("foobar")
    }

    #[test]
    fn decode_gives_back_claims() {
        let keys = keys();
        let token = encode_token(
            UserID::new(42),
            true,
            TokenType::Access,
            OffsetDateTime::now_utc(),
            Duration::hours(1),
            &keys,
        )
        .unwrap();

        let claims = decode_token(&token, &keys).unwrap();

        assert_eq!(claims.user_id(), Ok(UserID::new(42)));
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let token = encode_token(
            UserID::new(1),
            false,
            TokenType::Access,
            OffsetDateTime::now_utc() - Duration::hours(2),
            Duration::hours(1),
            &keys,
        )
        .unwrap();

        assert_eq!(decode_token(&token, &keys), Err(Error::InvalidToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_token(
            UserID::new(1),
            false,
            TokenType::Access,
            OffsetDateTime::now_utc(),
            Duration::hours(1),
            &JwtKeys::from_secret("another secret"),
        )
        .unwrap();

        assert_eq!(decode_token(&token, &keys()), Err(Error::InvalidToken));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(decode_token("not.a.token", &keys()), Err(Error::InvalidToken));
    }

    #[test]
    fn token_pair_has_distinct_ids_and_types() {
        let keys = keys();
        let pair = issue_token_pair(UserID::new(7), false, &AuthConfig::default(), &keys).unwrap();

        let access = decode_token(&pair.access_token, &keys).unwrap();
        let refresh = decode_token(&pair.refresh_token, &keys).unwrap();

        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_ne!(access.jti, refresh.jti);
        assert_eq!(refresh.exp - refresh.iat, Duration::days(30).whole_seconds());
    }
}
