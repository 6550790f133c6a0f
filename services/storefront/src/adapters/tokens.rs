//! services/storefront/src/adapters/tokens.rs
//!
//! Activation tokens and the opaque account identifiers used in activation links.
//!
//! A token is `<issued-at, hex seconds>-<truncated HMAC-SHA256, hex>`. The MAC
//! covers the account's id, password hash, active flag and last login, so
//! activating the account (or logging in, or changing the password) makes
//! every outstanding token stop verifying.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;
use storefront_core::domain::{Account, AccountId};
use storefront_core::ports::TokenService;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LEN: usize = 16;

/// Encodes an account id for use in a URL path segment.
pub fn encode_uid(account_id: AccountId) -> String {
    URL_SAFE_NO_PAD.encode(account_id.to_string())
}

/// Reverses `encode_uid`. Any malformed input yields `None`.
pub fn decode_uid(uid: &str) -> Option<AccountId> {
    let bytes = URL_SAFE_NO_PAD.decode(uid).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse().ok()
}

/// An adapter that implements the `TokenService` port with a keyed HMAC.
#[derive(Clone)]
pub struct HmacTokenService {
    keyed: HmacSha256,
    timeout: Duration,
}

impl HmacTokenService {
    /// Creates a new `HmacTokenService` whose tokens expire after `timeout`.
    pub fn new(secret: &str, timeout: Duration) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret.as_bytes())?,
            timeout,
        })
    }

    pub fn make_token_at(&self, account: &Account, now: DateTime<Utc>) -> String {
        let issued_at = now.timestamp();
        let digest = self.mac(account, issued_at).finalize().into_bytes();
        format!("{:x}-{}", issued_at, hex::encode(&digest[..SIGNATURE_LEN]))
    }

    pub fn check_token_at(&self, account: &Account, token: &str, now: DateTime<Utc>) -> bool {
        let Some((issued_hex, signature_hex)) = token.split_once('-') else {
            return false;
        };
        let Ok(issued_at) = i64::from_str_radix(issued_hex, 16) else {
            return false;
        };
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        if signature.len() != SIGNATURE_LEN {
            return false;
        }

        let age = now.timestamp() - issued_at;
        if age < 0 || age > self.timeout.num_seconds() {
            return false;
        }

        self.mac(account, issued_at)
            .verify_truncated_left(&signature)
            .is_ok()
    }

    fn mac(&self, account: &Account, issued_at: i64) -> HmacSha256 {
        let last_login = account
            .last_login
            .map(|t| t.timestamp().to_string())
            .unwrap_or_default();

        let mut mac = self.keyed.clone();
        for part in [
            account.id.to_string().as_str(),
            account.password_hash.as_str(),
            if account.is_active { "1" } else { "0" },
            last_login.as_str(),
            issued_at.to_string().as_str(),
        ] {
            mac.update(part.as_bytes());
            mac.update(b"\0");
        }
        mac
    }
}

impl TokenService for HmacTokenService {
    fn make_token(&self, account: &Account) -> String {
        self.make_token_at(account, Utc::now())
    }

    fn check_token(&self, account: &Account, token: &str) -> bool {
        self.check_token_at(account, token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: 42,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            is_active: false,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    fn service() -> HmacTokenService {
        HmacTokenService::new("a-test-secret-of-some-length", Duration::days(3)).unwrap()
    }

    #[test]
    fn fresh_tokens_verify() {
        let tokens = service();
        let token = tokens.make_token(&account());
        assert!(tokens.check_token(&account(), &token));
    }

    #[test]
    fn activation_consumes_the_token() {
        let tokens = service();
        let mut account = account();
        let token = tokens.make_token(&account);

        account.is_active = true;

        assert!(!tokens.check_token(&account, &token));
    }

    #[test]
    fn tokens_expire() {
        let tokens = service();
        let issued = Utc::now() - Duration::days(4);
        let token = tokens.make_token_at(&account(), issued);

        assert!(!tokens.check_token(&account(), &token));
        assert!(tokens.check_token_at(&account(), &token, issued + Duration::days(2)));
    }

    #[test]
    fn tampered_or_foreign_tokens_fail() {
        let tokens = service();
        let token = tokens.make_token(&account());
        let other = HmacTokenService::new("another-secret-entirely", Duration::days(3)).unwrap();

        assert!(!other.check_token(&account(), &token));
        assert!(!tokens.check_token(&account(), "not-a-token"));
        assert!(!tokens.check_token(&account(), ""));

        let mut forged = token.clone();
        forged.pop();
        forged.push(if token.ends_with('0') { '1' } else { '0' });
        assert!(!tokens.check_token(&account(), &forged));
    }

    #[test]
    fn uids_round_trip_and_reject_garbage() {
        let uid = encode_uid(1234);
        assert_eq!(uid, "MTIzNA");
        assert_eq!(decode_uid(&uid), Some(1234));
        assert_eq!(decode_uid("!!!"), None);
        assert_eq!(decode_uid(&URL_SAFE_NO_PAD.encode("abc")), None);
    }
}
