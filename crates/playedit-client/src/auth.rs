//! Service-account authentication.
//!
//! A service account's private key signs a short-lived RS256 assertion which
//! the token endpoint exchanges for a Bearer access token.

use std::fs;
use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::ClientError;

/// OAuth scope granting access to the publishing API.
pub const PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The parts of a service account key file needed to authenticate.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccount {
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let content = fs::read_to_string(path).map_err(|source| ClientError::ServiceAccountIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A Bearer token for the publishing API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl AccessToken {
    /// Wraps a token obtained elsewhere.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            expires_in: 3600,
            token_type: default_token_type(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Exchanges service-account assertions for access tokens.
pub struct Authenticator {
    http: reqwest::Client,
}

impl Authenticator {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn authenticate(&self, account: &ServiceAccount) -> Result<AccessToken, ClientError> {
        let assertion = sign_assertion(account, OffsetDateTime::now_utc().unix_timestamp())?;
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &assertion)
            .finish();

        debug!(token_uri = %account.token_uri, client = %account.client_email, "Requesting access token");
        let resp = self
            .http
            .post(&account.token_uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(ClientError::Transport)?;
        if !status.is_success() {
            let rejected = serde_json::from_str::<TokenErrorResponse>(&text).unwrap_or_else(|_| {
                TokenErrorResponse {
                    error: format!("http_{}", status.as_u16()),
                    error_description: text,
                }
            });
            return Err(ClientError::AuthRejected {
                error: rejected.error,
                description: rejected.error_description,
            });
        }

        serde_json::from_str(&text).map_err(ClientError::TokenResponse)
    }
}

/// Signs the RS256 assertion for `account`, issued at `iat`.
fn sign_assertion(account: &ServiceAccount, iat: i64) -> Result<String, ClientError> {
    let claims = Claims {
        iss: &account.client_email,
        scope: PUBLISHER_SCOPE,
        aud: &account.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = account.private_key_id.clone();
    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&header, &claims, &key)?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use jsonwebtoken::{DecodingKey, Validation};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fixture() -> ServiceAccount {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account.json");
        ServiceAccount::from_file(&path).unwrap()
    }

    #[test]
    fn test_service_account_fields() {
        let account = fixture();
        assert_eq!(
            account.client_email,
            "publisher@playedit-test.iam.gserviceaccount.com"
        );
        assert_eq!(account.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(account.private_key_id.as_deref(), Some("test-key-1"));
    }

    #[test]
    fn test_assertion_claims() {
        let account = fixture();
        let jwt = sign_assertion(&account, 1_700_000_000).unwrap();

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("test-key-1"));

        let public_pem = fs::read(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("tests/fixtures/service_account_public.pem"),
        )
        .unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[account.token_uri.as_str()]);
        validation.validate_exp = false;
        let data = jsonwebtoken::decode::<serde_json::Value>(
            &jwt,
            &DecodingKey::from_rsa_pem(&public_pem).unwrap(),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims["iss"], account.client_email.as_str());
        assert_eq!(data.claims["scope"], PUBLISHER_SCOPE);
        assert_eq!(data.claims["exp"], 1_700_003_600);
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceAccount::from_file(Path::new("/nonexistent/account.json")).unwrap_err();
        assert!(matches!(err, ClientError::ServiceAccountIo { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_exchanges_assertion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut account = fixture();
        account.token_uri = format!("{}/token", server.uri());
        let token = Authenticator::new(reqwest::Client::new())
            .authenticate(&account)
            .await
            .unwrap();

        assert_eq!(token.access_token, "ya29.test");
        assert_eq!(token.expires_in, 3599);
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })))
            .mount(&server)
            .await;

        let mut account = fixture();
        account.token_uri = format!("{}/token", server.uri());
        let err = Authenticator::new(reqwest::Client::new())
            .authenticate(&account)
            .await
            .unwrap_err();

        match err {
            ClientError::AuthRejected { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "Invalid JWT Signature.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
