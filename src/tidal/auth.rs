use reqwest::{StatusCode, Url};

use super::TidalClient;
use crate::{
    error::ApiError,
    types::{CredentialBundle, DeviceAuthorization, OAuthErrorBody, TokenResponse},
};

/// Scopes requested for both login variants.
const SCOPE: &str = "r_usr w_usr w_sub";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Redirect target registered for the PKCE client; TIDAL shows an error page
/// there whose URL carries the authorization code.
pub const PKCE_REDIRECT_URI: &str = "https://tidal.com/android/login/auth";

impl TidalClient {
    fn client_secret(&self) -> Result<&str, ApiError> {
        self.client_secret
            .as_deref()
            .ok_or_else(|| ApiError::Config("TIDAL_CLIENT_SECRET must be set".to_string()))
    }

    fn pkce_client_id(&self) -> Result<&str, ApiError> {
        self.pkce_client_id
            .as_deref()
            .ok_or_else(|| ApiError::Config("TIDAL_PKCE_CLIENT_ID must be set".to_string()))
    }

    /// Starts the OAuth device flow.
    ///
    /// Returns the device code to poll with together with the verification
    /// link the user has to visit and the link's lifetime in seconds.
    pub(super) async fn start_device_authorization(
        &self,
    ) -> Result<DeviceAuthorization, ApiError> {
        let request = self
            .http
            .post(format!("{}/device_authorization", self.auth_url))
            .form(&[("client_id", self.client_id.as_str()), ("scope", SCOPE)]);

        Self::decode(Self::send(request).await?).await
    }

    /// Polls the token endpoint once for a pending device authorization.
    pub(super) async fn device_token(&self, device_code: &str) -> Result<TokenResponse, ApiError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret()?),
            ("device_code", device_code),
            ("grant_type", DEVICE_CODE_GRANT),
            ("scope", SCOPE),
        ];

        self.token_request(&form).await
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Bundles obtained through PKCE are refreshed with the PKCE client id and
    /// no secret; device-flow bundles use the regular client credentials.
    pub(super) async fn refresh_token(
        &self,
        bundle: &CredentialBundle,
    ) -> Result<TokenResponse, ApiError> {
        let refresh_token = bundle
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("scope", SCOPE),
        ];
        if bundle.is_pkce {
            form.push(("client_id", self.pkce_client_id()?));
        } else {
            form.push(("client_id", self.client_id.as_str()));
            form.push(("client_secret", self.client_secret()?));
        }

        let mut token = self.token_request(&form).await?;
        // TIDAL does not rotate refresh tokens; keep the one we have.
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }

    /// Builds the browser login URL for the PKCE variant.
    pub fn pkce_login_url(&self, code_challenge: &str, unique_key: &str) -> Result<Url, ApiError> {
        Url::parse_with_params(
            &format!("{}/authorize", self.login_url),
            &[
                ("response_type", "code"),
                ("redirect_uri", PKCE_REDIRECT_URI),
                ("client_id", self.pkce_client_id()?),
                ("lang", "EN"),
                ("appMode", "android"),
                ("client_unique_key", unique_key),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
                ("restrict_signup", "true"),
            ],
        )
        .map_err(|e| ApiError::Config(format!("TIDAL_LOGIN_URL is invalid: {e}")))
    }

    /// Exchanges an authorization code for an access token using PKCE.
    ///
    /// The verifier must be the one whose challenge went into
    /// [`TidalClient::pkce_login_url`].
    pub async fn exchange_pkce_code(
        &self,
        code: &str,
        verifier: &str,
        unique_key: &str,
    ) -> Result<TokenResponse, ApiError> {
        let form = [
            ("code", code),
            ("client_id", self.pkce_client_id()?),
            ("grant_type", "authorization_code"),
            ("redirect_uri", PKCE_REDIRECT_URI),
            ("scope", SCOPE),
            ("code_verifier", verifier),
            ("client_unique_key", unique_key),
        ];

        self.token_request(&form).await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/token", self.auth_url))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
        }

        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            let oauth_error = serde_json::from_str::<OAuthErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            match oauth_error.as_deref() {
                Some("authorization_pending") => return Err(ApiError::AuthorizationPending),
                Some("expired_token") => return Err(ApiError::ExpiredLink),
                _ => {}
            }
        }

        Err(ApiError::from_status(status, &body))
    }
}
