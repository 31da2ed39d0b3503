//! Reqwest-backed identity provider adapter.
//!
//! This adapter owns transport details only: request serialisation, header
//! conventions, timeout and transport error mapping, and the status-driven
//! choice between the success body and the `{message}` error body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    AccountDto, AuthResponseDto, ErrorResponseDto, LoginRequestDto, RegisterRequestDto,
};
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Account, BearerToken, Credentials, Session};

const JSON: &str = "application/json";

/// Absolute URLs of the provider endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEndpoints {
    register: Url,
    login: Url,
    logout: Url,
    current_account: Url,
}

impl IdentityEndpoints {
    /// Derive the `api/<operation>` endpoints below `base`.
    ///
    /// A base without a trailing slash is treated as a directory, so
    /// `https://id.example/auth` resolves to `https://id.example/auth/api/login`.
    ///
    /// # Examples
    /// ```
    /// use session_client::outbound::identity::IdentityEndpoints;
    /// use url::Url;
    ///
    /// let base = Url::parse("http://userauth.test").unwrap();
    /// let endpoints = IdentityEndpoints::from_base(&base).unwrap();
    /// assert_eq!(endpoints.login().as_str(), "http://userauth.test/api/login");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when `base` cannot be used as a base URL.
    pub fn from_base(base: &Url) -> Result<Self, url::ParseError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let directory = format!("{}/", base.path());
            base.set_path(&directory);
        }
        Ok(Self {
            register: base.join("api/register")?,
            login: base.join("api/login")?,
            logout: base.join("api/logout")?,
            current_account: base.join("api/user")?,
        })
    }

    /// Registration endpoint.
    pub fn register(&self) -> &Url {
        &self.register
    }

    /// Login endpoint.
    pub fn login(&self) -> &Url {
        &self.login
    }

    /// Logout endpoint.
    pub fn logout(&self) -> &Url {
        &self.logout
    }

    /// Account echo endpoint.
    pub fn current_account(&self) -> &Url {
        &self.current_account
    }
}

/// Identity provider adapter that performs one HTTP request per operation.
pub struct HttpIdentityProvider {
    client: Client,
    endpoints: IdentityEndpoints,
}

impl HttpIdentityProvider {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let provider = HttpIdentityProvider::new(endpoints, Duration::from_secs(10));
    /// assert!(provider.is_ok() || provider.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: IdentityEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    /// Endpoints this adapter calls.
    pub fn endpoints(&self) -> &IdentityEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn register(&self, credentials: &Credentials) -> Result<Session, IdentityProviderError> {
        let name = credentials.name().ok_or_else(|| {
            IdentityProviderError::invalid_request("registration requires a name")
        })?;
        let request = self
            .client
            .post(self.endpoints.register.clone())
            .header(ACCEPT, JSON)
            .json(&RegisterRequestDto {
                name,
                email: credentials.email(),
                password: credentials.password(),
            });
        let (status, body) = exchange(request).await?;
        decode_success::<AuthResponseDto>(status, &body).map(AuthResponseDto::into_session)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, IdentityProviderError> {
        let request = self
            .client
            .post(self.endpoints.login.clone())
            .json(&LoginRequestDto {
                email: credentials.email(),
                password: credentials.password(),
            });
        let (status, body) = exchange(request).await?;
        decode_success::<AuthResponseDto>(status, &body).map(AuthResponseDto::into_session)
    }

    async fn logout(&self, token: &BearerToken) -> Result<(), IdentityProviderError> {
        let request = self
            .client
            .post(self.endpoints.logout.clone())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .header(AUTHORIZATION, bearer_header(token)?);
        let (status, body) = exchange(request).await?;
        if status != StatusCode::OK {
            return Err(map_status_error(status, &body));
        }
        debug!(body = %body_preview(&body), "logout acknowledged");
        Ok(())
    }

    async fn current_account(
        &self,
        token: &BearerToken,
    ) -> Result<Account, IdentityProviderError> {
        let request = self
            .client
            .get(self.endpoints.current_account.clone())
            .header(ACCEPT, JSON)
            .header(AUTHORIZATION, bearer_header(token)?);
        let (status, body) = exchange(request).await?;
        decode_success::<AccountDto>(status, &body).map(AccountDto::into_account)
    }
}

async fn exchange(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), IdentityProviderError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    Ok((status, body.to_vec()))
}

fn bearer_header(token: &BearerToken) -> Result<HeaderValue, IdentityProviderError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(|_| {
        IdentityProviderError::invalid_request("bearer token is not a valid header value")
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn decode_success<T>(status: StatusCode, body: &[u8]) -> Result<T, IdentityProviderError>
where
    T: DeserializeOwned,
{
    if status != StatusCode::OK {
        return Err(map_status_error(status, body));
    }
    serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::decode(format!("invalid success payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    if error.is_timeout() {
        IdentityProviderError::timeout(error.to_string())
    } else if error.is_builder() {
        IdentityProviderError::invalid_request(error.to_string())
    } else {
        IdentityProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    if let Ok(ErrorResponseDto { message }) = serde_json::from_slice(body) {
        return IdentityProviderError::rejected(status.as_u16(), message);
    }

    let body_preview = body_preview(body);
    if body_preview.is_empty() {
        IdentityProviderError::decode(format!("status {} without an error body", status.as_u16()))
    } else {
        IdentityProviderError::decode(format!("status {}: {}", status.as_u16(), body_preview))
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
