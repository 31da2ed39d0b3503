//! In-process identity provider speaking the register/login/logout contract.
//!
//! The fake binds an ephemeral localhost port and serves:
//!
//! ```text
//! POST /api/register {"name","email","password"} -> 200 {"user":{..},"token"} | 422 {"message"}
//! POST /api/login    {"email","password"}        -> 200 {"user":{..},"token"} | 422 {"message"}
//! POST /api/logout   Authorization: Bearer <t>   -> 200 "Logged out"          | 401 {"message"}
//! GET  /api/user     Authorization: Bearer <t>   -> 200 {"id","name",..}      | 401 {"message"}
//! ```
//!
//! Every request is recorded for wire assertions. Tests can queue canned
//! responses or add latency to exercise failure paths.
//!
//! Actix spawns the server with `spawn_local`, so [`FakeIdentityProvider::spawn`]
//! must run inside an actix system or a Tokio `LocalSet`.

use std::collections::{HashMap, VecDeque};
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde::Deserialize;
use serde_json::json;
use url::Url;

const UNAUTHENTICATED: &str = "Unauthenticated.";

/// Request observed by the fake provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// `Content-Type` header, if sent.
    pub content_type: Option<String>,
    /// `Accept` header, if sent.
    pub accept: Option<String>,
    /// `Authorization` header, if sent.
    pub authorization: Option<String>,
    /// Raw body as UTF-8 (lossy).
    pub body: String,
}

/// Response served instead of the provider's own logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    /// Status code to return.
    pub status: u16,
    /// `Content-Type` of the body.
    pub content_type: String,
    /// Raw body.
    pub body: String,
}

impl CannedResponse {
    /// JSON body with the given status.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json".to_owned(),
            body: body.to_string(),
        }
    }

    /// Arbitrary body, such as an HTML error page.
    pub fn raw(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            status,
            content_type: content_type.to_owned(),
            body: body.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredAccount {
    id: i64,
    name: String,
    email: String,
    password: String,
}

impl StoredAccount {
    fn public_json(&self) -> serde_json::Value {
        json!({"id": self.id, "name": self.name, "email": self.email})
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    accounts: Mutex<Vec<StoredAccount>>,
    tokens: Mutex<HashMap<String, i64>>,
    issued: Mutex<u64>,
    requests: Mutex<Vec<RecordedRequest>>,
    canned: Mutex<VecDeque<CannedResponse>>,
    latency: Mutex<Option<Duration>>,
}

fn next_id(accounts: &[StoredAccount]) -> i64 {
    accounts.last().map_or(1, |account| account.id + 1)
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProviderState {
    fn record(&self, request: &HttpRequest, body: &[u8]) {
        let header = |name: HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        locked(&self.requests).push(RecordedRequest {
            method: request.method().to_string(),
            path: request.path().to_owned(),
            content_type: header(CONTENT_TYPE),
            accept: header(ACCEPT),
            authorization: header(AUTHORIZATION),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    fn issue_token(&self, account_id: i64) -> String {
        let serial = {
            let mut issued = locked(&self.issued);
            *issued += 1;
            *issued
        };
        let token = format!("{serial}|fake-token-{account_id}-{serial}");
        locked(&self.tokens).insert(token.clone(), account_id);
        token
    }

    fn account_for(&self, request: &HttpRequest) -> Option<StoredAccount> {
        let token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))?;
        let account_id = *locked(&self.tokens).get(token)?;
        locked(&self.accounts)
            .iter()
            .find(|account| account.id == account_id)
            .cloned()
    }

    fn revoke(&self, request: &HttpRequest) {
        if let Some(token) = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            locked(&self.tokens).remove(token);
        }
    }
}

/// Handle to a running fake identity provider.
pub struct FakeIdentityProvider {
    base_url: Url,
    server: ServerHandle,
    state: Arc<ProviderState>,
}

impl FakeIdentityProvider {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be bound.
    pub fn spawn() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let state = Arc::new(ProviderState::default());
        let data = web::Data::from(Arc::clone(&state));

        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::scope("/api")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/user", web::get().to(current_user)),
            )
        })
        .disable_signals()
        .workers(1)
        .listen(listener)?
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        let base_url = Url::parse(&format!("http://{addr}/"))
            .map_err(|error| std::io::Error::other(error.to_string()))?;
        Ok(Self {
            base_url,
            server: handle,
            state,
        })
    }

    /// Base URL to configure clients with.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Add an account directly, returning its id.
    pub fn seed_account(&self, name: &str, email: &str, password: &str) -> i64 {
        let mut accounts = locked(&self.state.accounts);
        let id = next_id(&accounts);
        accounts.push(StoredAccount {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        });
        id
    }

    /// Serve `response` for the next request, whatever its route.
    pub fn respond_next(&self, response: CannedResponse) {
        locked(&self.state.canned).push_back(response);
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *locked(&self.state.latency) = Some(latency);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        locked(&self.state.requests).clone()
    }

    /// Number of tokens currently accepted.
    pub fn live_tokens(&self) -> usize {
        locked(&self.state.tokens).len()
    }

    /// Stop the server and wait for it to finish.
    pub async fn stop(&self) {
        self.server.stop(true).await;
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

fn unprocessable(message: &str) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(json!({ "message": message }))
}

fn unauthenticated() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": UNAUTHENTICATED }))
}

fn required(value: Option<&String>, field: &str) -> Result<String, HttpResponse> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(unprocessable(&format!("The {field} field is required."))),
    }
}

/// Record the request, apply latency, and return a canned response if one
/// is queued.
async fn intercept(
    state: &ProviderState,
    request: &HttpRequest,
    body: &[u8],
) -> Option<HttpResponse> {
    state.record(request, body);
    let latency = *locked(&state.latency);
    if let Some(latency) = latency {
        actix_web::rt::time::sleep(latency).await;
    }
    let canned = locked(&state.canned).pop_front()?;
    let status =
        StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Some(
        HttpResponse::build(status)
            .content_type(canned.content_type)
            .body(canned.body),
    )
}

fn parse_credentials(body: &[u8]) -> Result<CredentialsBody, HttpResponse> {
    serde_json::from_slice(body).map_err(|_| unprocessable("The request body must be JSON."))
}

async fn register(
    state: web::Data<ProviderState>,
    request: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Some(response) = intercept(&state, &request, &body).await {
        return response;
    }
    let parsed = match parse_credentials(&body) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let fields = required(parsed.name.as_ref(), "name").and_then(|name| {
        let email = required(parsed.email.as_ref(), "email")?;
        let password = required(parsed.password.as_ref(), "password")?;
        Ok((name, email, password))
    });
    let (name, email, password) = match fields {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let account = {
        let mut accounts = locked(&state.accounts);
        if accounts.iter().any(|account| account.email == email) {
            return unprocessable("The email has already been taken.");
        }
        let id = next_id(&accounts);
        let account = StoredAccount {
            id,
            name,
            email,
            password,
        };
        accounts.push(account.clone());
        account
    };
    let token = state.issue_token(account.id);
    HttpResponse::Ok().json(json!({ "user": account.public_json(), "token": token }))
}

async fn login(
    state: web::Data<ProviderState>,
    request: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Some(response) = intercept(&state, &request, &body).await {
        return response;
    }
    let parsed = match parse_credentials(&body) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let matched = locked(&state.accounts)
        .iter()
        .find(|account| {
            Some(&account.email) == parsed.email.as_ref()
                && Some(&account.password) == parsed.password.as_ref()
        })
        .cloned();
    let Some(account) = matched else {
        return unprocessable("Invalid credentials");
    };
    let token = state.issue_token(account.id);
    HttpResponse::Ok().json(json!({ "user": account.public_json(), "token": token }))
}

async fn logout(
    state: web::Data<ProviderState>,
    request: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Some(response) = intercept(&state, &request, &body).await {
        return response;
    }
    if state.account_for(&request).is_none() {
        return unauthenticated();
    }
    state.revoke(&request);
    HttpResponse::Ok().content_type("text/plain").body("Logged out")
}

async fn current_user(
    state: web::Data<ProviderState>,
    request: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Some(response) = intercept(&state, &request, &body).await {
        return response;
    }
    match state.account_for(&request) {
        Some(account) => {
            let mut echoed = account.public_json();
            echoed["email_verified_at"] = serde_json::Value::Null;
            echoed["created_at"] = json!("2024-05-01T10:00:00.000000Z");
            HttpResponse::Ok().json(echoed)
        }
        None => unauthenticated(),
    }
}
