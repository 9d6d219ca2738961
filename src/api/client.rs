use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::api::envelope::{self, decode, decode_list};
use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::domain::{Doctor, DoctorCredentials, Patient, UserRecord};
use crate::session::AuthToken;

/// Token and user returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: AuthToken,
    pub user: UserRecord,
}

#[derive(Deserialize)]
struct RawGrant {
    token: String,
    user: UserRecord,
}

/// REST client for the clinic backend.
///
/// Stateless with respect to the session: callers pass the token they
/// want attached. A 401 surfaces as [`ApiError::Unauthorized`]; clearing
/// the session is up to the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- Authentication ----------------------------------------------------------

    /// `POST /login` for doctors.
    pub async fn login_doctor(&self, doctor_id: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let body = json!({ "id_doctor": doctor_id, "password": password });
        self.login("/login", &body).await
    }

    /// `POST /login-admin` for administrators.
    pub async fn login_admin(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let body = json!({ "usuario": username, "password": password });
        self.login("/login-admin", &body).await
    }

    async fn login(&self, path: &str, body: &Value) -> Result<LoginGrant, ApiError> {
        let payload = self.send_json(Method::POST, path, None, body).await?;
        let grant: RawGrant = decode(path, payload)?;
        if grant.token.is_empty() {
            return Err(ApiError::Decode {
                path: path.to_string(),
                message: "login response carried an empty token".to_string(),
            });
        }
        Ok(LoginGrant {
            token: AuthToken::new(grant.token),
            user: grant.user,
        })
    }

    /// `POST /logout`: revoke the token server-side.
    pub async fn logout(&self, token: &AuthToken) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/logout", Some(token), &json!({}))
            .await
            .map(drop)
    }

    /// `GET /user`: the user the token belongs to.
    pub async fn current_user(&self, token: &AuthToken) -> Result<UserRecord, ApiError> {
        let payload = self.get("/user", Some(token)).await?;
        decode("/user", payload)
    }

    // -- Doctors -----------------------------------------------------------------

    /// Doctor list: the full `/doctores` resource when authenticated, the
    /// public `/doctores-lista` otherwise.
    pub async fn list_doctors(&self, token: Option<&AuthToken>) -> Result<Vec<Doctor>, ApiError> {
        let path = if token.is_some() { "/doctores" } else { "/doctores-lista" };
        let payload = self.get(path, token).await?;
        decode_list(path, payload)
    }

    pub async fn create_doctor(&self, token: &AuthToken, doctor: &Doctor) -> Result<Doctor, ApiError> {
        let payload = self
            .send_json(Method::POST, "/doctores", Some(token), doctor)
            .await?;
        decode("/doctores", payload)
    }

    pub async fn update_doctor(&self, token: &AuthToken, doctor: &Doctor) -> Result<(), ApiError> {
        let path = format!("/doctores/{}", doctor.id);
        self.send_json(Method::PUT, &path, Some(token), doctor)
            .await
            .map(drop)
    }

    pub async fn delete_doctor(&self, token: &AuthToken, id: &str) -> Result<(), ApiError> {
        let path = format!("/doctores/{}", id);
        self.delete(&path, token).await
    }

    /// `POST /usuarios`: login credentials for an existing doctor.
    pub async fn create_credentials(
        &self,
        token: &AuthToken,
        credentials: &DoctorCredentials,
    ) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/usuarios", Some(token), credentials)
            .await
            .map(drop)
    }

    // -- Patients ----------------------------------------------------------------

    pub async fn list_patients(&self, token: &AuthToken) -> Result<Vec<Patient>, ApiError> {
        let payload = self.get("/pacientes", Some(token)).await?;
        decode_list("/pacientes", payload)
    }

    pub async fn create_patient(&self, token: &AuthToken, patient: &Patient) -> Result<Patient, ApiError> {
        let payload = self
            .send_json(Method::POST, "/pacientes", Some(token), patient)
            .await?;
        decode("/pacientes", payload)
    }

    pub async fn update_patient(&self, token: &AuthToken, patient: &Patient) -> Result<(), ApiError> {
        let path = format!("/pacientes/{}", patient.id);
        self.send_json(Method::PUT, &path, Some(token), patient)
            .await
            .map(drop)
    }

    pub async fn delete_patient(&self, token: &AuthToken, id: &str) -> Result<(), ApiError> {
        let path = format!("/pacientes/{}", id);
        self.delete(&path, token).await
    }

    // -- Transport ---------------------------------------------------------------

    async fn get(&self, path: &str, token: Option<&AuthToken>) -> Result<Value, ApiError> {
        let builder = self.request(Method::GET, path, token);
        self.execute(builder, path).await
    }

    async fn delete(&self, path: &str, token: &AuthToken) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, path, Some(token));
        self.execute(builder, path).await.map(drop)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&AuthToken>,
        body: &B,
    ) -> Result<Value, ApiError> {
        let builder = self.request(method, path, token).json(body);
        self.execute(builder, path).await
    }

    fn request(&self, method: Method, path: &str, token: Option<&AuthToken>) -> RequestBuilder {
        tracing::debug!(%method, path, authenticated = token.is_some(), "Backend request");

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }
        builder
    }

    async fn execute(&self, builder: RequestBuilder, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let connection_error = |source| ApiError::Connection {
            url: url.clone(),
            source,
        };

        let response = match timeout(self.request_timeout, builder.send()).await {
            Ok(result) => result.map_err(connection_error)?,
            Err(_) => {
                return Err(ApiError::Timeout {
                    duration: self.request_timeout.as_secs(),
                })
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(connection_error)?;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "Backend answered 401");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = envelope::error_message(&text);
            tracing::warn!(path, status = status.as_u16(), %message, "Backend request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        envelope::into_payload(body)
    }
}
