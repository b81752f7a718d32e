use std::collections::HashMap;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, JwtError, TokenIssuer, TokenType};
use crate::store::{Document, DocumentId, Filter, Projection, StoreError, StoreGateway, UserDocument};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Token is invalid or expired")]
    InvalidToken(#[source] JwtError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// User signup, credential checks and token issuance
#[derive(Clone)]
pub struct AccountService {
    store: StoreGateway,
    tokens: Arc<TokenIssuer>,
    password_hash_cost: u32,
}

impl AccountService {
    pub fn new(store: StoreGateway, tokens: Arc<TokenIssuer>, password_hash_cost: u32) -> Self {
        Self {
            store,
            tokens,
            password_hash_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<TokenPair, AuthError> {
        let username = request.username.unwrap_or_default().trim().to_string();
        let email = normalize_email(request.email.as_deref().unwrap_or_default());
        let password = request.password.unwrap_or_default();

        let mut field_errors = HashMap::new();
        if let Err(msg) = validate_username_format(&username) {
            field_errors.insert("username".to_string(), msg);
        }
        if let Err(msg) = validate_email_format(&email) {
            field_errors.insert("email".to_string(), msg);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            field_errors.insert(
                "password".to_string(),
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        if field_errors.is_empty() {
            if self.find_user("username", &username).await?.is_some() {
                field_errors.insert("username".to_string(), "A user with that username already exists.".to_string());
            }
            if self.find_user("email", &email).await?.is_some() {
                field_errors.insert("email".to_string(), "A user with that email already exists.".to_string());
            }
        }
        if !field_errors.is_empty() {
            return Err(AuthError::Validation(field_errors));
        }

        let mut doc = Document::new();
        doc.insert("username".to_string(), json!(username));
        doc.insert("email".to_string(), json!(email));
        let password_hash = hash_password(&password, self.password_hash_cost)?;
        doc.insert("password_hash".to_string(), json!(password_hash));
        doc.insert("is_active".to_string(), json!(true));
        doc.insert(
            "date_joined".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let user_id = match self.store.users().insert_one(doc).await {
            Ok(id) => id,
            Err(StoreError::DuplicateKey { detail, .. }) => {
                let field = if detail.contains("username") { "username" } else { "email" };
                let mut field_errors = HashMap::new();
                field_errors.insert(field.to_string(), format!("A user with that {} already exists.", field));
                return Err(AuthError::Validation(field_errors));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Registered user {} ({})", username, user_id);
        self.token_pair(user_id, &username)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AuthError> {
        let email = normalize_email(request.email.as_deref().unwrap_or_default());
        let password = request.password.unwrap_or_default();

        let mut field_errors = HashMap::new();
        if email.is_empty() {
            field_errors.insert("email".to_string(), "This field is required.".to_string());
        }
        if password.is_empty() {
            field_errors.insert("password".to_string(), "This field is required.".to_string());
        }
        if !field_errors.is_empty() {
            return Err(AuthError::Validation(field_errors));
        }

        let Some(user) = self.find_user("email", &email).await? else {
            warn!("Rejected login for unknown account");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&password, &user.password_hash) {
            warn!("Rejected login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.token_pair(user.id, &user.username)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenType::Refresh)
            .map_err(AuthError::InvalidToken)?;
        let user_id = DocumentId::parse(&claims.user_id)
            .map_err(|e| AuthError::InvalidToken(JwtError::InvalidToken(e.to_string())))?;

        Ok(self.tokens.issue(user_id, &claims.username, TokenType::Access)?)
    }

    fn token_pair(&self, user_id: DocumentId, username: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.tokens.issue(user_id, username, TokenType::Access)?,
            refresh: self.tokens.issue(user_id, username, TokenType::Refresh)?,
        })
    }

    async fn find_user(&self, field: &str, value: &str) -> Result<Option<UserDocument>, StoreError> {
        self.store
            .users()
            .find_one(&Filter::field_eq(field, value), &Projection::none())
            .await?
            .map(UserDocument::try_from)
            .transpose()
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    let length = username.chars().count();
    if length < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LENGTH));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err("Username can only contain letters, numbers, and @/./+/-/_".to_string());
    }

    Ok(())
}

fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err("Invalid email format".to_string());
    }
    if domain.starts_with('.') || domain.ends_with('.') || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}
