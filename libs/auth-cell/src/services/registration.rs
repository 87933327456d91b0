use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;
use shared_models::auth::Role;
use shared_models::error::FieldErrors;
use shared_utils::validation::{
    validate_email, validate_password, validate_password_confirmation, validate_person_name,
    validate_username,
};

use crate::models::{AuthError, LoginRequest, RegisterRequest, UserRecord};
use crate::services::credentials::PasswordService;

/// Account creation and credential checks against the users table.
pub struct RegistrationService {
    store: StoreClient,
}

impl RegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Self-registration: the role is always patient, never chosen by the
    /// registrant.
    pub async fn register_patient(&self, request: RegisterRequest) -> Result<UserRecord, AuthError> {
        self.register(request, Role::Patient).await
    }

    /// Admin-driven doctor registration. The account is active immediately;
    /// license and specialties are supplied in the profile-completion step.
    pub async fn register_doctor(&self, request: RegisterRequest) -> Result<UserRecord, AuthError> {
        self.register(request, Role::Doctor).await
    }

    async fn register(&self, request: RegisterRequest, role: Role) -> Result<UserRecord, AuthError> {
        let mut errors = FieldErrors::new();
        validate_username(&request.username, &mut errors);
        validate_email(&request.email, &mut errors);
        validate_person_name("first_name", &request.first_name, &mut errors);
        validate_person_name("last_name", &request.last_name, &mut errors);
        validate_password(&request.password, &mut errors);
        validate_password_confirmation(&request.password, &request.password_confirmation, &mut errors);

        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        // Uniqueness checks only make sense for well-formed identifiers.
        if errors.is_empty() {
            if self.username_exists(&username).await? {
                errors.push("username", "This username is already in use.");
            }
            if self.email_exists(&email).await? {
                errors.push("email", "This email is already registered.");
            }
        }

        errors.into_result().map_err(AuthError::Validation)?;

        let password_hash = PasswordService::hash_password(&request.password)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to hash password: {}", e)))?;

        let record = UserRecord {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            role,
            active: true,
            created_at: Utc::now(),
        };

        let created: UserRecord = self
            .store
            .insert("users", json!(record))
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!("Registered {} account {} ({})", role, created.username, created.id);
        Ok(created)
    }

    /// Verify credentials. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<UserRecord, AuthError> {
        debug!("Authenticating user {}", request.username);

        let user = match self.find_by_username(request.username.trim()).await? {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials),
        };

        let verified = PasswordService::verify_password(&request.password, &user.password_hash)
            .map_err(|e| AuthError::DatabaseError(format!("Password verification failed: {}", e)))?;

        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.active {
            return Err(AuthError::Inactive);
        }

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        let query = format!("users?username=eq.{}", urlencoding::encode(username));
        let mut rows: Vec<UserRecord> = self
            .store
            .select(&query)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(rows.pop())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let query = format!("users?email=eq.{}", urlencoding::encode(email));
        let rows: Vec<UserRecord> = self
            .store
            .select(&query)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}
