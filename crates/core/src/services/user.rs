//! User service: registration, token sign-in and admin user management.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use givehub_common::{AppError, AppResult, IdGenerator};
use givehub_db::{
    entities::user::{self, UserRole, UserStatus},
    repositories::{Paged, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public identity of a user embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

/// A signed-in user and the bearer token to send back.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: user::Model,
    pub token: String,
}

/// Input for registering an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "The password must be at least 8 characters."))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,

    pub role: UserRole,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Input for signing in.
#[derive(Debug, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a donor or organizer account and sign it in.
    ///
    /// Admin accounts are provisioned out of band.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        if input.role == UserRole::Admin {
            return Err(AppError::field(
                "role",
                "The selected role is invalid.",
            ));
        }

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            name: Set(input.name.trim().to_string()),
            password_hash: Set(password_hash),
            token: Set(Some(token.clone())),
            role: Set(input.role),
            status: Set(UserStatus::Active),
            is_verified: Set(false),
            organization_id: Set(None),
            phone: Set(input.phone),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, role = ?user.role, "Registered user");

        Ok(AuthSession { user, token })
    }

    /// Check credentials and issue a fresh token.
    pub async fn sign_in(&self, input: SignInInput) -> AppResult<AuthSession> {
        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }
        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        Ok(AuthSession { user, token })
    }

    /// Resolve a bearer token to an active user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        match user.status {
            UserStatus::Active => Ok(user),
            UserStatus::Suspended => Err(AppError::Forbidden("Account is suspended".to_string())),
        }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List users for an admin.
    pub async fn list_users(
        &self,
        actor: &user::Model,
        role: Option<UserRole>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<user::Model>> {
        require_admin(actor)?;
        self.user_repo.list(role, page, per_page).await
    }

    /// Delete a user on behalf of an admin. Admins cannot delete themselves.
    pub async fn delete_user(&self, actor: &user::Model, id: &str) -> AppResult<()> {
        require_admin(actor)?;

        if actor.id == id {
            return Err(AppError::Forbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        if !self.user_repo.delete(id).await? {
            return Err(AppError::UserNotFound(id.to_string()));
        }

        tracing::info!(admin_id = %actor.id, user_id = %id, "Deleted user");
        Ok(())
    }
}

/// Reject anyone but an admin.
pub fn require_admin(user: &user::Model) -> AppResult<()> {
    match user.role {
        UserRole::Admin => Ok(()),
        UserRole::Donor | UserRole::Organizer => {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

/// Reject anyone but an organizer.
pub fn require_organizer(user: &user::Model) -> AppResult<()> {
    match user.role {
        UserRole::Organizer => Ok(()),
        UserRole::Donor | UserRole::Admin => Err(AppError::Forbidden(
            "Only organizers can perform this action".to_string(),
        )),
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use givehub_db::test_utils::user_model;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("anything", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let input = RegisterInput {
            email: "root@example.com".to_string(),
            password: "password123".to_string(),
            name: "Root".to_string(),
            role: UserRole::Admin,
            phone: None,
        };

        let err = service.register(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref fields, .. } if fields.contains_key("role")));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let existing = user_model("u1", UserRole::Donor);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );
        let input = RegisterInput {
            email: "U1@Example.com".to_string(),
            password: "password123".to_string(),
            name: "Someone".to_string(),
            role: UserRole::Donor,
            phone: None,
        };

        let err = service.register(input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_creates_user() {
        let created = user_model("u2", UserRole::Organizer);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );
        let input = RegisterInput {
            email: "u2@example.com".to_string(),
            password: "password123".to_string(),
            name: "Organizer".to_string(),
            role: UserRole::Organizer,
            phone: None,
        };

        let session = service.register(input).await.unwrap();
        assert_eq!(session.user.role, UserRole::Organizer);
        assert_eq!(session.token.len(), 32);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let mut user = user_model("u1", UserRole::Donor);
        user.password_hash = hash_password("right-password").unwrap();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        let err = service
            .sign_in(SignInInput {
                email: "u1@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_suspended() {
        let mut user = user_model("u1", UserRole::Donor);
        user.status = UserStatus::Suspended;
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        let err = service.authenticate_by_token("token-u1").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let admin = user_model("admin1", UserRole::Admin);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let err = service.delete_user(&admin, "admin1").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_deletes_other_user() {
        let admin = user_model("admin1", UserRole::Admin);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]),
        );

        assert!(service.delete_user(&admin, "u9").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let admin = user_model("admin1", UserRole::Admin);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
        );

        let err = service.delete_user(&admin, "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_list_users() {
        let donor = user_model("d1", UserRole::Donor);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        assert!(matches!(
            service.list_users(&donor, None, 1, 15).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
