/// User model and database operations
///
/// Users own boards and authenticate by email and password. Passwords are
/// stored as Argon2id hashes, never in plaintext, and the model is never
/// serialized directly: responses go through [`PublicUser`].
///
/// A pending password reset is represented by two columns,
/// `reset_token_hash` and `reset_expires_at`, which are always both set or
/// both null (enforced by a CHECK constraint).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(320) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     country VARCHAR(255) NOT NULL,
///     profile_photo VARCHAR(1024),
///     reset_token_hash VARCHAR(64),
///     reset_expires_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{NewUser, User};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser {
///     name: "Ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     country: "UK".to_string(),
///     profile_photo: None,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;
use uuid::Uuid;

/// Column width of `users.name` and `users.country`
pub const MAX_NAME_LEN: usize = 255;

/// Column width of `users.email`
pub const MAX_EMAIL_LEN: usize = 320;

/// Column width of `users.profile_photo`
pub const MAX_PROFILE_PHOTO_LEN: usize = 1024;

/// User model as stored
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique across users
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// Country
    pub country: String,

    /// Profile photo URL or path, opaque to the store
    pub profile_photo: Option<String>,

    /// SHA-256 hex digest of the pending reset token
    pub reset_token_hash: Option<String>,

    /// Expiry of the pending reset token
    pub reset_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Hashes stay out of logs even when a whole user is traced.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("country", &self.country)
            .field("profile_photo", &self.profile_photo)
            .field("reset_pending", &self.reset_token_hash.is_some())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Public representation of a user
///
/// Serializes to `{ id, name, email, country, profilePhoto }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub country: String,
    pub profile_photo: Option<String>,
}

/// A pending password reset credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCredential {
    /// SHA-256 hex digest of the plaintext token
    pub token_hash: String,

    /// Instant after which the credential is no longer honored
    pub expires_at: DateTime<Utc>,
}

/// Result of consuming a reset credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedReset {
    /// User the credential belonged to
    pub user_id: Uuid,

    /// Expiry the credential carried when it was consumed
    pub expires_at: DateTime<Utc>,
}

impl ClaimedReset {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,
    pub country: String,
    pub profile_photo: Option<String>,
}

/// Partial profile update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub profile_photo: Option<String>,
}

impl ProfileUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.country.is_none()
            && self.profile_photo.is_none()
    }
}

impl User {
    /// Returns the pending reset credential, if any
    pub fn reset_credential(&self) -> Option<ResetCredential> {
        match (&self.reset_token_hash, self.reset_expires_at) {
            (Some(hash), Some(expires_at)) => Some(ResetCredential {
                token_hash: hash.clone(),
                expires_at,
            }),
            _ => None,
        }
    }

    /// Public view without credentials
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            country: self.country.clone(),
            profile_photo: self.profile_photo.clone(),
        }
    }

    /// Builds a fresh user from creation input
    pub fn from_new(data: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            country: data.country,
            profile_photo: data.profile_photo,
            reset_token_hash: None,
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial profile update in place
    pub fn apply_update(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(country) = update.country {
            self.country = country;
        }
        if let Some(photo) = update.profile_photo {
            self.profile_photo = Some(photo);
        }
        self.updated_at = Utc::now();
    }

    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns a database error carrying the `users_email_key` constraint
    /// if the email already exists.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        data: NewUser,
    ) -> Result<Self, sqlx::Error> {
        let user = User::from_new(data);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, country, profile_photo,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, name, email, password_hash, country, profile_photo,
                      reset_token_hash, reset_expires_at, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.country)
        .bind(&user.profile_photo)
        .bind(user.created_at)
        .fetch_one(executor)
        .await
    }

    /// Finds a user by ID
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, country, profile_photo,
                   reset_token_hash, reset_expires_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a user by email address
    pub async fn find_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, country, profile_photo,
                   reset_token_hash, reset_expires_at, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    /// Applies a partial profile update
    ///
    /// `COALESCE` keeps the stored value for every field left as `None`.
    /// Returns `None` if the user doesn't exist.
    pub async fn update_profile<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        data: ProfileUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                country = COALESCE($4, country),
                profile_photo = COALESCE($5, profile_photo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, country, profile_photo,
                      reset_token_hash, reset_expires_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.country)
        .bind(data.profile_photo)
        .fetch_optional(executor)
        .await
    }

    /// Replaces the stored password hash
    ///
    /// Returns true if the user was found.
    pub async fn set_password_hash<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a reset credential, replacing any pending one
    pub async fn set_reset_credential<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        credential: &ResetCredential,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2,
                reset_expires_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&credential.token_hash)
        .bind(credential.expires_at)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes the reset credential whose hash equals `token_hash`
    ///
    /// Clears hash and expiry in a single statement and returns what was
    /// stored, whether or not it has expired. A second call with the same
    /// hash finds nothing.
    pub async fn take_reset_credential<'e>(
        executor: impl PgExecutor<'e>,
        token_hash: &str,
    ) -> Result<Option<ClaimedReset>, sqlx::Error> {
        let row: Option<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            UPDATE users AS u
            SET reset_token_hash = NULL,
                reset_expires_at = NULL,
                updated_at = NOW()
            FROM (
                SELECT id, reset_expires_at
                FROM users
                WHERE reset_token_hash = $1
                FOR UPDATE
            ) AS pending
            WHERE u.id = pending.id
            RETURNING u.id, pending.reset_expires_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|(user_id, expires_at)| ClaimedReset {
            user_id,
            expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        User::from_new(NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            country: "UK".to_string(),
            profile_photo: None,
        })
    }

    #[test]
    fn test_public_view_has_no_credentials() {
        let mut user = sample_user();
        user.reset_token_hash = Some("a".repeat(64));
        user.reset_expires_at = Some(Utc::now());

        let json = serde_json::to_string(&user.to_public()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(!json.contains(&"a".repeat(64)));
        assert!(json.contains("profilePhoto"));
    }

    #[test]
    fn test_debug_redacts_hashes() {
        let user = sample_user();
        let debug = format!("{:?}", user);
        assert!(!debug.contains("argon2"));
        assert!(debug.contains("ada@example.com"));
    }

    #[test]
    fn test_reset_credential_requires_both_parts() {
        let mut user = sample_user();
        assert!(user.reset_credential().is_none());

        user.reset_token_hash = Some("h".to_string());
        assert!(user.reset_credential().is_none());

        user.reset_expires_at = Some(Utc::now() + Duration::hours(1));
        let credential = user.reset_credential().unwrap();
        assert_eq!(credential.token_hash, "h");
        assert!(credential.expires_at > Utc::now());
    }

    #[test]
    fn test_apply_update_is_partial() {
        let mut user = sample_user();
        user.apply_update(ProfileUpdate {
            country: Some("FR".to_string()),
            profile_photo: Some("https://img.example/p.png".to_string()),
            ..Default::default()
        });

        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.country, "FR");
        assert_eq!(user.profile_photo.as_deref(), Some("https://img.example/p.png"));
    }

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate {
            name: Some("x".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
