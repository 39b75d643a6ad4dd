/// User account service
///
/// Registration, credential checks, profile edits and the password reset
/// lifecycle:
///
/// ```text
/// NoActiveReset --request_password_reset--> ResetPending { hash, expiry }
/// ResetPending --complete_password_reset (success or expired)--> NoActiveReset
/// ResetPending --expiry passes--> treated as NoActiveReset at next use
/// ```
///
/// Plaintext passwords and reset tokens never reach the repository or the
/// log. Only Argon2id hashes and SHA-256 token digests are stored.

use std::sync::{Arc, OnceLock};

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{StoreError, StoreResult, UserRepository};
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::reset_token::{generate_reset_token, hash_reset_token, validate_reset_token_format};
use crate::email::EmailSender;
use crate::models::check_text_column;
use crate::models::user::{
    NewUser, ProfileUpdate, PublicUser, ResetCredential, MAX_EMAIL_LEN, MAX_NAME_LEN,
    MAX_PROFILE_PHOTO_LEN,
};

/// Subject line of the reset email
pub const RESET_EMAIL_SUBJECT: &str = "Password Reset Request";

/// Default lifetime of a reset token
pub const DEFAULT_RESET_TTL_MINUTES: i64 = 60;

/// How reset links are built and how long they stay valid
#[derive(Debug, Clone)]
pub struct ResetSettings {
    /// Base URL of the web client, e.g. `https://app.example.com`
    pub frontend_url: String,
    pub token_ttl: Duration,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            token_ttl: Duration::minutes(DEFAULT_RESET_TTL_MINUTES),
        }
    }
}

impl ResetSettings {
    /// Link the user follows to pick a new password
    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password/{}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }
}

/// Input for a new account
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub country: String,
    pub profile_photo: Option<String>,
}

#[derive(Clone)]
pub struct AccountStore {
    repo: Arc<dyn UserRepository>,
    mailer: Arc<dyn EmailSender>,
    reset: ResetSettings,
}

fn required(field: &str, value: &str, max: usize) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(format!("{} is required", field)));
    }
    check_text_column(field, trimmed, Some(max))?;
    Ok(trimmed.to_string())
}

/// Minimal mailbox shape check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn validated_email(email: &str) -> StoreResult<String> {
    let email = required("Email", email, MAX_EMAIL_LEN)?;
    if !is_valid_email(&email) {
        return Err(StoreError::Validation("Email is invalid".to_string()));
    }
    Ok(email)
}

fn validated_password(password: &str) -> StoreResult<()> {
    validate_password(password).map_err(StoreError::Validation)
}

/// Trims the photo reference; blank means "no photo"
fn validated_photo(photo: Option<String>) -> StoreResult<Option<String>> {
    let photo = photo
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    if let Some(p) = &photo {
        check_text_column("Profile photo", p, Some(MAX_PROFILE_PHOTO_LEN))?;
    }
    Ok(photo)
}

/// Hash verified against when the login email is unknown, so both branches
/// pay for one Argon2 verification
fn dummy_password_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();

    DUMMY
        .get_or_init(|| hash_password("taskboard-unknown-account").ok())
        .as_deref()
}

impl AccountStore {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        mailer: Arc<dyn EmailSender>,
        reset: ResetSettings,
    ) -> Self {
        Self {
            repo,
            mailer,
            reset,
        }
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty name or country, a malformed email or a
    ///   password shorter than six characters
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, registration: Registration) -> StoreResult<PublicUser> {
        let name = required("Name", &registration.name, MAX_NAME_LEN)?;
        let country = required("Country", &registration.country, MAX_NAME_LEN)?;
        let email = validated_email(&registration.email)?;
        let profile_photo = validated_photo(registration.profile_photo)?;
        validated_password(&registration.password)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(StoreError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .repo
            .insert_user(NewUser {
                name,
                email,
                password_hash,
                country,
                profile_photo,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user.to_public())
    }

    /// Checks credentials
    ///
    /// Unknown email and wrong password both yield `StoreError::Auth`, and
    /// both run one password verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> StoreResult<PublicUser> {
        let user = match validated_email(email) {
            Ok(email) => self.repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            if let Some(hash) = dummy_password_hash() {
                let _ = verify_password(password, hash);
            }
            tracing::debug!("Login attempt for unknown email");
            return Err(StoreError::Auth);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(StoreError::Auth);
        }

        Ok(user.to_public())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> StoreResult<PublicUser> {
        self.repo
            .find_by_id(user_id)
            .await?
            .map(|u| u.to_public())
            .ok_or(StoreError::NotFound("User"))
    }

    /// Partially updates name, email, country and photo
    ///
    /// Supplied text fields must be non-empty; a supplied photo replaces the
    /// stored one.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileUpdate,
    ) -> StoreResult<PublicUser> {
        let update = ProfileUpdate {
            name: changes
                .name
                .as_deref()
                .map(|n| required("Name", n, MAX_NAME_LEN))
                .transpose()?,
            email: changes.email.as_deref().map(validated_email).transpose()?,
            country: changes
                .country
                .as_deref()
                .map(|c| required("Country", c, MAX_NAME_LEN))
                .transpose()?,
            profile_photo: validated_photo(changes.profile_photo)?,
        };

        if update.is_empty() {
            return self.get_profile(user_id).await;
        }

        let user = self
            .repo
            .update_profile(user_id, update)
            .await?
            .ok_or(StoreError::NotFound("User"))?;

        tracing::info!(user_id = %user_id, "Profile updated");

        Ok(user.to_public())
    }

    /// Replaces the password after verifying the current one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> StoreResult<()> {
        validated_password(new_password)?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::NotFound("User"))?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(StoreError::Auth);
        }

        let password_hash = hash_password(new_password)?;
        if !self.repo.set_password_hash(user_id, &password_hash).await? {
            return Err(StoreError::NotFound("User"));
        }

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Issues a reset token and emails the reset link
    ///
    /// Any pending reset for the account is replaced.
    ///
    /// # Errors
    ///
    /// - `Validation` if the email is malformed
    /// - `NotFound` if no account has this email
    /// - `Email` if the link could not be delivered
    pub async fn request_password_reset(&self, email: &str) -> StoreResult<()> {
        let email = validated_email(email)?;
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(StoreError::NotFound("User"))?;

        let (token, token_hash) = generate_reset_token();
        let credential = ResetCredential {
            token_hash,
            expires_at: Utc::now() + self.reset.token_ttl,
        };

        if !self.repo.set_reset_credential(user.id, &credential).await? {
            return Err(StoreError::NotFound("User"));
        }

        let body = format!(
            "You requested a password reset. Please click on the link below to reset your password:\n\n{}",
            self.reset.reset_link(&token)
        );

        if let Err(e) = self
            .mailer
            .send_email(&user.email, RESET_EMAIL_SUBJECT, &body)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send reset email");
            return Err(e.into());
        }

        tracing::info!(
            user_id = %user.id,
            expires_at = %credential.expires_at,
            "Password reset requested"
        );

        Ok(())
    }

    /// Sets a new password using a reset token
    ///
    /// The pending credential is consumed by any attempt whose token
    /// matches it, including one that finds it expired.
    ///
    /// # Errors
    ///
    /// - `Validation` if the new password is too short (the token is left
    ///   untouched)
    /// - `InvalidToken` if no pending reset matches
    /// - `ExpiredToken` if the matching reset has expired
    pub async fn complete_password_reset(&self, token: &str, new_password: &str) -> StoreResult<()> {
        validated_password(new_password)?;

        if !validate_reset_token_format(token) {
            return Err(StoreError::InvalidToken);
        }

        let claimed = self
            .repo
            .take_reset_credential(&hash_reset_token(token))
            .await?
            .ok_or(StoreError::InvalidToken)?;

        if claimed.is_expired_at(Utc::now()) {
            tracing::info!(user_id = %claimed.user_id, "Expired reset token presented");
            return Err(StoreError::ExpiredToken);
        }

        let password_hash = hash_password(new_password)?;
        if !self
            .repo
            .set_password_hash(claimed.user_id, &password_hash)
            .await?
        {
            return Err(StoreError::NotFound("User"));
        }

        tracing::info!(user_id = %claimed.user_id, "Password reset completed");
        Ok(())
    }
}
