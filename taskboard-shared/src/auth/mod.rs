/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password length policy
/// - [`jwt`]: JWT session token generation and validation
/// - [`reset_token`]: Password reset token generation and hashing
/// - [`middleware`]: Bearer token resolution into an `AuthContext`
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4()), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod reset_token;
