//! Registration and credential changes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

use super::{ServiceError, ServiceResult};
use crate::db::repository::AccountRepository;
use crate::models::{NewUser, Role, User, UserId, UserView};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub message: String,
    pub user: UserView,
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| ServiceError::internal(format!("Could not generate salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::internal(format!("Could not hash password: {}", e)))
}

/// Check `password` against a stored PHC hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password_strength(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn check_email_format(email: &str) -> ServiceResult<()> {
    if !email.validate_email() {
        return Err(ServiceError::validation(format!("Invalid email: {}", email)));
    }
    Ok(())
}

pub async fn register<R: AccountRepository + ?Sized>(
    repo: &R,
    name: &str,
    email: &str,
    password: &str,
    role: Option<Role>,
) -> ServiceResult<RegisteredUser> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Name is required"));
    }
    let email = normalize_email(email);
    check_email_format(&email)?;
    check_password_strength(password)?;

    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::conflict("Email is already registered"));
    }

    let user = repo
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash: hash_password(password)?,
            role: role.unwrap_or_default(),
            terms_accepted: true,
        })
        .await?;

    log::info!("Registered user {} as {}", user.id, user.role);

    Ok(RegisteredUser {
        message: "Registration successful".to_string(),
        user: UserView::from(&user),
    })
}

pub async fn get_user<R: AccountRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> ServiceResult<UserView> {
    let user = repo.get_user(user_id).await?;
    Ok(UserView::from(&user))
}

pub async fn change_password<R: AccountRepository + ?Sized>(
    repo: &R,
    user: &User,
    current: &str,
    new: &str,
    confirm: &str,
) -> ServiceResult<()> {
    if !verify_password(current, &user.password_hash) {
        return Err(ServiceError::validation("Current password is incorrect"));
    }
    if new != confirm {
        return Err(ServiceError::validation("New passwords do not match"));
    }
    if new == current {
        return Err(ServiceError::validation(
            "New password must differ from the current one",
        ));
    }
    check_password_strength(new)?;

    repo.update_password_hash(user.id, hash_password(new)?)
        .await?;
    log::info!("User {} changed their password", user.id);
    Ok(())
}

pub async fn change_email<R: AccountRepository + ?Sized>(
    repo: &R,
    user: &User,
    password: &str,
    new_email: &str,
    confirm_email: &str,
) -> ServiceResult<UserView> {
    if !verify_password(password, &user.password_hash) {
        return Err(ServiceError::validation("Password is incorrect"));
    }

    let new_email = normalize_email(new_email);
    if new_email != normalize_email(confirm_email) {
        return Err(ServiceError::validation("Emails do not match"));
    }
    check_email_format(&new_email)?;
    if new_email == user.email {
        return Err(ServiceError::validation(
            "New email must differ from the current one",
        ));
    }
    if repo.find_user_by_email(&new_email).await?.is_some() {
        return Err(ServiceError::conflict("Email is already registered"));
    }

    repo.update_email(user.id, new_email).await?;
    get_user(repo, user.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("supersecret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("supersecret", &hash));
        assert!(!verify_password("supersecreT", &hash));
        assert!(!verify_password("supersecret", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_defaults_role() {
        let repo = LocalRepository::new();
        let registered = register(&repo, " Ana ", "Ana@Example.COM ", "password1", None)
            .await
            .unwrap();
        assert_eq!(registered.user.email, "ana@example.com");
        assert_eq!(registered.user.name, "Ana");
        assert_eq!(registered.user.role, Role::Player);
        assert!(!registered.user.profile_completed);

        let dup = register(&repo, "Other", "ANA@example.com", "password2", None).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let repo = LocalRepository::new();
        let err = register(&repo, "Ana", "ana@example.com", "short", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_change_password_rules() {
        let repo = LocalRepository::new();
        let id = register(&repo, "Ana", "ana@example.com", "password1", None)
            .await
            .unwrap()
            .user
            .id;
        let user = repo.get_user(id).await.unwrap();

        let wrong = change_password(&repo, &user, "nope", "password2", "password2").await;
        assert!(matches!(wrong, Err(ServiceError::Validation(_))));
        let mismatch = change_password(&repo, &user, "password1", "password2", "password3").await;
        assert!(matches!(mismatch, Err(ServiceError::Validation(_))));
        let same = change_password(&repo, &user, "password1", "password1", "password1").await;
        assert!(matches!(same, Err(ServiceError::Validation(_))));

        change_password(&repo, &user, "password1", "password2", "password2")
            .await
            .unwrap();
        let updated = repo.get_user(id).await.unwrap();
        assert!(verify_password("password2", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_change_email_rejects_taken_address() {
        let repo = LocalRepository::new();
        register(&repo, "Bea", "bea@example.com", "password1", None)
            .await
            .unwrap();
        let id = register(&repo, "Ana", "ana@example.com", "password1", None)
            .await
            .unwrap()
            .user
            .id;
        let user = repo.get_user(id).await.unwrap();

        let taken = change_email(
            &repo,
            &user,
            "password1",
            "bea@example.com",
            "bea@example.com",
        )
        .await;
        assert!(matches!(taken, Err(ServiceError::Conflict(_))));

        let view = change_email(&repo, &user, "password1", "New@Example.com", "new@example.com")
            .await
            .unwrap();
        assert_eq!(view.email, "new@example.com");
    }
}
