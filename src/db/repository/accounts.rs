//! Account repository trait: users, player profiles and owner profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{NewUser, OwnerProfile, PlayerProfile, User, UserId};

/// Repository trait for accounts and the profiles hanging off them.
///
/// Also owns the connectivity probes used by `/health` and `db-check`.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Current time as reported by the storage backend.
    async fn server_time(&self) -> RepositoryResult<DateTime<Utc>>;

    // ==================== Users ====================

    /// Insert a new account.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user with its assigned ID
    /// * `Err(RepositoryError::ConflictError)` - If the email is already registered
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no user has this ID
    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User>;

    /// Look up a user by (already normalised) email.
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn update_password_hash(&self, user_id: UserId, password_hash: String)
        -> RepositoryResult<()>;

    /// Replace the account email. Fails with a conflict if it is taken.
    async fn update_email(&self, user_id: UserId, email: String) -> RepositoryResult<()>;

    async fn set_profile_completed(&self, user_id: UserId, completed: bool)
        -> RepositoryResult<()>;

    // ==================== Profiles ====================

    /// Insert or replace the player profile keyed by `profile.user_id`.
    async fn upsert_player_profile(&self, profile: PlayerProfile)
        -> RepositoryResult<PlayerProfile>;

    async fn get_player_profile(&self, user_id: UserId)
        -> RepositoryResult<Option<PlayerProfile>>;

    /// Insert or replace the owner profile. `created_at` is kept on update.
    async fn upsert_owner_profile(
        &self,
        user_id: UserId,
        admin_name: String,
        phone: String,
    ) -> RepositoryResult<OwnerProfile>;

    async fn get_owner_profile(&self, user_id: UserId) -> RepositoryResult<Option<OwnerProfile>>;
}
