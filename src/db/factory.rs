//! Repository factory: picks and builds the storage backend at startup.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
#[cfg(feature = "postgres-repo")]
use super::PostgresConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts "postgres", "pg" and "local" (any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Reads `REPOSITORY_TYPE`; when unset, Postgres if a database URL is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or_else(|e| {
                log::warn!("{}; falling back to the local repository", e);
                Self::Local
            });
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

#[cfg(not(feature = "postgres-repo"))]
fn postgres_disabled() -> RepositoryError {
    RepositoryError::configuration("Postgres repository feature not enabled")
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use liga_agil::db::{RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repo = RepositoryFactory::create(RepositoryType::Local, None).await?;
///     assert!(repo.health_check().await?);
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of the given type.
    ///
    /// `postgres_config` is required for [`RepositoryType::Postgres`].
    #[cfg(feature = "postgres-repo")]
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    RepositoryError::configuration("Postgres repository requires PostgresConfig")
                })?;
                let pg = Self::create_postgres(config).await?;
                Ok(pg as Arc<dyn FullRepository>)
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    #[cfg(not(feature = "postgres-repo"))]
    pub async fn create(
        repo_type: RepositoryType,
        _postgres_config: Option<&()>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Postgres => Err(postgres_disabled()),
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a Postgres repository; the pool is built on a blocking thread.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment variables (`REPOSITORY_TYPE`,
    /// `DATABASE_URL` and the `PG_*` pool settings).
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config =
                        PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
                    let pg = Self::create_postgres(&config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(postgres_disabled())
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let pg_config = config.to_postgres_config()?.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Postgres repository requires database configuration",
                        )
                    })?;
                    let pg = Self::create_postgres(&pg_config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(postgres_disabled())
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Build from `repository.toml` when one is found, otherwise from the
    /// environment. The loaded file (if any) is returned alongside.
    pub async fn from_discovered_config(
    ) -> RepositoryResult<(Arc<dyn FullRepository>, Option<RepositoryConfig>)> {
        match RepositoryConfig::discover()? {
            Some(config) => {
                log::info!(
                    "Using repository.toml (type = {})",
                    config.repository.repo_type
                );
                let repo = Self::from_repository_config(&config).await?;
                Ok((repo, Some(config)))
            }
            None => Ok((Self::from_env().await?, None)),
        }
    }
}

/// Fluent builder over [`RepositoryFactory`].
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    #[cfg(feature = "postgres-repo")]
    postgres_config: Option<PostgresConfig>,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            #[cfg(feature = "postgres-repo")]
            postgres_config: None,
        }
    }

    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    #[cfg(feature = "postgres-repo")]
    pub fn postgres_config(mut self, config: PostgresConfig) -> Self {
        self.postgres_config = Some(config);
        self
    }

    pub fn from_config_file<P: AsRef<Path>>(
        mut self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;

        self.repo_type = repo_config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        if self.repo_type == RepositoryType::Postgres {
            #[cfg(feature = "postgres-repo")]
            {
                self.postgres_config = repo_config.to_postgres_config()?;
            }
            #[cfg(not(feature = "postgres-repo"))]
            {
                return Err(postgres_disabled());
            }
        }

        Ok(self)
    }

    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "postgres-repo")]
        {
            RepositoryFactory::create(self.repo_type, self.postgres_config.as_ref()).await
        }
        #[cfg(not(feature = "postgres-repo"))]
        {
            RepositoryFactory::create(self.repo_type, None).await
        }
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("postgres").unwrap(),
            RepositoryType::Postgres
        );
        assert_eq!(
            RepositoryType::from_str(" Pg ").unwrap(),
            RepositoryType::Postgres
        );
        assert!(RepositoryType::from_str("sqlite").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_builder_local_repository() {
        let repo = RepositoryBuilder::new()
            .repository_type(RepositoryType::Local)
            .build()
            .await
            .unwrap();

        assert!(repo.health_check().await.unwrap());
    }

    #[cfg(not(feature = "postgres-repo"))]
    #[tokio::test]
    async fn test_postgres_without_feature_is_configuration_error() {
        let err = RepositoryFactory::create(RepositoryType::Postgres, None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }
}
