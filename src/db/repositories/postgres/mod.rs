//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Embedded migrations run on startup
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
//!
//! Slot exclusivity is enforced by the partial unique index
//! `reservations_active_slot_idx`; a violation surfaces as
//! [`RepositoryError::ConflictError`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    AccountRepository, CourtRepository, ErrorContext, PostRepository, RepositoryError,
    RepositoryResult, ReservationRepository,
};
use crate::models::*;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const ACTIVE_STATUSES: [&str; 2] = ["pending", "confirmed"];

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables (see module docs).
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Build the pool and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        for version in applied {
            log::info!("Applied migration {}", version);
        }
        Ok(())
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying
    /// retryable failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            log::warn!("{}; retrying", err);
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("{}; retrying", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Returns `(is_healthy, latency_ms, error_message)`.
    pub async fn health_check_detailed(&self) -> (bool, u64, Option<String>) {
        let start = Instant::now();
        let outcome = self.health_check().await;
        let latency = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(true) => (true, latency, None),
            Ok(false) => (false, latency, Some("Health check returned false".to_string())),
            Err(e) => (false, latency, Some(e.to_string())),
        }
    }
}

// ==================== Row assembly helpers ====================

fn load_courts(conn: &mut PgConnection, rows: Vec<CourtRow>) -> RepositoryResult<Vec<Court>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut children: HashMap<i64, CourtChildren> = HashMap::new();

    let images: Vec<CourtImageRow> = court_images::table
        .filter(court_images::court_id.eq_any(&ids))
        .order((court_images::court_id, court_images::position))
        .select(CourtImageRow::as_select())
        .load(conn)?;
    for row in images {
        children.entry(row.court_id).or_default().images.push(row.into());
    }

    let schedules: Vec<CourtScheduleRow> = court_schedules::table
        .filter(court_schedules::court_id.eq_any(&ids))
        .order((court_schedules::court_id, court_schedules::id))
        .select(CourtScheduleRow::as_select())
        .load(conn)?;
    for row in schedules {
        let court_id = row.court_id;
        let schedule = row.into_domain()?;
        children.entry(court_id).or_default().schedules.push(schedule);
    }

    let rules: Vec<CourtRuleRow> = court_rules::table
        .filter(court_rules::court_id.eq_any(&ids))
        .order((court_rules::court_id, court_rules::position))
        .select(CourtRuleRow::as_select())
        .load(conn)?;
    for row in rules {
        children.entry(row.court_id).or_default().rules.push(row.rule);
    }

    let amenities: Vec<CourtAmenityRow> = court_amenities::table
        .filter(court_amenities::court_id.eq_any(&ids))
        .order((court_amenities::court_id, court_amenities::position))
        .select(CourtAmenityRow::as_select())
        .load(conn)?;
    for row in amenities {
        children
            .entry(row.court_id)
            .or_default()
            .amenities
            .push(row.amenity);
    }

    rows.into_iter()
        .map(|row| {
            let kids = children.remove(&row.id).unwrap_or_default();
            row.assemble(kids)
        })
        .collect()
}

fn author_names(conn: &mut PgConnection, ids: &[i64]) -> RepositoryResult<HashMap<i64, String>> {
    let names: Vec<(i64, String)> = users::table
        .filter(users::id.eq_any(ids))
        .select((users::id, users::name))
        .load(conn)?;
    Ok(names.into_iter().collect())
}

fn post_views(conn: &mut PgConnection, rows: Vec<PostRow>) -> RepositoryResult<Vec<PostView>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let author_ids: Vec<i64> = rows.iter().map(|r| r.author_id).collect();
    let names = author_names(conn, &author_ids)?;

    let likes: HashMap<i64, i64> = post_likes::table
        .filter(post_likes::post_id.eq_any(&ids))
        .group_by(post_likes::post_id)
        .select((post_likes::post_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let comments: HashMap<i64, i64> = post_comments::table
        .filter(post_comments::post_id.eq_any(&ids))
        .filter(post_comments::deleted.eq(false))
        .group_by(post_comments::post_id)
        .select((post_comments::post_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            let author_name = names.get(&row.author_id).cloned().unwrap_or_default();
            Ok(PostView {
                post: row.into_domain()?,
                author_name,
                like_count: likes.get(&id).copied().unwrap_or(0),
                comment_count: comments.get(&id).copied().unwrap_or(0),
            })
        })
        .collect()
}

fn to_page(
    conn: &mut PgConnection,
    rows: Vec<PostRow>,
    total: i64,
    page: PageRequest,
) -> RepositoryResult<Page<PostView>> {
    Ok(Page {
        items: post_views(conn, rows)?,
        pagination: Pagination::new(page, total.max(0) as u64),
    })
}

fn live_post_exists(conn: &mut PgConnection, post_id: i64) -> RepositoryResult<()> {
    posts::table
        .filter(posts::id.eq(post_id))
        .filter(posts::deleted.eq(false))
        .select(posts::id)
        .first::<i64>(conn)
        .optional()?
        .map(|_| ())
        .ok_or_else(|| post_not_found(PostId(post_id)))
}

fn post_not_found(post_id: PostId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Post {} not found", post_id),
        ErrorContext::default()
            .with_entity("post")
            .with_entity_id(post_id),
    )
}

fn not_found(entity: &str, id: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("{} {} not found", entity, id),
        ErrorContext::default()
            .with_entity(entity.to_lowercase())
            .with_entity_id(id),
    )
}

// ==================== Account Repository ====================

#[async_trait]
impl AccountRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn server_time(&self) -> RepositoryResult<DateTime<Utc>> {
        self.with_conn(|conn| {
            let row: ServerTimeRow = sql_query("SELECT now() AS now").get_result(conn)?;
            Ok(row.now)
        })
        .await
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let row = NewUserRow::from(user);
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_user"))?
                .into_domain()
        })
        .await
    }

    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            users::table
                .find(user_id.value())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()?
                .ok_or_else(|| not_found("User", user_id))?
                .into_domain()
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            users::table
                .filter(users::email.eq(&email))
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()?
                .map(UserRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: String,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(users::table.find(user_id.value()))
                .set((
                    users::password_hash.eq(&password_hash),
                    users::updated_at.eq(Some(Utc::now())),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(not_found("User", user_id));
            }
            Ok(())
        })
        .await
    }

    async fn update_email(&self, user_id: UserId, email: String) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(users::table.find(user_id.value()))
                .set((
                    users::email.eq(&email),
                    users::updated_at.eq(Some(Utc::now())),
                ))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("update_email"))?;
            if updated == 0 {
                return Err(not_found("User", user_id));
            }
            Ok(())
        })
        .await
    }

    async fn set_profile_completed(
        &self,
        user_id: UserId,
        completed: bool,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(users::table.find(user_id.value()))
                .set((
                    users::profile_completed.eq(completed),
                    users::updated_at.eq(Some(Utc::now())),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(not_found("User", user_id));
            }
            Ok(())
        })
        .await
    }

    async fn upsert_player_profile(
        &self,
        profile: PlayerProfile,
    ) -> RepositoryResult<PlayerProfile> {
        let row = PlayerProfileRow::from(&profile);
        self.with_conn(move |conn| {
            diesel::insert_into(player_profiles::table)
                .values(&row)
                .on_conflict(player_profiles::user_id)
                .do_update()
                .set(&row)
                .returning(PlayerProfileRow::as_returning())
                .get_result::<PlayerProfileRow>(conn)?
                .into_domain()
        })
        .await
    }

    async fn get_player_profile(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<PlayerProfile>> {
        self.with_conn(move |conn| {
            player_profiles::table
                .find(user_id.value())
                .select(PlayerProfileRow::as_select())
                .first::<PlayerProfileRow>(conn)
                .optional()?
                .map(PlayerProfileRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn upsert_owner_profile(
        &self,
        user_id: UserId,
        admin_name: String,
        phone: String,
    ) -> RepositoryResult<OwnerProfile> {
        let row = NewOwnerProfileRow {
            user_id: user_id.value(),
            admin_name,
            phone,
            updated_at: Utc::now(),
        };
        self.with_conn(move |conn| {
            let stored: OwnerProfileRow = diesel::insert_into(owner_profiles::table)
                .values(&row)
                .on_conflict(owner_profiles::user_id)
                .do_update()
                .set((
                    owner_profiles::admin_name.eq(excluded(owner_profiles::admin_name)),
                    owner_profiles::phone.eq(excluded(owner_profiles::phone)),
                    owner_profiles::updated_at.eq(excluded(owner_profiles::updated_at)),
                ))
                .returning(OwnerProfileRow::as_returning())
                .get_result(conn)?;
            Ok(stored.into())
        })
        .await
    }

    async fn get_owner_profile(&self, user_id: UserId) -> RepositoryResult<Option<OwnerProfile>> {
        self.with_conn(move |conn| {
            Ok(owner_profiles::table
                .find(user_id.value())
                .select(OwnerProfileRow::as_select())
                .first::<OwnerProfileRow>(conn)
                .optional()?
                .map(OwnerProfile::from))
        })
        .await
    }
}

// ==================== Court Repository ====================

#[async_trait]
impl CourtRepository for PostgresRepository {
    async fn create_court(&self, court: NewCourt) -> RepositoryResult<Court> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let inserted: CourtRow = diesel::insert_into(courts::table)
                    .values(NewCourtRow::from(&court))
                    .returning(CourtRow::as_returning())
                    .get_result(tx)?;
                let court_id = inserted.id;

                let images: Vec<NewCourtImageRow> = court
                    .image_urls
                    .iter()
                    .enumerate()
                    .map(|(position, url)| NewCourtImageRow {
                        court_id,
                        url: url.clone(),
                        position: position as i32,
                    })
                    .collect();
                if !images.is_empty() {
                    diesel::insert_into(court_images::table)
                        .values(&images)
                        .execute(tx)?;
                }

                let schedules: Vec<NewCourtScheduleRow> = court
                    .schedules
                    .iter()
                    .map(|s| NewCourtScheduleRow::new(court_id, s))
                    .collect();
                if !schedules.is_empty() {
                    diesel::insert_into(court_schedules::table)
                        .values(&schedules)
                        .execute(tx)?;
                }

                let rules: Vec<NewCourtRuleRow> = court
                    .rules
                    .iter()
                    .enumerate()
                    .map(|(position, rule)| NewCourtRuleRow {
                        court_id,
                        rule: rule.clone(),
                        position: position as i32,
                    })
                    .collect();
                if !rules.is_empty() {
                    diesel::insert_into(court_rules::table)
                        .values(&rules)
                        .execute(tx)?;
                }

                let amenities: Vec<NewCourtAmenityRow> = court
                    .amenities
                    .iter()
                    .enumerate()
                    .map(|(position, amenity)| NewCourtAmenityRow {
                        court_id,
                        amenity: amenity.clone(),
                        position: position as i32,
                    })
                    .collect();
                if !amenities.is_empty() {
                    diesel::insert_into(court_amenities::table)
                        .values(&amenities)
                        .execute(tx)?;
                }

                load_courts(tx, vec![inserted])?
                    .pop()
                    .ok_or_else(|| RepositoryError::internal("inserted court vanished"))
            })
        })
        .await
    }

    async fn get_court(&self, court_id: CourtId) -> RepositoryResult<Court> {
        self.with_conn(move |conn| {
            let row = courts::table
                .find(court_id.value())
                .select(CourtRow::as_select())
                .first::<CourtRow>(conn)
                .optional()?
                .ok_or_else(|| not_found("Court", court_id))?;
            load_courts(conn, vec![row])?
                .pop()
                .ok_or_else(|| not_found("Court", court_id))
        })
        .await
    }

    async fn list_active_courts(&self) -> RepositoryResult<Vec<Court>> {
        self.with_conn(|conn| {
            let rows = courts::table
                .filter(courts::status.eq(CourtStatus::Active.as_str()))
                .order((courts::created_at.desc(), courts::id.desc()))
                .select(CourtRow::as_select())
                .load::<CourtRow>(conn)?;
            load_courts(conn, rows)
        })
        .await
    }

    async fn list_courts_by_owner(&self, owner_id: UserId) -> RepositoryResult<Vec<Court>> {
        self.with_conn(move |conn| {
            let rows = courts::table
                .filter(courts::owner_id.eq(owner_id.value()))
                .order((courts::created_at.desc(), courts::id.desc()))
                .select(CourtRow::as_select())
                .load::<CourtRow>(conn)?;
            load_courts(conn, rows)
        })
        .await
    }

    async fn create_holiday(&self, holiday: NewHoliday) -> RepositoryResult<Holiday> {
        let row = NewHolidayRow {
            date: holiday.date,
            name: holiday.name,
            working_day: holiday.working_day,
        };
        self.with_conn(move |conn| {
            let stored: HolidayRow = diesel::insert_into(holidays::table)
                .values(&row)
                .returning(HolidayRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_holiday"))?;
            Ok(stored.into())
        })
        .await
    }

    async fn get_holiday(&self, date: NaiveDate) -> RepositoryResult<Option<Holiday>> {
        self.with_conn(move |conn| {
            Ok(holidays::table
                .filter(holidays::date.eq(date))
                .select(HolidayRow::as_select())
                .first::<HolidayRow>(conn)
                .optional()?
                .map(Holiday::from))
        })
        .await
    }

    async fn list_holidays(&self) -> RepositoryResult<Vec<Holiday>> {
        self.with_conn(|conn| {
            Ok(holidays::table
                .order(holidays::date)
                .select(HolidayRow::as_select())
                .load::<HolidayRow>(conn)?
                .into_iter()
                .map(Holiday::from)
                .collect())
        })
        .await
    }
}

// ==================== Reservation Repository ====================

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> RepositoryResult<Reservation> {
        let row = NewReservationRow::from(&reservation);
        self.with_conn(move |conn| {
            diesel::insert_into(reservations::table)
                .values(&row)
                .returning(ReservationRow::as_returning())
                .get_result::<ReservationRow>(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_reservation"))?
                .into_domain()
        })
        .await
    }

    async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            reservations::table
                .find(reservation_id.value())
                .select(ReservationRow::as_select())
                .first::<ReservationRow>(conn)
                .optional()?
                .ok_or_else(|| not_found("Reservation", reservation_id))?
                .into_domain()
        })
        .await
    }

    async fn list_reservations_for_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(move |conn| {
            reservations::table
                .filter(reservations::user_id.eq(user_id.value()))
                .order((
                    reservations::date.desc(),
                    reservations::start_time.desc(),
                    reservations::id.desc(),
                ))
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(conn)?
                .into_iter()
                .map(ReservationRow::into_domain)
                .collect()
        })
        .await
    }

    async fn list_active_reservations(
        &self,
        court_id: CourtId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(move |conn| {
            reservations::table
                .filter(reservations::court_id.eq(court_id.value()))
                .filter(reservations::date.eq(date))
                .filter(reservations::status.eq_any(ACTIVE_STATUSES))
                .order(reservations::start_time)
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(conn)?
                .into_iter()
                .map(ReservationRow::into_domain)
                .collect()
        })
        .await
    }

    async fn user_has_active_reservation(
        &self,
        user_id: UserId,
        date: NaiveDate,
        court_id: Option<CourtId>,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let mut query = reservations::table
                .filter(reservations::user_id.eq(user_id.value()))
                .filter(reservations::date.eq(date))
                .filter(reservations::status.eq_any(ACTIVE_STATUSES))
                .into_boxed();
            if let Some(court_id) = court_id {
                query = query.filter(reservations::court_id.eq(court_id.value()));
            }
            let count: i64 = query.count().get_result(conn)?;
            Ok(count > 0)
        })
        .await
    }

    async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            diesel::update(reservations::table.find(reservation_id.value()))
                .set((
                    reservations::status.eq(status.as_str()),
                    reservations::updated_at.eq(Utc::now()),
                ))
                .returning(ReservationRow::as_returning())
                .get_result::<ReservationRow>(conn)
                .optional()?
                .ok_or_else(|| not_found("Reservation", reservation_id))?
                .into_domain()
        })
        .await
    }

    async fn finish_past_reservations(
        &self,
        user_id: UserId,
        before: NaiveDate,
    ) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            Ok(diesel::update(
                reservations::table
                    .filter(reservations::user_id.eq(user_id.value()))
                    .filter(reservations::date.lt(before))
                    .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str())),
            )
            .set((
                reservations::status.eq(ReservationStatus::Finished.as_str()),
                reservations::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?)
        })
        .await
    }
}

// ==================== Post Repository ====================

#[async_trait]
impl PostRepository for PostgresRepository {
    async fn create_post(&self, post: NewPost) -> RepositoryResult<Post> {
        let row = NewPostRow::from(&post);
        self.with_conn(move |conn| {
            diesel::insert_into(posts::table)
                .values(&row)
                .returning(PostRow::as_returning())
                .get_result::<PostRow>(conn)?
                .into_domain()
        })
        .await
    }

    async fn get_post(&self, post_id: PostId) -> RepositoryResult<Post> {
        self.with_conn(move |conn| {
            posts::table
                .filter(posts::id.eq(post_id.value()))
                .filter(posts::deleted.eq(false))
                .select(PostRow::as_select())
                .first::<PostRow>(conn)
                .optional()?
                .ok_or_else(|| post_not_found(post_id))?
                .into_domain()
        })
        .await
    }

    async fn get_post_view(&self, post_id: PostId) -> RepositoryResult<PostView> {
        self.with_conn(move |conn| {
            let row = posts::table
                .filter(posts::id.eq(post_id.value()))
                .filter(posts::deleted.eq(false))
                .select(PostRow::as_select())
                .first::<PostRow>(conn)
                .optional()?
                .ok_or_else(|| post_not_found(post_id))?;
            post_views(conn, vec![row])?
                .pop()
                .ok_or_else(|| post_not_found(post_id))
        })
        .await
    }

    async fn update_post(&self, post_id: PostId, changes: PostChanges) -> RepositoryResult<Post> {
        let changeset = PostChangeset::from(changes);
        self.with_conn(move |conn| {
            diesel::update(
                posts::table
                    .filter(posts::id.eq(post_id.value()))
                    .filter(posts::deleted.eq(false)),
            )
            .set(&changeset)
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(conn)
            .optional()?
            .ok_or_else(|| post_not_found(post_id))?
            .into_domain()
        })
        .await
    }

    async fn soft_delete_post(&self, post_id: PostId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(
                posts::table
                    .filter(posts::id.eq(post_id.value()))
                    .filter(posts::deleted.eq(false)),
            )
            .set((posts::deleted.eq(true), posts::updated_at.eq(Utc::now())))
            .execute(conn)?;
            if updated == 0 {
                return Err(post_not_found(post_id));
            }
            Ok(())
        })
        .await
    }

    async fn list_posts(&self, page: PageRequest) -> RepositoryResult<Page<PostView>> {
        self.with_conn(move |conn| {
            let total: i64 = posts::table
                .filter(posts::deleted.eq(false))
                .count()
                .get_result(conn)?;
            let rows = posts::table
                .filter(posts::deleted.eq(false))
                .order((posts::created_at.desc(), posts::id.desc()))
                .limit(i64::from(page.per_page))
                .offset(page.offset() as i64)
                .select(PostRow::as_select())
                .load::<PostRow>(conn)?;
            to_page(conn, rows, total, page)
        })
        .await
    }

    async fn list_posts_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> RepositoryResult<Page<PostView>> {
        self.with_conn(move |conn| {
            let total: i64 = posts::table
                .filter(posts::author_id.eq(author_id.value()))
                .filter(posts::deleted.eq(false))
                .count()
                .get_result(conn)?;
            let rows = posts::table
                .filter(posts::author_id.eq(author_id.value()))
                .filter(posts::deleted.eq(false))
                .order((posts::created_at.desc(), posts::id.desc()))
                .limit(i64::from(page.per_page))
                .offset(page.offset() as i64)
                .select(PostRow::as_select())
                .load::<PostRow>(conn)?;
            to_page(conn, rows, total, page)
        })
        .await
    }

    async fn list_posts_liked_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepositoryResult<Page<PostView>> {
        self.with_conn(move |conn| {
            let total: i64 = post_likes::table
                .inner_join(posts::table)
                .filter(post_likes::user_id.eq(user_id.value()))
                .filter(posts::deleted.eq(false))
                .count()
                .get_result(conn)?;
            let rows = post_likes::table
                .inner_join(posts::table)
                .filter(post_likes::user_id.eq(user_id.value()))
                .filter(posts::deleted.eq(false))
                .order((post_likes::created_at.desc(), posts::id.desc()))
                .limit(i64::from(page.per_page))
                .offset(page.offset() as i64)
                .select(PostRow::as_select())
                .load::<PostRow>(conn)?;
            to_page(conn, rows, total, page)
        })
        .await
    }

    async fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: String,
    ) -> RepositoryResult<Comment> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                live_post_exists(tx, post_id.value())?;
                let row: CommentRow = diesel::insert_into(post_comments::table)
                    .values(NewCommentRow {
                        post_id: post_id.value(),
                        author_id: author_id.value(),
                        content: content.clone(),
                    })
                    .returning(CommentRow::as_returning())
                    .get_result(tx)?;
                Ok(row.into())
            })
        })
        .await
    }

    async fn get_comment(&self, comment_id: CommentId) -> RepositoryResult<Comment> {
        self.with_conn(move |conn| {
            let row = post_comments::table
                .filter(post_comments::id.eq(comment_id.value()))
                .filter(post_comments::deleted.eq(false))
                .select(CommentRow::as_select())
                .first::<CommentRow>(conn)
                .optional()?
                .ok_or_else(|| not_found("Comment", comment_id))?;
            Ok(row.into())
        })
        .await
    }

    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<CommentView>> {
        self.with_conn(move |conn| {
            live_post_exists(conn, post_id.value())?;
            let rows = post_comments::table
                .filter(post_comments::post_id.eq(post_id.value()))
                .filter(post_comments::deleted.eq(false))
                .order((post_comments::created_at.asc(), post_comments::id.asc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(conn)?;

            let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
            let author_ids: Vec<i64> = rows.iter().map(|r| r.author_id).collect();
            let names = author_names(conn, &author_ids)?;
            let likes: HashMap<i64, i64> = comment_likes::table
                .filter(comment_likes::comment_id.eq_any(&ids))
                .group_by(comment_likes::comment_id)
                .select((comment_likes::comment_id, count_star()))
                .load::<(i64, i64)>(conn)?
                .into_iter()
                .collect();

            Ok(rows
                .into_iter()
                .map(|row| CommentView {
                    author_name: names.get(&row.author_id).cloned().unwrap_or_default(),
                    like_count: likes.get(&row.id).copied().unwrap_or(0),
                    comment: row.into(),
                })
                .collect())
        })
        .await
    }

    async fn toggle_post_like(&self, post_id: PostId, user_id: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                live_post_exists(tx, post_id.value())?;
                let removed = diesel::delete(
                    post_likes::table
                        .filter(post_likes::post_id.eq(post_id.value()))
                        .filter(post_likes::user_id.eq(user_id.value())),
                )
                .execute(tx)?;
                if removed > 0 {
                    return Ok(false);
                }
                diesel::insert_into(post_likes::table)
                    .values(NewPostLikeRow {
                        post_id: post_id.value(),
                        user_id: user_id.value(),
                    })
                    .execute(tx)?;
                Ok(true)
            })
        })
        .await
    }

    async fn toggle_comment_like(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                post_comments::table
                    .filter(post_comments::id.eq(comment_id.value()))
                    .filter(post_comments::deleted.eq(false))
                    .select(post_comments::id)
                    .first::<i64>(tx)
                    .optional()?
                    .ok_or_else(|| not_found("Comment", comment_id))?;
                let removed = diesel::delete(
                    comment_likes::table
                        .filter(comment_likes::comment_id.eq(comment_id.value()))
                        .filter(comment_likes::user_id.eq(user_id.value())),
                )
                .execute(tx)?;
                if removed > 0 {
                    return Ok(false);
                }
                diesel::insert_into(comment_likes::table)
                    .values(NewCommentLikeRow {
                        comment_id: comment_id.value(),
                        user_id: user_id.value(),
                    })
                    .execute(tx)?;
                Ok(true)
            })
        })
        .await
    }
}
