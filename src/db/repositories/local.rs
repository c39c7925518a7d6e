//! In-memory local repository implementation.
//!
//! Stores every aggregate in ordered maps behind a single lock. Used for
//! development, for the default server build and by the test suites; it
//! enforces the same uniqueness rules as the Postgres schema.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use liga_agil::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.user_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct Counters {
    user: i64,
    court: i64,
    schedule: i64,
    image: i64,
    holiday: i64,
    reservation: i64,
    post: i64,
    comment: i64,
    like: u64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

struct LocalData {
    users: BTreeMap<UserId, User>,
    player_profiles: HashMap<UserId, PlayerProfile>,
    owner_profiles: HashMap<UserId, OwnerProfile>,
    courts: BTreeMap<CourtId, Court>,
    holidays: BTreeMap<NaiveDate, Holiday>,
    reservations: BTreeMap<ReservationId, Reservation>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    // value is a monotonically increasing sequence number for "newest like first"
    post_likes: BTreeMap<(PostId, UserId), u64>,
    comment_likes: BTreeSet<(CommentId, UserId)>,
    counters: Counters,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            player_profiles: HashMap::new(),
            owner_profiles: HashMap::new(),
            courts: BTreeMap::new(),
            holidays: BTreeMap::new(),
            reservations: BTreeMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            post_likes: BTreeMap::new(),
            comment_likes: BTreeSet::new(),
            counters: Counters::default(),
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn live_post(&self, post_id: PostId) -> RepositoryResult<&Post> {
        self.posts
            .get(&post_id)
            .filter(|p| !p.deleted)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Post {} not found", post_id),
                    ErrorContext::default()
                        .with_entity("post")
                        .with_entity_id(post_id),
                )
            })
    }

    fn author_name(&self, user_id: UserId) -> String {
        self.users
            .get(&user_id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    }

    fn post_view(&self, post: &Post) -> PostView {
        let like_count = self
            .post_likes
            .keys()
            .filter(|(pid, _)| *pid == post.id)
            .count() as i64;
        let comment_count = self
            .comments
            .values()
            .filter(|c| c.post_id == post.id && !c.deleted)
            .count() as i64;
        PostView {
            post: post.clone(),
            author_name: self.author_name(post.author_id),
            like_count,
            comment_count,
        }
    }

    fn page_of(&self, posts: Vec<&Post>, page: PageRequest) -> Page<PostView> {
        let total = posts.len() as u64;
        let items = posts
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .map(|p| self.post_view(p))
            .collect();
        Page {
            items,
            pagination: Pagination::new(page, total),
        }
    }

    fn newest_posts(&self, filter: impl Fn(&Post) -> bool) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| !p.deleted && filter(p))
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository; the health flag is kept.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.data.read().reservations.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("In-memory store marked unhealthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn user_not_found(user_id: UserId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("User {} not found", user_id),
        ErrorContext::default()
            .with_entity("user")
            .with_entity_id(user_id),
    )
}

// ==================== Account Repository ====================

#[async_trait]
impl AccountRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn server_time(&self) -> RepositoryResult<DateTime<Utc>> {
        self.check_health()?;
        Ok(Utc::now())
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::conflict_with_context(
                format!("Email {} is already registered", user.email),
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }
        let id = UserId(next_id(&mut data.counters.user));
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            profile_completed: false,
            terms_accepted: user.terms_accepted,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        data.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, user_id: UserId) -> RepositoryResult<User> {
        self.data
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .data
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: String,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        let user = data
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.password_hash = password_hash;
        user.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn update_email(&self, user_id: UserId, email: String) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        if data
            .users
            .values()
            .any(|u| u.id != user_id && u.email == email)
        {
            return Err(RepositoryError::conflict_with_context(
                format!("Email {} is already registered", email),
                ErrorContext::new("update_email")
                    .with_entity("user")
                    .with_entity_id(user_id),
            ));
        }
        let user = data
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.email = email;
        user.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn set_profile_completed(
        &self,
        user_id: UserId,
        completed: bool,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        let user = data
            .users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.profile_completed = completed;
        user.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn upsert_player_profile(
        &self,
        profile: PlayerProfile,
    ) -> RepositoryResult<PlayerProfile> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&profile.user_id) {
            return Err(user_not_found(profile.user_id));
        }
        data.player_profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn get_player_profile(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<PlayerProfile>> {
        Ok(self.data.read().player_profiles.get(&user_id).cloned())
    }

    async fn upsert_owner_profile(
        &self,
        user_id: UserId,
        admin_name: String,
        phone: String,
    ) -> RepositoryResult<OwnerProfile> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&user_id) {
            return Err(user_not_found(user_id));
        }
        let now = Utc::now();
        let created_at = data
            .owner_profiles
            .get(&user_id)
            .map(|p| p.created_at)
            .unwrap_or(now);
        let profile = OwnerProfile {
            user_id,
            admin_name,
            phone,
            created_at,
            updated_at: now,
        };
        data.owner_profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn get_owner_profile(&self, user_id: UserId) -> RepositoryResult<Option<OwnerProfile>> {
        Ok(self.data.read().owner_profiles.get(&user_id).cloned())
    }
}

// ==================== Court Repository ====================

fn newest_courts<'a>(courts: impl Iterator<Item = &'a Court>) -> Vec<Court> {
    let mut out: Vec<Court> = courts.cloned().collect();
    out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    out
}

#[async_trait]
impl CourtRepository for LocalRepository {
    async fn create_court(&self, court: NewCourt) -> RepositoryResult<Court> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&court.owner_id) {
            return Err(user_not_found(court.owner_id));
        }
        let now = Utc::now();
        let id = CourtId(next_id(&mut data.counters.court));

        let images = court
            .image_urls
            .into_iter()
            .enumerate()
            .map(|(position, url)| CourtImage {
                id: ImageId(next_id(&mut data.counters.image)),
                url,
                position: position as i32,
                created_at: now,
            })
            .collect();
        let schedules = court
            .schedules
            .into_iter()
            .map(|s| CourtSchedule {
                id: ScheduleId(next_id(&mut data.counters.schedule)),
                day: s.day,
                start_time: s.start_time,
                end_time: s.end_time,
                interval_minutes: s.interval_minutes,
                available: s.available,
            })
            .collect();

        let stored = Court {
            id,
            owner_id: court.owner_id,
            name: court.name,
            sport: court.sport,
            subtype: court.subtype,
            address: court.address,
            latitude: court.latitude,
            longitude: court.longitude,
            full_address: court.full_address,
            surface: court.surface,
            capacity: court.capacity,
            price_per_hour: court.price_per_hour,
            description: court.description,
            status: court.status,
            images,
            schedules,
            rules: court.rules,
            amenities: court.amenities,
            created_at: now,
            updated_at: now,
        };
        data.courts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_court(&self, court_id: CourtId) -> RepositoryResult<Court> {
        self.data
            .read()
            .courts
            .get(&court_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Court {} not found", court_id),
                    ErrorContext::default()
                        .with_entity("court")
                        .with_entity_id(court_id),
                )
            })
    }

    async fn list_active_courts(&self) -> RepositoryResult<Vec<Court>> {
        let data = self.data.read();
        Ok(newest_courts(
            data.courts
                .values()
                .filter(|c| c.status == CourtStatus::Active),
        ))
    }

    async fn list_courts_by_owner(&self, owner_id: UserId) -> RepositoryResult<Vec<Court>> {
        let data = self.data.read();
        Ok(newest_courts(
            data.courts.values().filter(|c| c.owner_id == owner_id),
        ))
    }

    async fn create_holiday(&self, holiday: NewHoliday) -> RepositoryResult<Holiday> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.holidays.contains_key(&holiday.date) {
            return Err(RepositoryError::conflict_with_context(
                format!("A holiday already exists on {}", holiday.date),
                ErrorContext::new("create_holiday").with_entity("holiday"),
            ));
        }
        let stored = Holiday {
            id: HolidayId(next_id(&mut data.counters.holiday)),
            date: holiday.date,
            name: holiday.name,
            working_day: holiday.working_day,
        };
        data.holidays.insert(stored.date, stored.clone());
        Ok(stored)
    }

    async fn get_holiday(&self, date: NaiveDate) -> RepositoryResult<Option<Holiday>> {
        Ok(self.data.read().holidays.get(&date).cloned())
    }

    async fn list_holidays(&self) -> RepositoryResult<Vec<Holiday>> {
        Ok(self.data.read().holidays.values().cloned().collect())
    }
}

// ==================== Reservation Repository ====================

fn reservation_not_found(reservation_id: ReservationId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Reservation {} not found", reservation_id),
        ErrorContext::default()
            .with_entity("reservation")
            .with_entity_id(reservation_id),
    )
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> RepositoryResult<Reservation> {
        self.check_health()?;
        let mut data = self.data.write();
        let held = data.reservations.values().any(|r| {
            r.status.is_active()
                && r.court_id == reservation.court_id
                && r.date == reservation.date
                && r.start_time == reservation.start_time
        });
        if held && reservation.status.is_active() {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "Slot {} on {} is already booked",
                    format_slot(reservation.start_time),
                    reservation.date
                ),
                ErrorContext::new("create_reservation")
                    .with_entity("court")
                    .with_entity_id(reservation.court_id),
            ));
        }
        let now = Utc::now();
        let stored = Reservation {
            id: ReservationId(next_id(&mut data.counters.reservation)),
            court_id: reservation.court_id,
            user_id: reservation.user_id,
            date: reservation.date,
            start_time: reservation.start_time,
            status: reservation.status,
            created_at: now,
            updated_at: now,
        };
        data.reservations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> RepositoryResult<Reservation> {
        self.data
            .read()
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or_else(|| reservation_not_found(reservation_id))
    }

    async fn list_reservations_for_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Vec<Reservation>> {
        let data = self.data.read();
        let mut out: Vec<Reservation> = data
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| (b.date, b.start_time, b.id).cmp(&(a.date, a.start_time, a.id)));
        Ok(out)
    }

    async fn list_active_reservations(
        &self,
        court_id: CourtId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Reservation>> {
        let data = self.data.read();
        let mut out: Vec<Reservation> = data
            .reservations
            .values()
            .filter(|r| r.court_id == court_id && r.date == date && r.status.is_active())
            .cloned()
            .collect();
        out.sort_by_key(|r| r.start_time);
        Ok(out)
    }

    async fn user_has_active_reservation(
        &self,
        user_id: UserId,
        date: NaiveDate,
        court_id: Option<CourtId>,
    ) -> RepositoryResult<bool> {
        Ok(self.data.read().reservations.values().any(|r| {
            r.user_id == user_id
                && r.date == date
                && r.status.is_active()
                && court_id.map_or(true, |c| c == r.court_id)
        }))
    }

    async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        self.check_health()?;
        let mut data = self.data.write();
        let reservation = data
            .reservations
            .get_mut(&reservation_id)
            .ok_or_else(|| reservation_not_found(reservation_id))?;
        reservation.status = status;
        reservation.updated_at = Utc::now();
        Ok(reservation.clone())
    }

    async fn finish_past_reservations(
        &self,
        user_id: UserId,
        before: NaiveDate,
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        let mut updated = 0;
        for r in data.reservations.values_mut() {
            if r.user_id == user_id
                && r.date < before
                && r.status == ReservationStatus::Confirmed
            {
                r.status = ReservationStatus::Finished;
                r.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

// ==================== Post Repository ====================

#[async_trait]
impl PostRepository for LocalRepository {
    async fn create_post(&self, post: NewPost) -> RepositoryResult<Post> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&post.author_id) {
            return Err(user_not_found(post.author_id));
        }
        let now = Utc::now();
        let stored = Post {
            id: PostId(next_id(&mut data.counters.post)),
            author_id: post.author_id,
            kind: post.kind,
            content: post.content,
            image_url: post.image_url,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        data.posts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_post(&self, post_id: PostId) -> RepositoryResult<Post> {
        self.data.read().live_post(post_id).cloned()
    }

    async fn get_post_view(&self, post_id: PostId) -> RepositoryResult<PostView> {
        let data = self.data.read();
        let post = data.live_post(post_id)?;
        Ok(data.post_view(post))
    }

    async fn update_post(&self, post_id: PostId, changes: PostChanges) -> RepositoryResult<Post> {
        self.check_health()?;
        let mut data = self.data.write();
        data.live_post(post_id)?;
        let post = data
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| RepositoryError::not_found(format!("Post {} not found", post_id)))?;
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(image_url) = changes.image_url {
            post.image_url = image_url;
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn soft_delete_post(&self, post_id: PostId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        data.live_post(post_id)?;
        if let Some(post) = data.posts.get_mut(&post_id) {
            post.deleted = true;
            post.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_posts(&self, page: PageRequest) -> RepositoryResult<Page<PostView>> {
        let data = self.data.read();
        let posts = data.newest_posts(|_| true);
        Ok(data.page_of(posts, page))
    }

    async fn list_posts_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> RepositoryResult<Page<PostView>> {
        let data = self.data.read();
        let posts = data.newest_posts(|p| p.author_id == author_id);
        Ok(data.page_of(posts, page))
    }

    async fn list_posts_liked_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepositoryResult<Page<PostView>> {
        let data = self.data.read();
        let mut liked: Vec<(u64, &Post)> = data
            .post_likes
            .iter()
            .filter(|((_, uid), _)| *uid == user_id)
            .filter_map(|((pid, _), seq)| {
                data.posts
                    .get(pid)
                    .filter(|p| !p.deleted)
                    .map(|p| (*seq, p))
            })
            .collect();
        liked.sort_by(|a, b| b.0.cmp(&a.0));
        let posts = liked.into_iter().map(|(_, p)| p).collect();
        Ok(data.page_of(posts, page))
    }

    async fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: String,
    ) -> RepositoryResult<Comment> {
        self.check_health()?;
        let mut data = self.data.write();
        data.live_post(post_id)?;
        let comment = Comment {
            id: CommentId(next_id(&mut data.counters.comment)),
            post_id,
            author_id,
            content,
            deleted: false,
            created_at: Utc::now(),
        };
        data.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: CommentId) -> RepositoryResult<Comment> {
        self.data
            .read()
            .comments
            .get(&comment_id)
            .filter(|c| !c.deleted)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Comment {} not found", comment_id),
                    ErrorContext::default()
                        .with_entity("comment")
                        .with_entity_id(comment_id),
                )
            })
    }

    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<CommentView>> {
        let data = self.data.read();
        data.live_post(post_id)?;
        // BTreeMap order by id is creation order
        Ok(data
            .comments
            .values()
            .filter(|c| c.post_id == post_id && !c.deleted)
            .map(|c| CommentView {
                comment: c.clone(),
                author_name: data.author_name(c.author_id),
                like_count: data
                    .comment_likes
                    .iter()
                    .filter(|(cid, _)| *cid == c.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn toggle_post_like(&self, post_id: PostId, user_id: UserId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        data.live_post(post_id)?;
        if data.post_likes.remove(&(post_id, user_id)).is_some() {
            return Ok(false);
        }
        data.counters.like += 1;
        let seq = data.counters.like;
        data.post_likes.insert((post_id, user_id), seq);
        Ok(true)
    }

    async fn toggle_comment_like(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data
            .comments
            .get(&comment_id)
            .is_some_and(|c| !c.deleted)
        {
            return Err(RepositoryError::not_found(format!(
                "Comment {} not found",
                comment_id
            )));
        }
        if data.comment_likes.remove(&(comment_id, user_id)) {
            return Ok(false);
        }
        data.comment_likes.insert((comment_id, user_id));
        Ok(true)
    }
}
