//! Post repository trait: posts, comments and likes.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    Comment, CommentId, CommentView, NewPost, Page, PageRequest, Post, PostChanges, PostId,
    PostView, UserId,
};

/// Repository trait for the social feed.
///
/// Soft-deleted posts and comments behave as missing for every read.
#[async_trait]
pub trait PostRepository: Send + Sync {
    // ==================== Posts ====================

    async fn create_post(&self, post: NewPost) -> RepositoryResult<Post>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the post doesn't exist or was deleted
    async fn get_post(&self, post_id: PostId) -> RepositoryResult<Post>;

    /// Post with author name and counters.
    async fn get_post_view(&self, post_id: PostId) -> RepositoryResult<PostView>;

    async fn update_post(&self, post_id: PostId, changes: PostChanges) -> RepositoryResult<Post>;

    async fn soft_delete_post(&self, post_id: PostId) -> RepositoryResult<()>;

    /// Feed page, newest post first.
    async fn list_posts(&self, page: PageRequest) -> RepositoryResult<Page<PostView>>;

    async fn list_posts_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> RepositoryResult<Page<PostView>>;

    /// Posts liked by the user, most recent like first.
    async fn list_posts_liked_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> RepositoryResult<Page<PostView>>;

    // ==================== Comments ====================

    async fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: String,
    ) -> RepositoryResult<Comment>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the comment doesn't exist or was deleted
    async fn get_comment(&self, comment_id: CommentId) -> RepositoryResult<Comment>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<CommentView>>;

    // ==================== Likes ====================

    /// Add the like if absent, remove it otherwise.
    ///
    /// # Returns
    /// * `Ok(true)` - A like was added
    /// * `Ok(false)` - An existing like was removed
    async fn toggle_post_like(&self, post_id: PostId, user_id: UserId) -> RepositoryResult<bool>;

    async fn toggle_comment_like(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> RepositoryResult<bool>;
}
