//! Social feed: posts, comments and likes.

use serde::{Deserialize, Serialize};

use super::{ServiceError, ServiceResult};
use crate::db::repository::PostRepository;
use crate::models::{
    CommentId, CommentView, NewPost, Page, PageRequest, Post, PostChanges, PostId, PostKind,
    PostView, User,
};

pub const MAX_CONTENT_LEN: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub liked: bool,
}

fn clean_content(content: &str) -> ServiceResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation("content is required"));
    }
    if trimmed.chars().count() > MAX_CONTENT_LEN {
        return Err(ServiceError::validation(format!(
            "content is limited to {} characters",
            MAX_CONTENT_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn clean_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

fn ensure_author(post: &Post, user: &User) -> ServiceResult<()> {
    if post.author_id != user.id {
        return Err(ServiceError::forbidden("Only the author can modify this post"));
    }
    Ok(())
}

pub async fn create_post<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    kind: PostKind,
    content: &str,
    image_url: Option<String>,
) -> ServiceResult<PostView> {
    let content = clean_content(content)?;
    let image_url = clean_url(image_url);
    if kind == PostKind::Photo && image_url.is_none() {
        return Err(ServiceError::validation("Photo posts require image_url"));
    }

    let post = repo
        .create_post(NewPost {
            author_id: user.id,
            kind,
            content,
            image_url,
        })
        .await?;
    log::debug!("User {} created post {}", user.id, post.id);

    Ok(repo.get_post_view(post.id).await?)
}

pub async fn list_posts<R: PostRepository + ?Sized>(
    repo: &R,
    page: PageRequest,
) -> ServiceResult<Page<PostView>> {
    Ok(repo.list_posts(page).await?)
}

pub async fn list_user_posts<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    page: PageRequest,
) -> ServiceResult<Page<PostView>> {
    Ok(repo.list_posts_by_author(user.id, page).await?)
}

pub async fn list_liked_posts<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    page: PageRequest,
) -> ServiceResult<Page<PostView>> {
    Ok(repo.list_posts_liked_by(user.id, page).await?)
}

pub async fn get_post<R: PostRepository + ?Sized>(
    repo: &R,
    post_id: PostId,
) -> ServiceResult<PostView> {
    Ok(repo.get_post_view(post_id).await?)
}

/// Author-only partial update. `image_url: Some(None)` clears the image.
pub async fn update_post<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
    content: Option<String>,
    image_url: Option<Option<String>>,
) -> ServiceResult<PostView> {
    let post = repo.get_post(post_id).await?;
    ensure_author(&post, user)?;

    let changes = PostChanges {
        content: content.as_deref().map(clean_content).transpose()?,
        image_url: image_url.map(clean_url),
    };
    let clears_image = matches!(changes.image_url, Some(None));
    if post.kind == PostKind::Photo && clears_image {
        return Err(ServiceError::validation("Photo posts require image_url"));
    }

    repo.update_post(post_id, changes).await?;
    Ok(repo.get_post_view(post_id).await?)
}

pub async fn delete_post<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
) -> ServiceResult<()> {
    let post = repo.get_post(post_id).await?;
    ensure_author(&post, user)?;
    repo.soft_delete_post(post_id).await?;
    log::info!("Post {} deleted by its author", post_id);
    Ok(())
}

pub async fn add_comment<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
    content: &str,
) -> ServiceResult<CommentView> {
    let content = clean_content(content)?;
    repo.get_post(post_id).await?;
    let comment = repo.create_comment(post_id, user.id, content).await?;

    Ok(CommentView {
        comment,
        author_name: user.name.clone(),
        like_count: 0,
    })
}

pub async fn list_comments<R: PostRepository + ?Sized>(
    repo: &R,
    post_id: PostId,
) -> ServiceResult<Vec<CommentView>> {
    repo.get_post(post_id).await?;
    Ok(repo.list_comments(post_id).await?)
}

pub async fn toggle_post_like<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    post_id: PostId,
) -> ServiceResult<LikeToggle> {
    repo.get_post(post_id).await?;
    let liked = repo.toggle_post_like(post_id, user.id).await?;
    Ok(LikeToggle { liked })
}

pub async fn toggle_comment_like<R: PostRepository + ?Sized>(
    repo: &R,
    user: &User,
    comment_id: CommentId,
) -> ServiceResult<LikeToggle> {
    repo.get_comment(comment_id).await?;
    let liked = repo.toggle_comment_like(comment_id, user.id).await?;
    Ok(LikeToggle { liked })
}
