use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{Comment, CreateCommentRequest, Thread, ThreadCounter, UserCounter},
};

async fn find_thread(state: &AppState, category: &str, thread_slug: &str) -> Result<Thread> {
    state
        .threads
        .get(category)?
        .get(thread_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("thread not found".to_string()))
}

/// Adds a comment, then bumps the thread's comment count and the author's
/// `num.comments`. Each step is its own update.
pub async fn create_comment(
    state: &AppState,
    author: &AuthUser,
    category: &str,
    thread_slug: &str,
    request: CreateCommentRequest,
) -> Result<Comment> {
    request.validate_for_save()?;
    let thread = find_thread(state, category, thread_slug).await?;

    let comment = Comment::new(request, thread.id, author.user_id, &author.username)?;
    state.comments.create(&comment).await?;

    state
        .threads
        .get(category)?
        .inc_counter(thread_slug, ThreadCounter::Comments, 1)
        .await?;
    state
        .users
        .inc_counter(&author.username, UserCounter::NumComments, 1)
        .await?;

    tracing::info!(
        "{} commented {} on thread {}",
        author.username,
        comment.slug_id,
        thread_slug
    );

    Ok(comment)
}

pub async fn get_comment(
    state: &AppState,
    category: &str,
    thread_slug: &str,
    comment_slug: &str,
) -> Result<Comment> {
    let thread = find_thread(state, category, thread_slug).await?;

    state
        .comments
        .get(comment_slug)
        .await?
        .filter(|comment| comment.thread_id == thread.id)
        .ok_or_else(|| AppError::NotFound("comment not found".to_string()))
}

pub async fn list_comments(
    state: &AppState,
    category: &str,
    thread_slug: &str,
    from: i64,
    size: i64,
) -> Result<Vec<Comment>> {
    let thread = find_thread(state, category, thread_slug).await?;
    state.comments.list_by_thread(thread.id, from, size).await
}

pub async fn list_user_comments(
    state: &AppState,
    username: &str,
    from: i64,
    size: i64,
) -> Result<Vec<Comment>> {
    state.comments.list_by_username(username, from, size).await
}

pub async fn delete_comment(
    state: &AppState,
    caller: &AuthUser,
    category: &str,
    thread_slug: &str,
    comment_slug: &str,
) -> Result<()> {
    let comment = get_comment(state, category, thread_slug, comment_slug).await?;

    if comment.user_id != caller.user_id {
        return Err(AppError::Authorization(
            "only the author can delete this comment".to_string(),
        ));
    }

    state.comments.delete(comment_slug).await?;

    state
        .threads
        .get(category)?
        .inc_counter(thread_slug, ThreadCounter::Comments, -1)
        .await?;
    state
        .users
        .inc_counter(&comment.username, UserCounter::NumComments, -1)
        .await?;

    tracing::info!(
        "{} deleted comment {} on thread {}",
        caller.username,
        comment_slug,
        thread_slug
    );

    Ok(())
}
