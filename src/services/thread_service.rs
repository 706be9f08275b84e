use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CreateThreadRequest, Thread, UserCounter},
};

pub async fn create_thread(
    state: &AppState,
    author: &AuthUser,
    category: &str,
    request: CreateThreadRequest,
) -> Result<Thread> {
    request.validate_for_save()?;
    let threads = state.threads.get(category)?;

    let thread = Thread::new(request, category, author.user_id, &author.username)?;
    threads.create(&thread).await?;

    state
        .users
        .inc_counter(&author.username, UserCounter::NumThreads, 1)
        .await?;

    tracing::info!(
        "{} created thread {} in {}",
        author.username,
        thread.slug_id,
        category
    );

    Ok(thread)
}

pub async fn get_thread(state: &AppState, category: &str, slug_id: &str) -> Result<Thread> {
    state
        .threads
        .get(category)?
        .get(slug_id)
        .await?
        .ok_or_else(|| AppError::NotFound("thread not found".to_string()))
}

pub async fn list_threads(
    state: &AppState,
    category: &str,
    from: i64,
    size: i64,
) -> Result<Vec<Thread>> {
    state.threads.get(category)?.list(from, size).await
}

/// Removes a thread owned by `caller`. Comments under it are left in place.
pub async fn delete_thread(
    state: &AppState,
    caller: &AuthUser,
    category: &str,
    slug_id: &str,
) -> Result<()> {
    let threads = state.threads.get(category)?;
    let thread = threads
        .get(slug_id)
        .await?
        .ok_or_else(|| AppError::NotFound("thread not found".to_string()))?;

    if thread.user_id != caller.user_id {
        return Err(AppError::Authorization(
            "only the author can delete this thread".to_string(),
        ));
    }

    threads.delete(slug_id).await?;
    state
        .users
        .inc_counter(&thread.username, UserCounter::NumThreads, -1)
        .await?;

    tracing::info!("{} deleted thread {} in {}", caller.username, slug_id, category);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Role,
        test_support::{CATEGORY, TestContext},
    };

    fn thread_request(title: &str) -> CreateThreadRequest {
        CreateThreadRequest {
            title: Some(title.to_string()),
            content: Some("some content".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_slugs_and_counts_for_author() {
        let ctx = TestContext::new();
        let author = ctx.seed_user("author", Role::User).await;

        let thread = create_thread(&ctx.state, &author, CATEGORY, thread_request("Hello big world"))
            .await
            .unwrap();

        assert_eq!(thread.slug_id.len(), 5);
        assert_eq!(thread.slug_title, "Hello_big_world");
        assert_eq!(thread.category, CATEGORY);
        assert_eq!(thread.counters.votes, 0);
        assert_eq!(thread.counters.comments, 0);
        assert!(ctx.threads.thread(&thread.slug_id).is_some());
        assert_eq!(ctx.users.user("author").unwrap().counters.num.threads, 1);
    }

    #[tokio::test]
    async fn create_rejects_client_supplied_counters() {
        let ctx = TestContext::new();
        let author = ctx.seed_user("author", Role::User).await;
        let request = CreateThreadRequest {
            counters: Some(serde_json::json!({ "votes": 10 })),
            ..thread_request("title")
        };

        let result = create_thread(&ctx.state, &author, CATEGORY, request).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(ctx.users.user("author").unwrap().counters.num.threads, 0);
    }

    #[tokio::test]
    async fn create_in_unknown_category_is_not_found() {
        let ctx = TestContext::new();
        let author = ctx.seed_user("author", Role::User).await;

        let result = create_thread(&ctx.state, &author, "sports", thread_request("title")).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_author_count_keeps_the_thread() {
        let ctx = TestContext::new();
        let author = ctx.seed_user("author", Role::User).await;
        ctx.users.fail_on("inc_counter");

        let result = create_thread(&ctx.state, &author, CATEGORY, thread_request("title")).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        let stored = list_threads(&ctx.state, CATEGORY, 0, 100).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].username, "author");
        assert_eq!(ctx.users.user("author").unwrap().counters.num.threads, 0);
    }

    #[tokio::test]
    async fn list_returns_newest_first_within_page() {
        let ctx = TestContext::new();
        let author = ctx.seed_user("author", Role::User).await;
        ctx.seed_thread(&author, "aaaaa").await;
        ctx.seed_thread(&author, "bbbbb").await;
        ctx.seed_thread(&author, "ccccc").await;

        let page = list_threads(&ctx.state, CATEGORY, 1, 1).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].slug_id, "bbbbb");
    }

    #[tokio::test]
    async fn only_author_can_delete() {
        let ctx = TestContext::new();
        let author = ctx.seed_user("author", Role::User).await;
        let other = ctx.seed_user("other", Role::User).await;
        create_thread(&ctx.state, &author, CATEGORY, thread_request("title"))
            .await
            .unwrap();
        let slug = list_threads(&ctx.state, CATEGORY, 0, 10).await.unwrap()[0]
            .slug_id
            .clone();

        let denied = delete_thread(&ctx.state, &other, CATEGORY, &slug).await;
        assert!(matches!(denied, Err(AppError::Authorization(_))));

        delete_thread(&ctx.state, &author, CATEGORY, &slug).await.unwrap();
        assert!(ctx.threads.thread(&slug).is_none());
        assert_eq!(ctx.users.user("author").unwrap().counters.num.threads, 0);

        let missing = get_thread(&ctx.state, CATEGORY, &slug).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
