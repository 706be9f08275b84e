use std::sync::Arc;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CastVoteRequest, TargetType, ThreadCounter, Vote},
    repositories::ThreadRepository,
};

/// Where a vote request was addressed, taken from the request path.
#[derive(Debug, Clone, Copy)]
pub enum VotePath<'a> {
    Thread {
        thread_slug: &'a str,
    },
    Comment {
        thread_slug: &'a str,
        comment_slug: &'a str,
    },
}

impl VotePath<'_> {
    fn target_type(&self) -> TargetType {
        match self {
            VotePath::Thread { .. } => TargetType::Thread,
            VotePath::Comment { .. } => TargetType::Comment,
        }
    }

    fn target_slug(&self) -> &str {
        match self {
            VotePath::Thread { thread_slug } => thread_slug,
            VotePath::Comment { comment_slug, .. } => comment_slug,
        }
    }

    fn ensure_matches(&self, vote: &Vote) -> Result<()> {
        if vote.target_type != self.target_type() || vote.slug_id != self.target_slug() {
            return Err(AppError::BadRequest(
                "vote target does not match request path".to_string(),
            ));
        }
        Ok(())
    }
}

/// A vote target that exists, together with the username of its author.
pub struct ResolvedTarget {
    pub owner: String,
    store: TargetStore,
}

enum TargetStore {
    Thread(Arc<dyn ThreadRepository>),
    Comment,
}

/// Validates and applies a vote from `voter`.
///
/// Three independent updates run in order: the target's vote counter, the owner's
/// `votes.threads`/`votes.comments` counter, then the voter's record. The first
/// failure is returned and nothing already applied is undone. Every call adds
/// `value` to both counters, regardless of what the voter cast before.
pub async fn cast_vote(
    state: &AppState,
    voter: &AuthUser,
    category: &str,
    path: VotePath<'_>,
    request: CastVoteRequest,
) -> Result<()> {
    let vote = request.into_vote()?;
    path.ensure_matches(&vote)?;

    let target = resolve_target(state, category, path).await?;
    apply_vote(state, voter, &vote, &target).await
}

pub async fn resolve_target(
    state: &AppState,
    category: &str,
    path: VotePath<'_>,
) -> Result<ResolvedTarget> {
    let threads = state.threads.get(category)?;

    match path {
        VotePath::Thread { thread_slug } => {
            let thread = threads
                .get(thread_slug)
                .await?
                .ok_or_else(|| AppError::NotFound("thread not found".to_string()))?;

            Ok(ResolvedTarget {
                owner: thread.username,
                store: TargetStore::Thread(threads),
            })
        }
        VotePath::Comment {
            thread_slug,
            comment_slug,
        } => {
            let thread = threads
                .get(thread_slug)
                .await?
                .ok_or_else(|| AppError::NotFound("thread not found".to_string()))?;

            let comment = state
                .comments
                .get(comment_slug)
                .await?
                .filter(|comment| comment.thread_id == thread.id)
                .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;

            Ok(ResolvedTarget {
                owner: comment.username,
                store: TargetStore::Comment,
            })
        }
    }
}

async fn apply_vote(
    state: &AppState,
    voter: &AuthUser,
    vote: &Vote,
    target: &ResolvedTarget,
) -> Result<()> {
    let delta = vote.value.delta();

    match &target.store {
        TargetStore::Thread(threads) => {
            threads
                .inc_counter(&vote.slug_id, ThreadCounter::Votes, delta)
                .await?
        }
        TargetStore::Comment => state.comments.inc_votes(&vote.slug_id, delta).await?,
    }

    let owner_counter = vote.target_type.owner_counter();
    if let Err(e) = state
        .users
        .inc_counter(&target.owner, owner_counter, delta)
        .await
    {
        tracing::warn!(
            "vote on {} {} counted on target but not on owner {}: {}",
            vote.target_type,
            vote.slug_id,
            target.owner,
            e
        );
        return Err(e);
    }

    if let Err(e) = state.users.upsert_vote(&voter.username, vote).await {
        tracing::warn!(
            "vote on {} {} counted but not recorded for {}: {}",
            vote.target_type,
            vote.slug_id,
            voter.username,
            e
        );
        return Err(e);
    }

    tracing::debug!(
        "{} voted {} on {} {}",
        voter.username,
        vote.value.get(),
        vote.target_type,
        vote.slug_id
    );

    Ok(())
}
