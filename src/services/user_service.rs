use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, Claims, hash_secret, verify_secret},
    error::{AppError, Result},
    models::{CreateUserRequest, Role, SignInRequest, TokenResponse, User},
};

fn require_admin(caller: &AuthUser) -> Result<()> {
    if !caller.is_admin() {
        return Err(AppError::Authorization("admin access required".to_string()));
    }
    Ok(())
}

fn require_self(caller: &AuthUser, username: &str) -> Result<()> {
    if caller.username != username {
        return Err(AppError::Authorization(
            "cannot act on another user's account".to_string(),
        ));
    }
    Ok(())
}

async fn create_user(state: &AppState, request: CreateUserRequest, role: Role) -> Result<User> {
    request.validate()?;

    let cost = state.config.bcrypt_cost;
    let password_hash = hash_secret(&request.password, cost)?;
    let email_hash = request
        .email
        .as_deref()
        .map(|email| hash_secret(email, cost))
        .transpose()?;

    let user = User::new(request.username, role, password_hash, email_hash);
    state.users.create(&user).await?;

    tracing::info!("created {} account {}", role, user.username);

    Ok(user)
}

pub async fn signup(state: &AppState, request: CreateUserRequest) -> Result<User> {
    create_user(state, request, Role::User).await
}

pub async fn create_admin(
    state: &AppState,
    caller: &AuthUser,
    request: CreateUserRequest,
) -> Result<User> {
    require_admin(caller)?;
    create_user(state, request, Role::Admin).await
}

pub async fn signin(state: &AppState, request: SignInRequest) -> Result<TokenResponse> {
    request.validate()?;

    let invalid = || AppError::Authentication("invalid username or password".to_string());

    let user = state
        .users
        .get_by_username(&request.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_secret(&request.password, &user.password_hash)? {
        return Err(invalid());
    }

    if user.is_deactivated() {
        return Err(AppError::Authentication(
            "user account deactivated".to_string(),
        ));
    }

    let (token, _) = Claims::new(user.id, user.username, user.role, &state.config.jwt_secret)?;

    Ok(TokenResponse { token })
}

pub async fn get_user(state: &AppState, caller: &AuthUser, username: &str) -> Result<User> {
    if !caller.is_admin() {
        require_self(caller, username)?;
    }

    state
        .users
        .get_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}

pub async fn search_users(
    state: &AppState,
    caller: &AuthUser,
    username: Option<&str>,
    role: Role,
    from: i64,
    size: i64,
) -> Result<Vec<User>> {
    require_admin(caller)?;
    state.users.search(username, role, from, size).await
}

pub async fn deactivate(state: &AppState, caller: &AuthUser, username: &str) -> Result<()> {
    require_self(caller, username)?;
    state.users.deactivate(username, caller.role).await?;

    tracing::info!("deactivated account {}", username);

    Ok(())
}

/// Hard delete. Counters on other users that were fed by this account's votes are
/// left as they are.
pub async fn delete_account(state: &AppState, caller: &AuthUser, username: &str) -> Result<()> {
    require_self(caller, username)?;
    state.users.delete(username, caller.role).await?;

    tracing::info!("deleted account {}", username);

    Ok(())
}
