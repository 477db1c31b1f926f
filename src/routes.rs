use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::*;
use crate::reactions::{self, ReactionAction};
use crate::store::JsonStore;
use crate::threads;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .route(web::get().to(list_users))
            .route(web::post().to(create_user)),
    )
    .service(web::resource("/users/login").route(web::post().to(login)))
    .service(web::resource("/users/{id}").route(web::put().to(update_user)))
    .service(
        web::resource("/posts")
            .route(web::get().to(list_posts))
            .route(web::post().to(create_post)),
    )
    .service(
        web::resource("/posts/{id}")
            .route(web::get().to(get_post))
            .route(web::put().to(update_post))
            .route(web::delete().to(delete_post)),
    )
    .service(web::resource("/posts/{id}/reactions").route(web::put().to(react_to_post)))
    .service(
        web::resource("/comments")
            .route(web::get().to(list_comments))
            .route(web::post().to(create_comment)),
    )
    .service(web::resource("/comments/{id}").route(web::delete().to(delete_comment)));
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
}

// ---------------- Users ----------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub username: Option<String>,
}

#[utoipa::path(
    get,
    path = "/users",
    params(("username" = Option<String>, Query, description = "Filter by exact username")),
    responses(
        (status = 200, description = "List users", body = [User])
    )
)]
pub async fn list_users(
    data: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, ApiError> {
    let doc = {
        let _doc_lock = data.store.guard();
        data.store.load()
    };
    let mut users = doc.users;
    if let Some(name) = &query.username {
        users.retain(|u| &u.username == name);
    }
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_user(
    data: web::Data<AppState>,
    payload: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    if doc.users.iter().any(|u| u.username == new.username) {
        return Err(ApiError::Conflict);
    }
    let id = doc.allocate_id();
    let user = User {
        id,
        username: new.username,
        password: new.password,
        email: new.email,
        role: new.role.unwrap_or_else(default_role),
    };
    doc.users.push(user.clone());
    data.store.save(&doc)?;
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Unknown username or wrong password")
    )
)]
pub async fn login(
    data: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let doc = {
        let _doc_lock = data.store.guard();
        data.store.load()
    };
    let user = doc
        .users
        .iter()
        .find(|u| u.username == payload.username && u.password == payload.password)
        .ok_or(ApiError::Unauthorized)?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
    }))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UpdateUser,
    params(("id" = Id, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let upd = payload.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    let user = doc
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(ApiError::NotFound)?;
    if let Some(username) = upd.username {
        user.username = username;
    }
    if let Some(password) = upd.password {
        user.password = password;
    }
    if let Some(email) = upd.email {
        user.email = Some(email);
    }
    if let Some(role) = upd.role {
        user.role = role;
    }
    let updated = user.clone();
    data.store.save(&doc)?;
    Ok(HttpResponse::Ok().json(updated))
}

// ---------------- Posts ----------------------------------------------------

#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "List posts", body = [Post])
    )
)]
pub async fn list_posts(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let doc = {
        let _doc_lock = data.store.guard();
        data.store.load()
    };
    Ok(HttpResponse::Ok().json(doc.posts))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Id, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let doc = {
        let _doc_lock = data.store.guard();
        data.store.load()
    };
    let post = doc.posts.into_iter().find(|p| p.id == id).ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(post))
}

#[utoipa::path(
    post,
    path = "/posts",
    request_body = NewPost,
    responses(
        (status = 201, description = "Post created", body = Post)
    )
)]
pub async fn create_post(
    data: web::Data<AppState>,
    payload: web::Json<NewPost>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    let id = doc.allocate_id();
    let post = Post {
        id,
        author: new.author,
        title: new.title,
        body: new.body,
        created_at: Utc::now(),
        reactions: ReactionState::default(),
    };
    doc.posts.push(post.clone());
    data.store.save(&doc)?;
    Ok(HttpResponse::Created().json(post))
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    request_body = UpdatePost,
    params(("id" = Id, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<UpdatePost>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let upd = payload.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    let post = doc
        .posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ApiError::NotFound)?;
    // created_at and reactions are never client-writable
    if let Some(title) = upd.title {
        post.title = title;
    }
    if let Some(body) = upd.body {
        post.body = body;
    }
    let updated = post.clone();
    data.store.save(&doc)?;
    Ok(HttpResponse::Ok().json(updated))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DeletePostRequest {
    pub username: String,
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    request_body = DeletePostRequest,
    params(("id" = Id, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post removed"),
        (status = 401, description = "Unknown user"),
        (status = 403, description = "Neither author nor admin"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<DeletePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    let post = doc.posts.iter().find(|p| p.id == id).ok_or(ApiError::NotFound)?;
    let user = doc
        .users
        .iter()
        .find(|u| u.username == payload.username)
        .ok_or(ApiError::Unauthorized)?;
    if user.role != "admin" && post.author != user.username {
        return Err(ApiError::Forbidden);
    }
    doc.posts.retain(|p| p.id != id);
    data.store.save(&doc)?;
    Ok(HttpResponse::NoContent().finish())
}

// ---------------- Reactions ------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReactionRequest {
    pub username: String,
    /// One of `like`, `dislike`, `unlike`, `undislike`.
    pub action: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub likes: u64,
    pub dislikes: u64,
    pub user_liked: Vec<String>,
    pub user_disliked: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[utoipa::path(
    put,
    path = "/posts/{id}/reactions",
    request_body = ReactionRequest,
    params(("id" = Id, Path, description = "Post id")),
    responses(
        (status = 200, description = "Reaction state after the action", body = ReactionResponse),
        (status = 400, description = "Unrecognized action"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn react_to_post(
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<ReactionRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let req = payload.into_inner();
    let action: ReactionAction = req.action.parse()?;
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    let post = doc
        .posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ApiError::NotFound)?;
    let outcome = reactions::apply(&mut post.reactions, &req.username, action);
    let state = post.reactions.clone();
    if outcome.changed() {
        data.store.save(&doc)?;
    }
    Ok(HttpResponse::Ok().json(ReactionResponse {
        likes: state.likes,
        dislikes: state.dislikes,
        user_liked: state.user_liked,
        user_disliked: state.user_disliked,
        message: outcome.message().map(str::to_string),
    }))
}

// ---------------- Comments -------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListQuery {
    pub post_id: Option<Id>,
}

#[utoipa::path(
    get,
    path = "/comments",
    params(("postId" = Option<Id>, Query, description = "Return the reply forest for this post")),
    responses(
        (status = 200, description = "All comments, or the nested thread for one post")
    )
)]
pub async fn list_comments(
    data: web::Data<AppState>,
    query: web::Query<CommentListQuery>,
) -> Result<HttpResponse, ApiError> {
    let doc = {
        let _doc_lock = data.store.guard();
        data.store.load()
    };
    match query.post_id {
        Some(post_id) => {
            let forest = threads::build_tree(&doc.comments, post_id);
            Ok(HttpResponse::Ok().json(forest))
        }
        None => Ok(HttpResponse::Ok().json(doc.comments)),
    }
}

#[utoipa::path(
    post,
    path = "/comments",
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment created", body = Comment)
    )
)]
pub async fn create_comment(
    data: web::Data<AppState>,
    payload: web::Json<NewComment>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    let id = doc.allocate_id();
    let comment = Comment {
        id,
        post_id: new.post_id,
        parent_id: new.parent_id,
        author: new.author,
        body: new.body,
        created_at: Utc::now(),
    };
    doc.comments.push(comment.clone());
    data.store.save(&doc)?;
    Ok(HttpResponse::Created().json(comment))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = Id, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment and all replies removed"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let _doc_lock = data.store.guard();
    let mut doc = data.store.load();
    // the subtree is removed in one pass and the document saved once, so the
    // persisted store never holds a partially deleted thread
    doc.comments = threads::delete_subtree(std::mem::take(&mut doc.comments), id)?;
    data.store.save(&doc)?;
    Ok(HttpResponse::NoContent().finish())
}
