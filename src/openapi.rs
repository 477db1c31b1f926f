use crate::models::{
    Comment, LoginRequest, LoginResponse, NewComment, NewPost, NewUser, Post, ReactionState,
    UpdatePost, UpdateUser, User,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::list_users,
        crate::routes::create_user,
        crate::routes::login,
        crate::routes::update_user,
        crate::routes::list_posts,
        crate::routes::get_post,
        crate::routes::create_post,
        crate::routes::update_post,
        crate::routes::delete_post,
        crate::routes::react_to_post,
        crate::routes::list_comments,
        crate::routes::create_comment,
        crate::routes::delete_comment,
    ),
    components(schemas(
        User, NewUser, UpdateUser, LoginRequest, LoginResponse,
        Post, NewPost, UpdatePost, ReactionState,
        Comment, NewComment,
        crate::routes::DeletePostRequest,
        crate::routes::ReactionRequest, crate::routes::ReactionResponse,
    )),
    tags(
        (name = "users", description = "Account operations"),
        (name = "posts", description = "Post operations"),
        (name = "comments", description = "Threaded comment operations"),
    )
)]
pub struct ApiDoc;
