use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Record ids are allocated by the document store, monotonically increasing
/// by creation order. Legacy writers stored some of them as strings, so the
/// foreign-key fields deserialize through [`id_compat`].
pub type Id = i64;

// Wire casing is camelCase throughout: that is the shape the persisted
// document and the existing frontend already use.

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "id_compat::id")]
    pub id: Id,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

pub fn default_role() -> String {
    "user".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "id_compat::id")]
    pub id: Id,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reactions: ReactionState,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPost {
    pub author: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Per-post engagement state. `likes`/`dislikes` always equal the lengths of
/// the membership lists, and no username appears in both lists; only
/// [`crate::reactions::apply`] mutates this.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionState {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
    #[serde(default)]
    pub user_liked: Vec<String>,
    #[serde(default)]
    pub user_disliked: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(deserialize_with = "id_compat::id")]
    pub id: Id,
    #[serde(deserialize_with = "id_compat::id")]
    pub post_id: Id,
    /// `None` means top-level. Over one post the parent/child relation forms
    /// a forest; nothing here guards against cycles on insert, the thread
    /// builder tolerates them on read.
    #[serde(default, deserialize_with = "id_compat::opt_id")]
    pub parent_id: Option<Id>,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(deserialize_with = "id_compat::id")]
    pub post_id: Id,
    #[serde(default, deserialize_with = "id_compat::opt_id")]
    pub parent_id: Option<Id>,
    pub author: String,
    pub body: String,
}

/// A comment plus its ordered replies. Derived on every read by
/// [`crate::threads::build_tree`]; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Id fields written by older clients can be JSON numbers or string-encoded
/// numbers. Normalize to `i64` here so everything downstream compares with
/// exact equality.
pub mod id_compat {
    use serde::{Deserialize, Deserializer};

    use super::Id;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i64),
        Text(String),
    }

    impl TryFrom<RawId> for Id {
        type Error = std::num::ParseIntError;

        fn try_from(raw: RawId) -> Result<Id, Self::Error> {
            match raw {
                RawId::Num(n) => Ok(n),
                RawId::Text(s) => s.trim().parse(),
            }
        }
    }

    pub fn id<'de, D>(de: D) -> Result<Id, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(de)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }

    pub fn opt_id<'de, D>(de: D) -> Result<Option<Id>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawId>::deserialize(de)? {
            None => Ok(None),
            Some(raw) => raw.try_into().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_ids_accept_numbers_and_strings() {
        let c: Comment = serde_json::from_value(serde_json::json!({
            "id": "17",
            "postId": 3,
            "parentId": "9",
            "author": "alice",
            "body": "hi",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(c.id, 17);
        assert_eq!(c.post_id, 3);
        assert_eq!(c.parent_id, Some(9));
    }

    #[test]
    fn missing_or_null_parent_is_top_level() {
        let c: Comment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "postId": 1,
            "author": "bob",
            "body": "top",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(c.parent_id, None);

        let c: Comment = serde_json::from_value(serde_json::json!({
            "id": 2,
            "postId": 1,
            "parentId": null,
            "author": "bob",
            "body": "also top",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(c.parent_id, None);
    }

    #[test]
    fn non_numeric_id_string_is_rejected() {
        let res: Result<Comment, _> = serde_json::from_value(serde_json::json!({
            "id": "not-a-number",
            "postId": 1,
            "author": "mallory",
            "body": "x",
            "createdAt": "2024-05-01T12:00:00Z"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn comment_node_serializes_flat_with_replies() {
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "postId": 1,
            "author": "alice",
            "body": "root",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        let node = CommentNode { comment, replies: Vec::new() };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["id"], 1);
        assert_eq!(v["replies"], serde_json::json!([]));
    }
}
