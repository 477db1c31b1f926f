use agora::models::{Comment, Post, ReactionState, User};
use agora::store::{Document, JsonStore};
use chrono::Utc;
use serial_test::serial;

fn sample_doc() -> Document {
    let mut doc = Document::default();
    let uid = doc.allocate_id();
    doc.users.push(User {
        id: uid,
        username: "alice".into(),
        password: "pw".into(),
        email: None,
        role: "user".into(),
    });
    let pid = doc.allocate_id();
    doc.posts.push(Post {
        id: pid,
        author: "alice".into(),
        title: "hello".into(),
        body: "world".into(),
        created_at: Utc::now(),
        reactions: ReactionState::default(),
    });
    let cid = doc.allocate_id();
    doc.comments.push(Comment {
        id: cid,
        post_id: pid,
        parent_id: None,
        author: "alice".into(),
        body: "first".into(),
        created_at: Utc::now(),
    });
    doc
}

#[test]
fn round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let store = JsonStore::open(tmp.path().join("db.json")).unwrap();

    let doc = sample_doc();
    store.save(&doc).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.users.len(), 1);
    assert_eq!(loaded.posts.len(), 1);
    assert_eq!(loaded.comments.len(), 1);
    assert_eq!(loaded.comments[0].post_id, loaded.posts[0].id);
    assert_eq!(loaded.next_id, doc.next_id);
}

#[test]
fn missing_file_loads_empty_document() {
    let tmp = tempfile::tempdir().unwrap();
    let store = JsonStore::open(tmp.path().join("db.json")).unwrap();
    let doc = store.load();
    assert!(doc.users.is_empty());
    assert!(doc.posts.is_empty());
    assert!(doc.comments.is_empty());
}

#[test]
fn corrupt_file_loads_empty_document() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("db.json");
    std::fs::write(&path, b"{ not json").unwrap();
    let store = JsonStore::open(&path).unwrap();
    let doc = store.load();
    assert!(doc.users.is_empty());
    assert!(doc.comments.is_empty());
}

#[test]
fn legacy_string_ids_are_normalized_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("db.json");
    std::fs::write(
        &path,
        serde_json::json!({
            "comments": [
                {"id": "101", "postId": "7", "parentId": null, "author": "a", "body": "x",
                 "createdAt": "2024-05-01T12:00:00Z"},
                {"id": 102, "postId": 7, "parentId": "101", "author": "b", "body": "y",
                 "createdAt": "2024-05-01T12:01:00Z"}
            ]
        })
        .to_string(),
    )
    .unwrap();
    let store = JsonStore::open(&path).unwrap();
    let doc = store.load();
    assert_eq!(doc.comments[0].id, 101);
    assert_eq!(doc.comments[1].parent_id, Some(101));
    assert_eq!(doc.comments[0].post_id, doc.comments[1].post_id);
}

#[test]
fn id_allocation_clears_every_existing_id() {
    // documents written before nextId existed deserialize with nextId = 0
    let mut doc = sample_doc();
    doc.next_id = 0;
    let highest = doc
        .users
        .iter()
        .map(|u| u.id)
        .chain(doc.posts.iter().map(|p| p.id))
        .chain(doc.comments.iter().map(|c| c.id))
        .max()
        .unwrap();
    let id = doc.allocate_id();
    assert!(id > highest);
    let next = doc.allocate_id();
    assert!(next > id);
}

#[test]
#[serial]
fn data_dir_env_override_is_honored() {
    let tmp = tempfile::tempdir().unwrap();
    std::env::set_var("AGORA_DATA_DIR", tmp.path());
    let store = JsonStore::from_env().unwrap();
    assert_eq!(store.path(), tmp.path().join("db.json"));
    std::env::remove_var("AGORA_DATA_DIR");
}
