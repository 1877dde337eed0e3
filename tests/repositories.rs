// SQLite repository tests
// Exercises the service implementations directly, below the HTTP layer.

use blog_api::auth::password;
use blog_api::config::DatabaseConfig;
use blog_api::db::models::blog::{BlogRepository, NewBlog};
use blog_api::db::models::comment::{CommentFilter, CommentKey, CommentRepository, NewComment};
use blog_api::db::models::user::{NewUser, UserRepository};
use blog_api::db::DbPool;
use blog_api::service::{BlogService, CommentService, StoreError, UserService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Repos {
    db: DbPool,
    users: UserRepository,
    blogs: BlogRepository,
    comments: CommentRepository,
}

async fn setup() -> Repos {
    let db = blog_api::db::init(&DatabaseConfig {
        path: ":memory:".to_string(),
        max_connections: 1,
    })
    .await
    .expect("Failed to open in-memory database");

    Repos {
        users: UserRepository::new(db.clone()),
        blogs: BlogRepository::new(db.clone()),
        comments: CommentRepository::new(db.clone()),
        db,
    }
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password: "password123".to_string(),
    }
}

fn new_blog(title: &str, author_id: i64) -> NewBlog {
    NewBlog {
        title: title.to_string(),
        content: String::new(),
        author_id,
    }
}

fn new_comment(user_id: i64, blog_id: i64, message: &str) -> NewComment {
    NewComment {
        user_id,
        blog_id,
        message: message.to_string(),
    }
}

async fn count(db: &DbPool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db)
        .await
        .unwrap();
    n
}

// ── Users ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_user_password_is_stored_hashed() {
    let r = setup().await;
    let user = r.users.create(new_user("Ada")).await.unwrap();

    assert_ne!(user.password, "password123");
    assert!(password::verify("password123", &user.password));

    let updated = r
        .users
        .update(
            user.id,
            NewUser {
                password: "rotated".to_string(),
                ..new_user("Ada")
            },
        )
        .await
        .unwrap();
    assert!(password::verify("rotated", &updated.password));
    assert!(!password::verify("password123", &updated.password));
}

#[tokio::test]
async fn test_user_missing_rows_are_not_found() {
    let r = setup().await;

    assert!(matches!(r.users.get(404).await, Err(StoreError::NotFound)));
    assert!(matches!(r.users.update(404, new_user("Ghost")).await, Err(StoreError::NotFound)));
    assert!(matches!(r.users.delete(404).await, Err(StoreError::NotFound)));
    assert!(!r.users.exists(404).await.unwrap());
}

#[tokio::test]
async fn test_user_exists_after_create() {
    let r = setup().await;
    let user = r.users.create(new_user("Ada")).await.unwrap();
    assert!(r.users.exists(user.id).await.unwrap());
}

#[tokio::test]
async fn test_user_list_treats_wildcards_literally() {
    let r = setup().await;
    r.users.create(new_user("100%")).await.unwrap();
    r.users.create(new_user("1000")).await.unwrap();
    r.users.create(new_user("a_b")).await.unwrap();
    r.users.create(new_user("axb")).await.unwrap();

    let percent = r.users.list(Some("0%")).await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].name, "100%");

    let underscore = r.users.list(Some("_")).await.unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name, "a_b");

    assert_eq!(r.users.list(None).await.unwrap().len(), 4);
    assert_eq!(r.users.list(Some("  ")).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_user_list_folds_non_ascii_case() {
    let r = setup().await;
    r.users.create(new_user("JÖRG")).await.unwrap();
    r.users.create(new_user("Émile")).await.unwrap();
    r.users.create(new_user("Jorge")).await.unwrap();

    let jo = r.users.list(Some("jö")).await.unwrap();
    assert_eq!(jo.len(), 1);
    assert_eq!(jo[0].name, "JÖRG");

    let emi = r.users.list(Some("émi")).await.unwrap();
    assert_eq!(emi.len(), 1);
    assert_eq!(emi[0].name, "Émile");

    let upper = r.users.list(Some("ÉMILE")).await.unwrap();
    assert_eq!(upper.len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn test_password_hashing_does_not_stall_the_runtime() {
    let r = setup().await;

    // On a single-threaded runtime this task only advances while create()
    // is parked, so any ticks mean hashing ran off the async worker.
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(1)).await;
                ticks.fetch_add(1, Ordering::Relaxed);
            }
        })
    };

    let user = r.users.create(new_user("Ada")).await.unwrap();
    ticker.abort();

    assert!(password::verify("password123", &user.password));
    assert!(ticks.load(Ordering::Relaxed) > 0, "runtime was blocked during hashing");
}

#[tokio::test]
async fn test_user_delete_cascades() {
    let r = setup().await;
    let author = r.users.create(new_user("Author")).await.unwrap();
    let reader = r.users.create(new_user("Reader")).await.unwrap();
    let doomed = r.blogs.create(new_blog("Doomed", author.id)).await.unwrap();
    let kept = r.blogs.create(new_blog("Kept", reader.id)).await.unwrap();

    r.comments.create(new_comment(reader.id, doomed.id, "on doomed")).await.unwrap();
    r.comments.create(new_comment(author.id, kept.id, "by author")).await.unwrap();
    r.comments.create(new_comment(reader.id, kept.id, "stays")).await.unwrap();

    r.users.delete(author.id).await.unwrap();

    assert!(matches!(r.users.get(author.id).await, Err(StoreError::NotFound)));
    assert!(matches!(r.blogs.get(doomed.id).await, Err(StoreError::NotFound)));
    assert!(r.blogs.get(kept.id).await.is_ok());

    let remaining = r.comments.list(CommentFilter::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].message, "stays");
}

#[tokio::test]
async fn test_user_delete_rolls_back_on_failure() {
    let r = setup().await;
    let author = r.users.create(new_user("Author")).await.unwrap();
    let blog = r.blogs.create(new_blog("Post", author.id)).await.unwrap();
    r.comments.create(new_comment(author.id, blog.id, "hello")).await.unwrap();

    sqlx::query(
        "CREATE TRIGGER block_user_delete BEFORE DELETE ON users
         BEGIN SELECT RAISE(ABORT, 'user delete blocked'); END"
    )
    .execute(&r.db)
    .await
    .unwrap();

    let err = r.users.delete(author.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)), "got {:?}", err);

    // Comments and blogs were deleted first inside the same transaction
    assert_eq!(count(&r.db, "users").await, 1);
    assert_eq!(count(&r.db, "blogs").await, 1);
    assert_eq!(count(&r.db, "comments").await, 1);
}

// ── Blogs ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_blog_update_refreshes_updated_at_only() {
    let r = setup().await;
    let author = r.users.create(new_user("Author")).await.unwrap();
    let blog = r.blogs.create(new_blog("Draft", author.id)).await.unwrap();
    assert_eq!(blog.created_at, blog.updated_at);

    let updated = r
        .blogs
        .update(
            blog.id,
            NewBlog {
                content: "now with words".to_string(),
                ..new_blog("Final", author.id)
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.content, "now with words");
    assert_eq!(updated.created_at, blog.created_at);
    assert!(updated.updated_at >= blog.updated_at);
}

#[tokio::test]
async fn test_blog_missing_rows_are_not_found() {
    let r = setup().await;

    assert!(matches!(r.blogs.get(9).await, Err(StoreError::NotFound)));
    assert!(matches!(r.blogs.update(9, new_blog("T", 1)).await, Err(StoreError::NotFound)));
    assert!(matches!(r.blogs.delete(9).await, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_blog_delete_takes_its_comments() {
    let r = setup().await;
    let author = r.users.create(new_user("Author")).await.unwrap();
    let gone = r.blogs.create(new_blog("Gone", author.id)).await.unwrap();
    let other = r.blogs.create(new_blog("Other", author.id)).await.unwrap();
    r.comments.create(new_comment(author.id, gone.id, "a")).await.unwrap();
    r.comments.create(new_comment(author.id, other.id, "b")).await.unwrap();

    r.blogs.delete(gone.id).await.unwrap();

    let remaining = r.comments.list(CommentFilter::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].blog_id, other.id);
}

#[tokio::test]
async fn test_blog_list_by_title() {
    let r = setup().await;
    let author = r.users.create(new_user("Author")).await.unwrap();
    r.blogs.create(new_blog("Intro to SQL", author.id)).await.unwrap();
    r.blogs.create(new_blog("sqlx in practice", author.id)).await.unwrap();
    r.blogs.create(new_blog("Gardening", author.id)).await.unwrap();

    let found = r.blogs.list(Some("Sql")).await.unwrap();
    let titles: Vec<&str> = found.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Intro to SQL", "sqlx in practice"]);
}

#[tokio::test]
async fn test_blog_list_folds_non_ascii_case() {
    let r = setup().await;
    let author = r.users.create(new_user("Author")).await.unwrap();
    r.blogs.create(new_blog("ÜBER Rust", author.id)).await.unwrap();
    r.blogs.create(new_blog("Uber eats", author.id)).await.unwrap();

    let found = r.blogs.list(Some("über")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "ÜBER Rust");
}

// ── Comments ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_comment_duplicate_key_is_rejected() {
    let r = setup().await;
    r.comments.create(new_comment(1, 1, "first")).await.unwrap();

    let err = r.comments.create(new_comment(1, 1, "second")).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate), "got {:?}", err);
}

#[tokio::test]
async fn test_comment_update_keeps_created_date() {
    let r = setup().await;
    let created = r.comments.create(new_comment(1, 2, "draft")).await.unwrap();
    let key = CommentKey { user_id: 1, blog_id: 2 };

    let updated = r.comments.update(key, "final".to_string()).await.unwrap();
    assert_eq!(updated.message, "final");
    assert_eq!(updated.created_date, created.created_date);

    let read = r.comments.get(key).await.unwrap();
    assert_eq!(read.message, "final");
}

#[tokio::test]
async fn test_comment_missing_key_is_not_found() {
    let r = setup().await;
    let key = CommentKey { user_id: 3, blog_id: 4 };

    assert!(matches!(r.comments.get(key).await, Err(StoreError::NotFound)));
    assert!(matches!(r.comments.update(key, "x".to_string()).await, Err(StoreError::NotFound)));
    assert!(matches!(r.comments.delete(key).await, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_comment_list_filters_combine() {
    let r = setup().await;
    for (user_id, blog_id) in [(1, 1), (1, 2), (2, 1), (2, 2), (3, 2)] {
        r.comments.create(new_comment(user_id, blog_id, "m")).await.unwrap();
    }

    let by_user = r
        .comments
        .list(CommentFilter { user_id: Some(2), blog_id: None })
        .await
        .unwrap();
    assert_eq!(by_user.len(), 2);
    assert!(by_user.iter().all(|c| c.user_id == 2));

    let by_blog = r
        .comments
        .list(CommentFilter { user_id: None, blog_id: Some(2) })
        .await
        .unwrap();
    assert_eq!(by_blog.len(), 3);

    let both = r
        .comments
        .list(CommentFilter { user_id: Some(3), blog_id: Some(2) })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);

    let none = r
        .comments
        .list(CommentFilter { user_id: Some(3), blog_id: Some(1) })
        .await
        .unwrap();
    assert!(none.is_empty());
}
