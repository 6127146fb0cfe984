//! End-to-end feed walkthrough against an in-memory store.
//!
//! Run with: `cargo run -p murmur-client --example feed_demo`

use std::sync::{Arc, Mutex};

use tracing_subscriber::{fmt, EnvFilter};

use murmur_client::{FeedApi, FeedSession, LocalFeedApi};
use murmur_shared::FeedFilter;
use murmur_store::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("murmur_client=debug,murmur_store=debug,info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let db = Arc::new(Mutex::new(Database::in_memory()?));

    // Two accounts sharing the same store.
    let alice = LocalFeedApi::sign_up(db.clone(), "alice")?;
    for i in 1..=12 {
        alice.create_post(format!("dispatch #{i} from alice")).await?;
    }

    let bob = LocalFeedApi::sign_up(db, "bob")?;
    let mut session = FeedSession::new(bob, 10);

    session.refresh().await;
    tracing::info!(
        shown = session.display().len(),
        has_more = session.has_more(),
        "first page"
    );

    session.load_more().await;
    tracing::info!(shown = session.display().len(), "after load_more");

    // Optimistic create: visible immediately, confirmed by the server call.
    session.create_post("hello from bob".to_string()).await;
    let top = &session.display()[0];
    tracing::info!(id = %top.id, content = %top.content, "freshly created");

    // Like the newest alice post, then show the viewer-relative state.
    let target = session
        .display()
        .into_iter()
        .find(|p| p.profile.username == "alice")
        .expect("alice posted");
    session.toggle_like(&target).await;

    session.set_search(Some("#12".to_string())).await;
    for post in session.display() {
        tracing::info!(
            author = %post.profile.username,
            likes = post.likes_count,
            liked = post.is_liked,
            "{}",
            post.content
        );
    }

    session.set_search(None).await;
    session.set_filter(FeedFilter::Mine).await;
    tracing::info!(mine = session.display().len(), "bob's own posts");

    Ok(())
}
