//! A Duello server for the corner bar.
//!
//! Binds on port 5001 with the stock configuration and a couple of
//! regulars pre-seeded in the directory, so a fresh checkout has
//! someone to duel.
//!
//! ```text
//! RUST_LOG=duello=debug cargo run -p corner-bar
//! ```

use std::sync::Arc;

use duello::engine::Profile;
use duello::protocol::Identity;
use duello::{DuelloServer, InMemoryDirectory};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), duello::DuelloError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let directory = Arc::new(InMemoryDirectory::new());
    for (token, name, avatar) in [
        ("regular-aoife", "Aoife", "🦊"),
        ("regular-brendan", "Brendan", "🦉"),
    ] {
        directory.insert_profile(
            Identity::new(token),
            Profile {
                display_name: name.into(),
                avatar: Some(avatar.into()),
            },
        );
    }

    let server = DuelloServer::bind("127.0.0.1:5001")
        .directory(directory)
        .build()
        .await?;

    tracing::info!(addr = %server.local_addr()?, "corner bar is open");
    server.run().await
}
