//! Session persistence through file storage across client restarts.

use finder_agent::{AgentBuilder, AgentConfig, FileStorage};
use finder_app::{workflows, Credentials, IdentitySource};
use finder_core::{FinderError, UserId};
use finder_testkit::{fixtures, seeded_api, Endpoint};
use std::sync::Arc;

fn config(dir: &std::path::Path) -> AgentConfig {
    AgentConfig {
        storage_path: dir.join("session"),
        ..AgentConfig::default()
    }
}

#[tokio::test]
async fn signed_in_user_is_restored_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let api = seeded_api();

    let (first, _) = AgentBuilder::new()
        .with_config(config(dir.path()))
        .with_api(Arc::new(api.clone()))
        .start()
        .await
        .unwrap();
    workflows::login(
        &first,
        &Credentials::new("alice@cit.edu", fixtures::PASSWORD),
    )
    .await
    .unwrap();
    drop(first);

    api.fail(Endpoint::CurrentUser, FinderError::network("offline"));
    let (_second, snapshot) = AgentBuilder::new()
        .with_config(config(dir.path()))
        .with_api(Arc::new(api.clone()))
        .start()
        .await
        .unwrap();

    assert_eq!(snapshot.user_id(), Some(UserId(1)));
    assert_eq!(snapshot.source, Some(IdentitySource::Cached));
}

#[tokio::test]
async fn logout_leaves_no_session_files() {
    let dir = tempfile::tempdir().unwrap();
    let api = seeded_api();
    let (app_core, _) = AgentBuilder::new()
        .with_config(config(dir.path()))
        .with_api(Arc::new(api))
        .start()
        .await
        .unwrap();

    workflows::login(
        &app_core,
        &Credentials::new("bob@cit.edu", fixtures::PASSWORD),
    )
    .await
    .unwrap();
    workflows::logout(&app_core).await.unwrap();

    let storage = FileStorage::new(dir.path().join("session"));
    for key in ["user", "token", "isAuthenticated"] {
        assert!(!storage.base_path().join(format!("{key}.dat")).exists());
    }
}
