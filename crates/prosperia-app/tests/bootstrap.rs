use ai_flows::{Flow, FlowError, SkillRelevanceRequest};
use httpmock::prelude::*;
use local_store::{LocalStore, StorageKeys};
use prosperia_app::App;
use prosperia_config::{Config, Paths};
use session_controller::{GuardDecision, Route};
use std::time::Duration;
use tempfile::TempDir;

fn offline_config() -> Config {
    let mut config = Config::default();
    config.apply_overrides(|_| None);
    config.firebase.api_key = None;
    config.gemini.api_key = None;
    config
}

async fn wait_resolved(app: &App) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while app.session().current_session().is_pending() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("session never resolved");
}

#[tokio::test]
async fn test_unconfigured_bootstrap() {
    let dir = TempDir::new().unwrap();
    let app = App::bootstrap(&offline_config(), Paths::with_base_dir(dir.path().to_path_buf()))
        .unwrap();

    let session = app.session().current_session();
    assert!(session.is_signed_out());
    assert!(!session.provider_available);
    assert_eq!(
        app.route_guard().decide(Route::Dashboard),
        GuardDecision::Redirect(Route::SignIn)
    );
    assert_eq!(app.route_guard().decide(Route::SignIn), GuardDecision::Render);

    let failure = app
        .session()
        .sign_in_with_credentials("ana@prosperia.app", "secreto1")
        .await
        .unwrap_err();
    assert_eq!(failure.code(), "provider-unconfigured");

    let err = app
        .skill_relevance_flow()
        .run(SkillRelevanceRequest::new("Rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::ProviderUnconfigured));

    // Local features keep working without any remote service.
    app.tasks().add("Review budget", None).unwrap();
    app.goals().set_achieved(250.0).unwrap();
    assert_eq!(app.catalog().jobs().len(), 6);
    assert!(app.paths().local_storage_file().exists());
    assert!(app.store().has(StorageKeys::TASKS).unwrap());
}

#[tokio::test]
async fn test_corrupt_store_is_moved_aside() {
    let dir = TempDir::new().unwrap();
    let paths = Paths::with_base_dir(dir.path().to_path_buf());
    paths.ensure_dirs().unwrap();
    std::fs::write(paths.local_storage_file(), "not json at all").unwrap();

    let app = App::bootstrap(&offline_config(), paths).unwrap();
    assert!(app.tasks().tasks().is_empty());
    assert!(dir.path().join("local_storage.json.corrupt").exists());
}

#[tokio::test]
async fn test_configured_sign_in_unlocks_protected_routes() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:signInWithPassword");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({
                        "localId": "uid-ana",
                        "email": "ana@prosperia.app",
                        "idToken": "id-token",
                        "refreshToken": "refresh-token",
                        "expiresIn": "3600"
                    })
                    .to_string(),
                );
        })
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = offline_config();
    config.firebase.api_key = Some("test-key".into());
    config.firebase.auth_base_url = format!("{}/v1", server.base_url());

    let app = App::bootstrap(&config, Paths::with_base_dir(dir.path().to_path_buf())).unwrap();
    wait_resolved(&app).await;
    assert_eq!(
        app.route_guard().decide(Route::Tasks),
        GuardDecision::Redirect(Route::SignIn)
    );

    app.session()
        .sign_in_with_credentials("ana@prosperia.app", "secreto1")
        .await
        .unwrap();
    wait_resolved(&app).await;

    assert_eq!(app.route_guard().decide(Route::Tasks), GuardDecision::Render);
    assert_eq!(
        app.route_guard().decide(Route::SignIn),
        GuardDecision::Redirect(Route::Dashboard)
    );
    assert!(app.store().has(StorageKeys::AUTH_USER).unwrap());

    app.session().sign_out().await;
    assert_eq!(
        app.route_guard().decide(Route::Tasks),
        GuardDecision::Redirect(Route::SignIn)
    );
    assert!(!app.store().has(StorageKeys::AUTH_USER).unwrap());
}
