//! ProsperIA application runtime.
//!
//! [`App`] wires the pieces together once per process: the file-backed local
//! store, the identity provider and session controller, the feature state
//! and the generative flows. Views get everything they need from it; nothing
//! else keeps global state.

use ai_flows::{GeminiModel, ModelHandle, SkillRelevanceFlow, StrategyFlow};
use feature_state::{Catalog, FeatureError, GoalTracker, TaskManager, ThemePreference};
use local_store::{FileStore, SharedStore, StorageError};
use prosperia_config::{init_logging, Config, CoreError, Paths};
use session_controller::{
    FirebaseAuthClient, FirebaseAuthOptions, ProviderHandle, RouteGuard, SessionController,
    UrlOpener,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while starting the application.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Feature state error: {0}")]
    Feature(#[from] FeatureError),
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Everything a view needs, built once.
pub struct App {
    paths: Paths,
    store: SharedStore,
    session: SessionController,
    guard: RouteGuard,
    goals: GoalTracker,
    tasks: TaskManager,
    theme: ThemePreference,
    catalog: Catalog,
    strategy: StrategyFlow,
    skill_relevance: SkillRelevanceFlow,
}

impl App {
    /// Resolve the default layout, load configuration, install logging and
    /// bootstrap. Must run inside a Tokio runtime.
    pub fn start() -> AppResult<Self> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        let config = Config::load(&paths)?;
        init_logging(&config, &paths);
        Self::bootstrap(&config, paths)
    }

    /// Build the application from explicit configuration.
    ///
    /// With an identity API key this spawns the session controller's
    /// notification task and must run inside a Tokio runtime.
    pub fn bootstrap(config: &Config, paths: Paths) -> AppResult<Self> {
        Self::bootstrap_with_opener(config, paths, None)
    }

    /// Like [`App::bootstrap`], with a custom handler for the delegated
    /// sign-in URL (e.g. one that launches the system browser).
    pub fn bootstrap_with_opener(
        config: &Config,
        paths: Paths,
        opener: Option<UrlOpener>,
    ) -> AppResult<Self> {
        paths.ensure_dirs()?;
        let store: SharedStore = Arc::new(FileStore::open_or_reset(paths.local_storage_file())?);

        let identity = identity_provider(config, &store, opener)?;
        let model = model_handle(config)?;

        let session = SessionController::spawn(identity);
        let guard = RouteGuard::new(session.clone());

        let app = Self {
            goals: GoalTracker::load(Arc::clone(&store))?,
            tasks: TaskManager::load(Arc::clone(&store))?,
            theme: ThemePreference::new(Arc::clone(&store)),
            catalog: Catalog,
            strategy: StrategyFlow::new(model.clone()),
            skill_relevance: SkillRelevanceFlow::new(model),
            paths,
            store,
            session,
            guard,
        };

        info!(
            base_dir = %app.paths.base_dir().display(),
            identity = app.session.provider_available(),
            "ProsperIA started"
        );
        Ok(app)
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn route_guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn goals(&self) -> &GoalTracker {
        &self.goals
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn strategy_flow(&self) -> &StrategyFlow {
        &self.strategy
    }

    pub fn skill_relevance_flow(&self) -> &SkillRelevanceFlow {
        &self.skill_relevance
    }
}

fn identity_provider(
    config: &Config,
    store: &SharedStore,
    opener: Option<UrlOpener>,
) -> AppResult<ProviderHandle> {
    let Some(api_key) = config.firebase.api_key.as_deref() else {
        warn!("Firebase API key missing, sign-in is disabled");
        return Ok(ProviderHandle::Unconfigured);
    };

    let base_url = config.firebase_auth_base_url()?;
    let mut options = FirebaseAuthOptions::new(api_key, base_url.as_str());
    if let Some(auth_domain) = config.firebase.auth_domain.as_deref() {
        options = options.with_auth_domain(auth_domain);
    }

    let mut client = FirebaseAuthClient::new(options, Arc::clone(store));
    if let Some(opener) = opener {
        client = client.with_url_opener(opener);
    }

    info!(
        project_id = config.firebase.project_id.as_deref().unwrap_or("-"),
        "Identity provider configured"
    );
    Ok(ProviderHandle::configured(client))
}

fn model_handle(config: &Config) -> AppResult<ModelHandle> {
    let Some(api_key) = config.gemini.api_key.as_deref() else {
        warn!("Gemini API key missing, AI features are disabled");
        return Ok(ModelHandle::Unconfigured);
    };

    let base_url = config.gemini_base_url()?;
    let model = GeminiModel::new(api_key, config.gemini.model.as_str())
        .with_base_url(base_url.as_str());
    info!(model = %config.gemini.model, "Generative model configured");
    Ok(ModelHandle::configured(model))
}
