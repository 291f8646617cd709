//! Application wiring: config → store → guarded ledger, plus the one signed-in
//! session.

use std::sync::Arc;

use anyhow::Context;

use quartermaster_auth::{
    authorize_optional, AuthError, AuthzError, PasswordAuthenticator, Permission, Session,
    SessionManager,
};

use crate::config::{Backend, Config};
use crate::guarded::GuardedLedger;
use crate::ledger::{InventoryLedger, LedgerSettings};
use crate::seed::seed_demo_data;
use crate::store::{InMemoryStore, JsonFileStore, Store};

pub type SharedStore = Arc<dyn Store>;

/// Open the backend selected by `cfg.backend`.
pub fn open_store(cfg: &Config) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match cfg.backend {
        Backend::Memory => Arc::new(InMemoryStore::with_activity_cap(cfg.activity_log_cap)),
        Backend::File => Arc::new(
            JsonFileStore::open_with_activity_cap(&cfg.data_dir, cfg.activity_log_cap)
                .with_context(|| format!("opening data directory {}", cfg.data_dir.display()))?,
        ),
    };
    tracing::info!(backend = ?cfg.backend, data_dir = %cfg.data_dir.display(), "store opened");
    Ok(store)
}

pub struct App {
    ledger: GuardedLedger<SharedStore>,
    authenticator: PasswordAuthenticator,
    sessions: SessionManager,
}

impl App {
    /// Read the environment, install logging, then build the app.
    pub fn bootstrap() -> anyhow::Result<Self> {
        let cfg = Config::from_env().context("loading configuration")?;
        quartermaster_observability::init_with(cfg.log_format);
        if cfg.uses_default_admin_password() {
            tracing::warn!("QM_ADMIN_PASSWORD not set; using insecure dev default");
        }
        tracing::info!(backend = ?cfg.backend, policy = ?cfg.quantity_policy, "starting quartermaster");
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let store = open_store(cfg)?;
        if cfg.seed_demo_data {
            seed_demo_data(&*store).context("seeding demo data")?;
        }
        Ok(Self::with_store(store, cfg))
    }

    pub fn with_store(store: SharedStore, cfg: &Config) -> Self {
        let ledger = InventoryLedger::with_settings(store, LedgerSettings::from(cfg));
        Self {
            ledger: GuardedLedger::new(ledger),
            authenticator: PasswordAuthenticator::new(cfg.admin_password.clone()),
            sessions: SessionManager::new(),
        }
    }

    pub fn sign_in(&mut self, password: &str) -> Result<&Session, AuthError> {
        let session = self.authenticator.sign_in(password)?;
        Ok(self.sessions.sign_in(session))
    }

    pub fn sign_out(&mut self) -> Option<Session> {
        self.sessions.sign_out()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// The signed-in session, or [`AuthzError::NotSignedIn`].
    pub fn require_session(&self) -> Result<&Session, AuthzError> {
        self.sessions.current().ok_or(AuthzError::NotSignedIn)
    }

    /// The signed-in session, if it may perform `required`.
    pub fn session_for(&self, required: Permission) -> Result<&Session, AuthzError> {
        let session = self.sessions.current();
        authorize_optional(session, required)?;
        session.ok_or(AuthzError::NotSignedIn)
    }

    pub fn ledger(&self) -> &GuardedLedger<SharedStore> {
        &self.ledger
    }
}

impl core::fmt::Debug for App {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("App")
            .field("settings", self.ledger.ledger().settings())
            .field("authenticator", &self.authenticator)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}
