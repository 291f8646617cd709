//! `quartermaster-auth` — roles, capabilities and session state.
//!
//! This crate is intentionally decoupled from storage and presentation.

pub mod authorize;
pub mod credentials;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{
    authorize, authorize_optional, explain_authorization, AuthorizationExplanation, AuthzError,
};
pub use credentials::{AuthError, PasswordAuthenticator};
pub use permissions::{Capabilities, Permission};
pub use roles::{Role, UnknownRole};
pub use session::{Session, SessionManager};
pub use user::{LocalUser, RoleCounts, ADMIN_USER_ID};
