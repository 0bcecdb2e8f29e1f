//! Authentication against the hosted identity provider
//!
//! - `session`: session and user types
//! - `provider`: the [`IdentityProvider`] seam
//! - `gotrue`: Supabase GoTrue implementation
//! - `store`: session persistence (keyring or file)
//! - `context`: [`AuthContext`], the single owner of the signed-in state

pub mod context;
pub mod gotrue;
pub mod provider;
pub mod session;
pub mod store;

pub use context::{parse_oauth_redirect, AuthContext, AuthState};
pub use gotrue::GoTrueClient;
pub use provider::{IdentityProvider, SignUpOutcome};
pub use session::{Session, TokenGrant, User};
pub use store::{store_from_config, FileSessionStore, KeyringSessionStore, SessionStore};
