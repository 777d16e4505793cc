//! # fmg-auth
//!
//! Client-side session handling for FMG Industry Hub.
//!
//! Provides the session store (`SessionManager`) backed by the hosted auth
//! service, OS keychain persistence (`keyring`), the session warmer that
//! refreshes tokens close to expiry, and the wake watcher that debounces
//! focus/visibility signals into warm checks.

pub mod api;
pub mod claims;
pub mod error;
pub mod refresh;
pub mod session;
pub mod token_store;
pub mod wake;
pub mod warmer;

pub use api::{AuthApi, GoTrueClient};
pub use claims::SessionClaims;
pub use error::AuthError;
pub use session::{AuthEvent, AuthUser, Session, SessionManager};
pub use token_store::TokenStore;
pub use wake::{OnWake, WakeEvent, WakeSender, WakeWatcher};
pub use warmer::{SessionSource, SessionWarmer, WarmOutcome, WarmPhase, WarmStatus};
