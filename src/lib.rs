//! Authentication gateway and sign-in flows.
//!
//! The crate fronts an external identity provider with a small capability
//! interface: register an account, sign in (password or a federated Google
//! token), trigger the verification email, and check the verification flag.
//! Every operation resolves to [`AuthResult`], a two-variant outcome carrying
//! either a fresh [`AuthenticatedUser`] snapshot or a user-displayable
//! [`UiMessage`]. Raw provider failures never cross the gateway boundary.
//!
//! [`provider::ProviderGateway`] is the production implementation, speaking
//! the provider's `accounts:*` REST surface. [`gateway::FakeAuthenticationGateway`]
//! is the in-memory stand-in for tests.

pub mod gateway;
pub mod message;
pub mod provider;
pub mod result;
pub mod state;
pub mod validate;

pub use gateway::{AuthenticatedUser, AuthenticationGateway, FakeAuthenticationGateway};
pub use message::UiMessage;
pub use provider::{ProviderConfig, ProviderGateway};
pub use result::AuthResult;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
