// OAuth callback: code exchange is delegated to the identity provider;
// this module only decides where to send the browser afterwards.

pub mod callback;
pub mod handlers;
pub mod identity;

pub use identity::{IdentityProvider, SupabaseIdentityClient};
