//! Repository implementations for DocVault entities.

pub mod grant;
pub mod node;
pub mod principal;

pub use grant::{GrantRepository, GrantWithEmail};
pub use node::{ChainWrite, SharedRoot, VersionNodeRepository};
pub use principal::PrincipalRepository;
