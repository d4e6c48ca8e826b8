pub mod bootstrapper;
pub mod handle;
pub mod identity;

pub use bootstrapper::SessionBootstrapper;
pub use handle::SessionHandle;
pub use identity::{AuthUser, IdentityConfig, IdentityError, IdentityProvider, RestIdentityProvider};
