mod jobber;
mod traits;

pub use jobber::JobberProvider;
pub use traits::{OAuthProvider, TokenSet};
