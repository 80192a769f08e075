mod engine;

pub use engine::{random_token, Signer};
