pub mod client;
pub mod vehicles;

pub use client::{GraphqlClient, GraphqlResponse};
