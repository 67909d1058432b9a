// Library exports for the binary and integration tests
pub mod config;
pub mod corpus;
pub mod digest;
pub mod error;
pub mod highlights;
pub mod logging;
pub mod progress;
pub mod renderer;
pub mod slack;
pub mod stats;
pub mod timefmt;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use digest::{generate_and_post_digest, DigestRunner};
pub use error::{ApiError, DigestError};
pub use slack::WorkspaceApi;
