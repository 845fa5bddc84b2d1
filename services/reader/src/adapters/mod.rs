pub mod device;
pub mod github;
pub mod hasher;
pub mod memory;
pub mod wire;

pub use device::FileDeviceIdentity;
pub use github::GitHubContentsAdapter;
pub use hasher::Argon2Hasher;
pub use memory::InMemoryDocumentStore;
