pub mod base;
pub mod jar_store;
pub mod memory_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{CredentialStore, create_store};"
pub use base::{create_store, CredentialStore};
pub use jar_store::JarCredentialStore;
pub use memory_store::MemoryCredentialStore;
