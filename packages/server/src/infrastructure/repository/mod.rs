//! Directory repository implementations.

pub mod inmemory;

pub use inmemory::InMemoryDirectoryRepository;
