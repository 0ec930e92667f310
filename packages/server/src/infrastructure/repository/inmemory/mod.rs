mod directory;

pub use directory::InMemoryDirectoryRepository;
