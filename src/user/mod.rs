pub mod directory;

pub use directory::{InMemoryPlayerDirectory, PlayerDirectory};
