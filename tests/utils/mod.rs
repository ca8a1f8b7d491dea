pub mod setup;
pub mod submissions;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
#[allow(unused_imports)]
pub use submissions::{ConnectionsShare, StrandsShare, WordleShare};
