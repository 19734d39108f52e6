pub mod format;
pub mod payload;
pub mod report;
pub mod types;

// Keep the public surface small and intentional.
pub use format::*;
pub use payload::*;
pub use report::*;
pub use types::*;
