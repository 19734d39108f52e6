pub mod engine;
pub mod machine;
pub mod traits;
