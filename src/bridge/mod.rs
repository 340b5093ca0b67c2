pub mod server;
pub mod types;

pub use server::*;
pub use types::*;
