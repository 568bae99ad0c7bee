//! Persistence module split across logical submodules.

mod error;
mod store;

pub use error::StoreError;
pub use store::Store;
