pub mod client;
pub mod memory;
pub mod shared;
pub mod token_cache;
pub mod valkey;

pub use client::{CacheClient, CacheError};
pub use memory::MemoryTokenCache;
pub use shared::SharedTokenCache;
pub use token_cache::TokenCache;
pub use valkey::ValkeyClient;
