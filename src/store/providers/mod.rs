//! Task store backends

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryTaskStore;
pub use self::redis::RedisTaskStore;
