mod memory;
mod redis;

pub use self::memory::MemoryKvCache;
pub use self::redis::RedisKvCache;
