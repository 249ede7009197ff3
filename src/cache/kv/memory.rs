use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::cache::KvCache;
use crate::errors::{BlogkeeperError, Result};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(HashSet<String>),
}

/// 进程内缓存，用于单机部署与测试
#[derive(Default, Clone)]
pub struct MemoryKvCache {
    inner: Arc<DashMap<String, Value>>,
}

impl MemoryKvCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向集合加入成员（访客埋点由 Web 层负责，这里供单机与测试使用）
    pub fn add_to_set(&self, key: &str, member: &str) -> Result<bool> {
        let mut entry = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(HashSet::new()));
        match entry.value_mut() {
            Value::Set(set) => Ok(set.insert(member.to_string())),
            Value::Str(_) => Err(wrong_type(key)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

fn wrong_type(key: &str) -> BlogkeeperError {
    BlogkeeperError::cache_operation(format!(
        "WRONGTYPE Operation against key '{}' holding the wrong kind of value",
        key
    ))
}

#[async_trait]
impl KvCache for MemoryKvCache {
    async fn set_cardinality(&self, key: &str) -> Result<Option<u64>> {
        match self.inner.get(key).as_deref() {
            None => Ok(None),
            Some(Value::Set(set)) => Ok(Some(set.len() as u64)),
            Some(Value::Str(_)) => Err(wrong_type(key)),
        }
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.inner.get(key).as_deref() {
            None => Ok(None),
            Some(Value::Str(value)) => Ok(Some(value.clone())),
            Some(Value::Set(_)) => Err(wrong_type(key)),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .insert(key.to_string(), Value::Str(value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.inner.remove(key).is_some())
    }
}
