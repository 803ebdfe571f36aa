use super::ObjectStore;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// In-memory object store for tests. Records every mutating call and can be
/// told to fail reads, writes or deletes for specific keys.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, String>>,
    writes: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    failing_reads: Mutex<BTreeSet<String>>,
    failing_writes: Mutex<BTreeSet<String>>,
    failing_deletes: Mutex<BTreeSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, text: &str) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), text.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn fail_reads_of(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_writes_of(&self, key: &str) {
        self.failing_writes.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_deletes_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing_reads.lock().unwrap().clear();
        self.failing_writes.lock().unwrap().clear();
        self.failing_deletes.lock().unwrap().clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn read_text(&self, key: &str) -> Result<Option<String>> {
        if self.failing_reads.lock().unwrap().contains(key) {
            bail!("simulated read failure for {key}");
        }
        Ok(self.get(key))
    }

    async fn write_text(&self, key: &str, text: &str) -> Result<()> {
        if self.failing_writes.lock().unwrap().contains(key) {
            bail!("simulated write failure for {key}");
        }
        self.writes.lock().unwrap().push(key.to_string());
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), text.to_string());
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> Result<()> {
        if self.failing_deletes.lock().unwrap().contains(key) {
            bail!("simulated delete failure for {key}");
        }
        self.deletes.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
