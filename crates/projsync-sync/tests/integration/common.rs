//! Shared test helpers for collector and engine integration tests
//!
//! Provides an in-memory [`IRemoteCollection`] that records every call in
//! order and can be told to fail specific operations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use projsync_core::domain::errors::{RemoteCallError, Transience};
use projsync_core::domain::file::LocalFile;
use projsync_core::domain::newtypes::{DocumentId, ProjectId, RelativePath};
use projsync_core::domain::remote::{RemoteDocument, RemoteProjectHandle};
use projsync_core::ports::IRemoteCollection;
use projsync_sync::{RetryPolicy, SyncEngine, SyncOptions};

/// A remote call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Create(String),
    List,
    Delete(String),
    Upload(String),
}

#[derive(Default)]
struct State {
    docs: BTreeMap<String, Vec<RemoteDocument>>,
    ops: Vec<Op>,
    next_id: u32,
    fail_create: bool,
    fail_list: bool,
    fail_uploads: HashSet<String>,
    fail_deletes: HashSet<String>,
    flaky_uploads: HashMap<String, u32>,
    lost_responses: HashSet<String>,
}

/// Fails a call the way an adapter classifies it
fn fail<T>(transience: Transience, message: impl Into<String>) -> anyhow::Result<T> {
    Err(RemoteCallError::new(transience, message).into())
}

/// In-memory remote collection with failure injection
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<State>,
}

#[allow(dead_code)]
impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seeds a project with documents named `names` and returns its handle
    pub fn seed(&self, project: &str, names: &[&str]) -> RemoteProjectHandle {
        let mut state = self.state.lock().unwrap();
        let mut docs = Vec::new();
        for name in names {
            state.next_id += 1;
            docs.push(RemoteDocument {
                id: DocumentId::new(format!("doc-{}", state.next_id)).unwrap(),
                name: name.to_string(),
                content: format!("old {name}"),
                created_at: None,
            });
        }
        state.docs.insert(project.to_string(), docs);
        RemoteProjectHandle::new(ProjectId::new(project.to_string()).unwrap(), project)
    }

    pub fn fail_create(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    pub fn fail_list(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    pub fn fail_upload_of(&self, name: &str) {
        self.state.lock().unwrap().fail_uploads.insert(name.to_string());
    }

    /// Makes the delete of the document named `name` fail permanently
    pub fn fail_delete_of(&self, project: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        let id = state.docs[project]
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.to_string())
            .unwrap();
        state.fail_deletes.insert(id);
    }

    /// Makes the next `times` uploads of `name` fail with a transient error
    pub fn flaky_upload_of(&self, name: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .flaky_uploads
            .insert(name.to_string(), times);
    }

    /// Makes the first upload of `name` store the document and then fail
    /// as if the response had been lost
    pub fn lose_upload_response_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .lost_responses
            .insert(name.to_string());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Current documents as `(name, content)` pairs sorted by name
    pub fn contents(&self, project: &str) -> Vec<(String, String)> {
        let state = self.state.lock().unwrap();
        let mut docs: Vec<_> = state
            .docs
            .get(project)
            .map(|docs| {
                docs.iter()
                    .map(|d| (d.name.clone(), d.content.clone()))
                    .collect()
            })
            .unwrap_or_default();
        docs.sort();
        docs
    }

    pub fn names(&self, project: &str) -> Vec<String> {
        self.contents(project).into_iter().map(|(n, _)| n).collect()
    }
}

#[async_trait::async_trait]
impl IRemoteCollection for MockRemote {
    async fn create_project(
        &self,
        name: &str,
        _description: &str,
    ) -> anyhow::Result<RemoteProjectHandle> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push(Op::Create(name.to_string()));
        if state.fail_create {
            return fail(Transience::Permanent, "Forbidden (403): project limit reached");
        }
        state.next_id += 1;
        let id = format!("proj-{}", state.next_id);
        state.docs.insert(id.clone(), Vec::new());
        Ok(RemoteProjectHandle::new(ProjectId::new(id)?, name))
    }

    async fn list_documents(&self, project: &ProjectId) -> anyhow::Result<Vec<RemoteDocument>> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push(Op::List);
        if state.fail_list {
            return fail(Transience::Permanent, "Unauthorized (401)");
        }
        Ok(state
            .docs
            .get(project.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_document(&self, project: &ProjectId, id: &DocumentId) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push(Op::Delete(id.to_string()));
        if state.fail_deletes.contains(id.as_str()) {
            return fail(Transience::Permanent, "Not found (404)");
        }
        if let Some(docs) = state.docs.get_mut(project.as_str()) {
            docs.retain(|d| &d.id != id);
        }
        Ok(())
    }

    async fn upload_document(
        &self,
        project: &ProjectId,
        name: &str,
        content: &str,
    ) -> anyhow::Result<RemoteDocument> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push(Op::Upload(name.to_string()));
        if state.fail_uploads.contains(name) {
            return fail(
                Transience::Permanent,
                format!("Unexpected status 400: rejected {name}"),
            );
        }
        if let Some(remaining) = state.flaky_uploads.get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return fail(Transience::Retryable, "Server error (503): busy");
            }
        }
        state.next_id += 1;
        let doc = RemoteDocument {
            id: DocumentId::new(format!("doc-{}", state.next_id))?,
            name: name.to_string(),
            content: content.to_string(),
            created_at: None,
        };
        state
            .docs
            .entry(project.to_string())
            .or_default()
            .push(doc.clone());
        if state.lost_responses.remove(name) {
            return fail(Transience::Ambiguous, "operation timed out");
        }
        Ok(doc)
    }
}

/// An engine over `remote` that never sleeps between retries
#[allow(dead_code)]
pub fn engine(remote: Arc<MockRemote>) -> SyncEngine {
    let options = SyncOptions {
        retry: RetryPolicy {
            max_retries: 3,
            base_delay: std::time::Duration::ZERO,
        },
        ..SyncOptions::default()
    };
    SyncEngine::new(remote, options)
}

#[allow(dead_code)]
pub fn file(path: &str, content: &str) -> LocalFile {
    LocalFile::new(
        RelativePath::new(path.to_string()).unwrap(),
        content.as_bytes().to_vec(),
    )
}

/// Writes `content` at `rel` under `root`, creating parents as needed
#[allow(dead_code)]
pub fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
