//! Common test utilities: a scripted in-memory naming world
//!
//! [`FakeWorld`] stands in for the remote naming system. Tests declare
//! nodes (subtables, servers, broken servers), then hand
//! `world.transport()` to a browser. Glob streams deliver children in
//! name order; failure switches and stream holds make cache-invalidation
//! and out-of-order scenarios deterministic. Call counters let tests
//! assert exactly how much transport traffic an operation caused.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Notify};

use periplus::error::{PeriplusError, Result};
use periplus::signature::{InterfaceSpec, MethodSpec, ServiceSignature};
use periplus::transport::{GlobCall, GlobReply, MountEntry, NamingTransport, ServiceHandle};

static TRACING: Once = Once::new();

/// Route test logs through the tracing subscriber when RUST_LOG is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[derive(Clone)]
struct FakeNode {
    servers: Vec<String>,
    signature: Option<ServiceSignature>,
    signature_error: Option<String>,
    outputs: HashMap<String, Vec<Value>>,
}

struct WorldInner {
    /// Full name → node, ordered so glob streams deliver by name.
    nodes: RwLock<BTreeMap<String, FakeNode>>,
    /// Endpoint address → full name it serves.
    endpoints: RwLock<HashMap<String, String>>,
    /// `name|query` → release gate for a held glob stream.
    holds: RwLock<HashMap<String, Arc<Notify>>>,
    /// `name|query` → fail the stream after this many entries.
    glob_failures: RwLock<HashMap<String, (usize, String)>>,
    resolve_calls: AtomicUsize,
    glob_calls: AtomicUsize,
    signature_calls: AtomicUsize,
}

/// A scripted namespace for tests.
#[derive(Clone)]
pub struct FakeWorld {
    inner: Arc<WorldInner>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(WorldInner {
                nodes: RwLock::new(BTreeMap::new()),
                endpoints: RwLock::new(HashMap::new()),
                holds: RwLock::new(HashMap::new()),
                glob_failures: RwLock::new(HashMap::new()),
                resolve_calls: AtomicUsize::new(0),
                glob_calls: AtomicUsize::new(0),
                signature_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// An intermediary name: children may hang under it, nothing serves it.
    pub fn add_subtable(&self, name: &str) {
        self.insert(
            name,
            FakeNode {
                servers: Vec::new(),
                signature: None,
                signature_error: None,
                outputs: HashMap::new(),
            },
        );
    }

    /// A server answering with `signature` at the given endpoints.
    pub fn add_server(&self, name: &str, endpoints: &[&str], signature: ServiceSignature) {
        self.insert(
            name,
            FakeNode {
                servers: endpoints.iter().map(|e| e.to_string()).collect(),
                signature: Some(signature),
                signature_error: None,
                outputs: HashMap::new(),
            },
        );
        self.index_endpoints(name, endpoints);
    }

    /// A server whose signature request fails with `error`.
    pub fn add_broken_server(&self, name: &str, endpoints: &[&str], error: &str) {
        self.insert(
            name,
            FakeNode {
                servers: endpoints.iter().map(|e| e.to_string()).collect(),
                signature: None,
                signature_error: Some(error.to_string()),
                outputs: HashMap::new(),
            },
        );
        self.index_endpoints(name, endpoints);
    }

    /// Canned outputs for one method of one server, keyed by the declared
    /// method name.
    pub fn set_outputs(&self, name: &str, method: &str, outputs: Vec<Value>) {
        let mut nodes = self.inner.nodes.write().expect("world lock");
        if let Some(node) = nodes.get_mut(name) {
            node.outputs.insert(method.to_string(), outputs);
        }
    }

    /// Flip a server between broken and healthy.
    pub fn set_signature_error(&self, name: &str, error: Option<&str>) {
        let mut nodes = self.inner.nodes.write().expect("world lock");
        if let Some(node) = nodes.get_mut(name) {
            node.signature_error = error.map(|e| e.to_string());
        }
    }

    /// Make `glob(name, query)` deliver `after` entries and then fail.
    pub fn set_glob_failure(&self, name: &str, query: &str, after: usize, message: &str) {
        self.inner
            .glob_failures
            .write()
            .expect("world lock")
            .insert(format!("{}|{}", name, query), (after, message.to_string()));
    }

    /// Stop failing `glob(name, query)`.
    pub fn clear_glob_failure(&self, name: &str, query: &str) {
        self.inner
            .glob_failures
            .write()
            .expect("world lock")
            .remove(&format!("{}|{}", name, query));
    }

    /// Hold the next `glob(name, query)` stream until the returned gate is
    /// notified. Entries are captured when the glob is issued but not
    /// delivered until release.
    pub fn hold_glob(&self, name: &str, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner
            .holds
            .write()
            .expect("world lock")
            .insert(format!("{}|{}", name, query), Arc::clone(&gate));
        gate
    }

    pub fn transport(&self) -> Arc<dyn NamingTransport> {
        Arc::new(FakeTransport {
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn resolve_calls(&self) -> usize {
        self.inner.resolve_calls.load(Ordering::Relaxed)
    }

    pub fn glob_calls(&self) -> usize {
        self.inner.glob_calls.load(Ordering::Relaxed)
    }

    pub fn signature_calls(&self) -> usize {
        self.inner.signature_calls.load(Ordering::Relaxed)
    }

    fn insert(&self, name: &str, node: FakeNode) {
        self.inner
            .nodes
            .write()
            .expect("world lock")
            .insert(name.to_string(), node);
    }

    fn index_endpoints(&self, name: &str, endpoints: &[&str]) {
        let mut index = self.inner.endpoints.write().expect("world lock");
        for endpoint in endpoints {
            index.insert(endpoint.to_string(), name.to_string());
        }
    }
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldInner {
    fn node(&self, name: &str) -> Option<FakeNode> {
        self.nodes.read().expect("world lock").get(name).cloned()
    }

    /// Entries a glob of `query` under `root` delivers, in name order. An
    /// empty query yields the root itself.
    fn entries_for(&self, root: &str, query: &str) -> Vec<MountEntry> {
        let nodes = self.nodes.read().expect("world lock");
        if query.is_empty() {
            return nodes
                .get(root)
                .map(|node| vec![MountEntry::new("", node.servers.clone())])
                .unwrap_or_default();
        }
        let prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{}/", root)
        };
        nodes
            .iter()
            .filter_map(|(name, node)| {
                let leaf = name.strip_prefix(&prefix)?;
                if leaf.is_empty() || leaf.contains('/') || !glob_match(query, leaf) {
                    return None;
                }
                Some(MountEntry::new(leaf, node.servers.clone()))
            })
            .collect()
    }
}

/// Minimal glob matching: literal patterns plus a single `*` wildcard.
fn glob_match(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == name,
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
    }
}

struct FakeTransport {
    inner: Arc<WorldInner>,
}

#[async_trait]
impl NamingTransport for FakeTransport {
    async fn resolve(&self, name: &str) -> Result<Vec<String>> {
        self.inner.resolve_calls.fetch_add(1, Ordering::Relaxed);
        if self.inner.node(name).is_some() {
            Ok(vec![format!("mt://{}", name)])
        } else {
            Err(PeriplusError::Resolution(format!("name not found: {}", name)))
        }
    }

    async fn bind_to(&self, address: &str) -> Result<Arc<dyn ServiceHandle>> {
        let name = if let Some(name) = address.strip_prefix("mt://") {
            name.to_string()
        } else {
            self.inner
                .endpoints
                .read()
                .expect("world lock")
                .get(address)
                .cloned()
                .ok_or_else(|| PeriplusError::Rpc(format!("cannot bind {}", address)))?
        };
        if self.inner.node(&name).is_none() {
            return Err(PeriplusError::Rpc(format!("cannot bind {}", address)));
        }
        Ok(Arc::new(FakeHandle {
            inner: Arc::clone(&self.inner),
            name,
        }))
    }
}

struct FakeHandle {
    inner: Arc<WorldInner>,
    name: String,
}

#[async_trait]
impl ServiceHandle for FakeHandle {
    async fn glob(&self, query: &str) -> Result<GlobCall> {
        self.inner.glob_calls.fetch_add(1, Ordering::Relaxed);
        let key = format!("{}|{}", self.name, query);

        let mut replies: Vec<GlobReply> = self
            .inner
            .entries_for(&self.name, query)
            .into_iter()
            .map(GlobReply::Entry)
            .collect();
        let failure = self
            .inner
            .glob_failures
            .read()
            .expect("world lock")
            .get(&key)
            .cloned();
        if let Some((after, message)) = failure {
            replies.truncate(after);
            replies.push(GlobReply::Error(message));
        }

        let hold = self
            .inner
            .holds
            .read()
            .expect("world lock")
            .get(&key)
            .cloned();
        let (tx, rx) = mpsc::channel(replies.len().max(1));
        match hold {
            Some(gate) => {
                tokio::spawn(async move {
                    gate.notified().await;
                    for reply in replies {
                        if tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                });
            }
            None => {
                for reply in replies {
                    tx.try_send(reply).expect("reply channel sized to fit");
                }
            }
        }
        Ok(GlobCall::new(rx))
    }

    async fn signature(&self) -> Result<ServiceSignature> {
        self.inner.signature_calls.fetch_add(1, Ordering::Relaxed);
        let node = self
            .inner
            .node(&self.name)
            .ok_or_else(|| PeriplusError::Signature(format!("no node at {}", self.name)))?;
        if let Some(error) = node.signature_error {
            return Err(PeriplusError::Signature(error));
        }
        node.signature
            .ok_or_else(|| PeriplusError::Signature(format!("{} is not a server", self.name)))
    }

    async fn invoke(&self, method: &str, _args: Vec<Value>) -> Result<Vec<Value>> {
        let node = self
            .inner
            .node(&self.name)
            .ok_or_else(|| PeriplusError::Rpc(format!("no node at {}", self.name)))?;
        node.outputs
            .get(method)
            .cloned()
            .ok_or_else(|| PeriplusError::Rpc(format!("{} cannot handle {}", self.name, method)))
    }
}

/// Signature of a mount table node: glob plus mount management.
pub fn mounttable_signature() -> ServiceSignature {
    ServiceSignature::new(vec![InterfaceSpec {
        name: "MountTable".to_string(),
        pkg_path: "naming/mounttable".to_string(),
        doc: "Binds object names to servers".to_string(),
        methods: vec![
            MethodSpec::new("Glob").with_in_args(&["pattern"]),
            MethodSpec::new("Mount").with_in_args(&["server", "ttl"]),
            MethodSpec::new("Unmount").with_in_args(&["server"]),
        ],
    }])
}

/// Signature of the sample sprinkler service.
pub fn sprinkler_signature() -> ServiceSignature {
    ServiceSignature::new(vec![InterfaceSpec {
        name: "Sprinkler".to_string(),
        pkg_path: "sample/sprinkler".to_string(),
        doc: "Waters the lawn".to_string(),
        methods: vec![
            MethodSpec::new("Status").with_out_args(&["status"]),
            MethodSpec::new("Start").with_in_args(&["durationSeconds"]),
            MethodSpec::new("Stop"),
        ],
    }])
}

/// Signature of the sample alarm service.
pub fn alarm_signature() -> ServiceSignature {
    ServiceSignature::new(vec![InterfaceSpec {
        name: "Alarm".to_string(),
        pkg_path: "sample/alarm".to_string(),
        doc: "Guards the house".to_string(),
        methods: vec![
            MethodSpec::new("Status").with_out_args(&["status"]),
            MethodSpec::new("Arm"),
            MethodSpec::new("DelayArm").with_in_args(&["delaySeconds"]),
            MethodSpec::new("Unarm"),
        ],
    }])
}

/// The world most tests browse: a cottage garden, a house behind a
/// mounttable, and one broken server.
pub fn sample_world() -> FakeWorld {
    let world = FakeWorld::new();

    world.add_subtable("cottage");
    world.add_subtable("cottage/lawn");
    world.add_subtable("cottage/lawn/back");
    world.add_subtable("cottage/lawn/front");
    world.add_server("cottage/lawn/master-sprinkler", &["ep1"], sprinkler_signature());

    world.add_server("house", &["ep-house"], mounttable_signature());
    world.add_server("house/alarm", &["ep-alarm"], alarm_signature());
    world.add_subtable("house/kitchen");
    world.add_broken_server("house/broken", &["ep-broken"], "connection refused");

    world.add_subtable("garden");
    world.add_subtable("garden/shed");

    world.set_outputs("house/alarm", "Status", vec![Value::String("armed".to_string())]);
    world.set_outputs("house/alarm", "Arm", vec![]);

    world
}
