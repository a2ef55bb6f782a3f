//! Namespace browsing: streaming glob aggregation with result caching
//!
//! [`NamespaceBrowser`] is the entry point. A glob resolves the root
//! name, binds to the first address that answers, and returns a live
//! [`ObservableList`] immediately; a background task classifies each
//! streamed mount entry (subtable, server, or inaccessible) and appends
//! it in delivery order. Completed results are cached per `(name, query)`
//! in a small LRU; signatures are cached separately and much larger,
//! since they rarely change and are fetched far more often. A stream
//! error evicts the glob entry so the next identical request retries
//! instead of replaying a partial result.

pub mod cache;
pub mod item;
pub mod slot;

pub use cache::{CacheStats, ResultCache};
pub use item::{ItemType, NamespaceItem, ServerInfo, ServiceTypeInfo};
pub use slot::{RequestSlot, RequestToken, ViewSlot};

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::collection::ObservableList;
use crate::config::BrowserConfig;
use crate::error::{PeriplusError, Result};
use crate::naming;
use crate::signature::ServiceSignature;
use crate::transport::{GlobReply, MountEntry, NamingTransport, ServiceHandle};

/// A live, growing glob result.
pub type ItemList = Arc<ObservableList<NamespaceItem>>;

/// Browses a hierarchical namespace over a [`NamingTransport`]. Cheap to
/// clone; clones share the caches.
#[derive(Clone)]
pub struct NamespaceBrowser {
    transport: Arc<dyn NamingTransport>,
    glob_cache: Arc<ResultCache<String, ItemList>>,
    signature_cache: Arc<ResultCache<String, ServiceSignature>>,
    event_capacity: usize,
}

impl NamespaceBrowser {
    pub fn new(transport: Arc<dyn NamingTransport>, config: &BrowserConfig) -> Self {
        Self {
            transport,
            glob_cache: Arc::new(ResultCache::new(config.cache.glob_capacity)),
            signature_cache: Arc::new(ResultCache::new(config.cache.signature_capacity)),
            event_capacity: config.events.channel_capacity,
        }
    }

    pub fn with_defaults(transport: Arc<dyn NamingTransport>) -> Self {
        Self::new(transport, &BrowserConfig::default())
    }

    /// Glob `query` under `name`. Returns as soon as the result list
    /// exists; items keep arriving until the list turns terminal. A
    /// completed identical request is served straight from cache with no
    /// transport traffic.
    pub async fn glob(&self, name: &str, query: &str) -> Result<ItemList> {
        let root = naming::clean(name);
        let key = glob_cache_key(&root, query);

        if let Some(list) = self.glob_cache.get(&key) {
            debug!(name = %root, query = %query, "glob cache hit");
            return Ok(list);
        }

        let addresses = self.transport.resolve(&root).await?;
        let handle = self.bind_first(&root, &addresses).await?;
        let mut call = handle.glob(query).await?;
        debug!(name = %root, query = %query, "glob stream opened");

        let list: ItemList = Arc::new(ObservableList::new(self.event_capacity));

        let browser = self.clone();
        let stream_list = Arc::clone(&list);
        tokio::spawn(async move {
            let mut stream_error = None;
            let mut seen = HashSet::new();
            while let Some(reply) = call.replies.recv().await {
                match reply {
                    GlobReply::Entry(entry) => {
                        // Overlapping mounttable answers can repeat a name;
                        // the first classification stands.
                        if !seen.insert(entry.name.clone()) {
                            debug!(name = %entry.name, "duplicate glob entry dropped");
                            continue;
                        }
                        let item = browser.classify(&root, entry).await;
                        stream_list.push(item);
                    }
                    GlobReply::Error(message) => {
                        stream_error = Some(message);
                        break;
                    }
                }
            }
            match stream_error {
                None => {
                    // Install before signalling End so anyone woken by the
                    // terminal event already sees the cache entry.
                    browser.glob_cache.insert(key.clone(), Arc::clone(&stream_list));
                    stream_list.complete();
                    debug!(key = %key, items = stream_list.len(), "glob completed");
                }
                Some(message) => {
                    browser.glob_cache.remove(&key);
                    warn!(key = %key, error = %message, "glob stream failed");
                    stream_list.fail(message);
                }
            }
        });

        Ok(list)
    }

    /// All children of `name`: sugar for `glob(name, "*")`.
    pub async fn get_children(&self, name: &str) -> Result<ItemList> {
        self.glob(name, "*").await
    }

    /// The single item at `name` itself, classified like a glob result.
    pub async fn get_item(&self, name: &str) -> Result<NamespaceItem> {
        let list = self.glob(name, "").await?;
        list.wait_terminal().await;
        list.snapshot()
            .into_iter()
            .next()
            .ok_or_else(|| PeriplusError::NameNotFound(naming::clean(name)))
    }

    /// The signature of the service at `object_name`. Served from the
    /// signature cache when possible; cached only on success, so a
    /// transient failure is retried on the next call.
    pub async fn get_signature(&self, object_name: &str) -> Result<ServiceSignature> {
        let name = naming::clean(object_name);
        if let Some(signature) = self.signature_cache.get(&name) {
            debug!(name = %name, "signature cache hit");
            return Ok(signature);
        }
        let addresses = self.transport.resolve(&name).await?;
        self.signature_for(&name, &addresses).await
    }

    /// Invoke `method` on the service at `object_name` and shape the
    /// result by the method's declared outputs: none ⇒ null, one ⇒ the
    /// value itself, several ⇒ an array in declaration order.
    pub async fn invoke(&self, object_name: &str, method: &str, args: Vec<Value>) -> Result<Value> {
        let name = naming::clean(object_name);
        let signature = self.get_signature(&name).await?;
        let spec = signature.find_method(method).cloned().ok_or_else(|| {
            PeriplusError::MethodNotFound(format!("{} has no method {}", name, method))
        })?;

        let addresses = self.transport.resolve(&name).await?;
        let handle = self.bind_first(&name, &addresses).await?;
        let mut outputs = handle.invoke(&spec.name, args).await?;
        debug!(name = %name, method = %spec.name, outputs = outputs.len(), "invoked method");

        Ok(match spec.out_args.len() {
            0 => Value::Null,
            1 => {
                if outputs.is_empty() {
                    Value::Null
                } else {
                    outputs.swap_remove(0)
                }
            }
            _ => Value::Array(outputs),
        })
    }

    /// Forget cached results. With a prefix, only entries for that name
    /// or names under it are dropped; without one, both caches are
    /// emptied.
    pub fn clear_cache(&self, prefix: Option<&str>) {
        match prefix {
            None => {
                self.glob_cache.clear();
                self.signature_cache.clear();
            }
            Some(prefix) => {
                let root = naming::clean(prefix);
                let exact = format!("{}|", root);
                let below = format!("{}/", root);
                self.glob_cache
                    .remove_matching(|key| key.starts_with(&exact) || key.starts_with(&below));
                self.signature_cache
                    .remove_matching(|key| naming::is_prefix_of(&root, key));
            }
        }
    }

    pub fn glob_cache_stats(&self) -> CacheStats {
        self.glob_cache.stats()
    }

    pub fn signature_cache_stats(&self) -> CacheStats {
        self.signature_cache.stats()
    }

    /// Classify one mount entry into its final item. Signature trouble is
    /// recovered locally: the item comes back inaccessible with the error
    /// attached, and siblings are unaffected.
    async fn classify(&self, root: &str, entry: MountEntry) -> NamespaceItem {
        let object_name = naming::join(root, &entry.name);
        let mounted_name = naming::basename(&object_name);

        if entry.servers.is_empty() {
            return NamespaceItem::subtable(object_name, mounted_name);
        }
        match self.signature_for(&object_name, &entry.servers).await {
            Ok(signature) => {
                NamespaceItem::server(object_name, mounted_name, &signature, entry.servers)
            }
            Err(err) => {
                debug!(name = %object_name, error = %err, "classified item as inaccessible");
                NamespaceItem::inaccessible(object_name, mounted_name, err.to_string(), entry.servers)
            }
        }
    }

    /// Fetch (or recall) the signature of the server at `object_name`
    /// reachable through `addresses`.
    async fn signature_for(
        &self,
        object_name: &str,
        addresses: &[String],
    ) -> Result<ServiceSignature> {
        if let Some(signature) = self.signature_cache.get(&object_name.to_string()) {
            return Ok(signature);
        }
        let handle = self.bind_first(object_name, addresses).await?;
        let signature = handle.signature().await?;
        self.signature_cache
            .insert(object_name.to_string(), signature.clone());
        Ok(signature)
    }

    /// Bind to the first address that answers, in the order the resolver
    /// returned them.
    async fn bind_first(
        &self,
        name: &str,
        addresses: &[String],
    ) -> Result<Arc<dyn ServiceHandle>> {
        let mut last_error = None;
        for address in addresses {
            match self.transport.bind_to(address).await {
                Ok(handle) => return Ok(handle),
                Err(err) => {
                    debug!(name = %name, address = %address, error = %err, "bind attempt failed");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            PeriplusError::Resolution(format!("no addresses serve {}", name))
        }))
    }
}

fn glob_cache_key(name: &str, query: &str) -> String {
    format!("{}|{}", name, query)
}
