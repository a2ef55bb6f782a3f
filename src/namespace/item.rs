//! Items produced by globbing the namespace
//!
//! Every name a glob returns becomes one [`NamespaceItem`], classified by
//! what answered (or failed to answer) at that name. Classification is
//! final per item; a name globbed again later produces a new item.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::signature::ServiceSignature;

/// What kind of node an item turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Placeholder while classification is still in flight.
    Loading,
    /// An intermediary name with children but no server behind it.
    Subtable,
    /// A name served by one or more endpoints.
    Server,
    /// A server that did not answer a signature request.
    Inaccessible,
}

/// Human-facing description of a recognized service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTypeInfo {
    pub key: String,
    pub type_name: String,
    pub description: Option<String>,
    pub icon: String,
}

static MOUNTTABLE_TYPE: Lazy<ServiceTypeInfo> = Lazy::new(|| ServiceTypeInfo {
    key: "mounttable".to_string(),
    type_name: "Mount Table".to_string(),
    description: Some("Binds names to services and resolves them".to_string()),
    icon: "dns".to_string(),
});

static UNKNOWN_SERVICE_TYPE: Lazy<ServiceTypeInfo> = Lazy::new(|| ServiceTypeInfo {
    key: "unknown".to_string(),
    type_name: "Service".to_string(),
    description: None,
    icon: "cloud-queue".to_string(),
});

/// The recognized type of a server, judged from its signature. A service
/// exposing glob, mount and unmount is a mounttable; anything else is a
/// plain service.
pub fn service_type_info(signature: &ServiceSignature) -> ServiceTypeInfo {
    if signature.is_mounttable() {
        MOUNTTABLE_TYPE.clone()
    } else {
        UNKNOWN_SERVICE_TYPE.clone()
    }
}

/// Endpoint and type details, present only for items that are servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub type_info: ServiceTypeInfo,
    pub endpoints: Vec<String>,
}

/// One named object discovered in the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceItem {
    /// Full name used to reach the object.
    pub object_name: String,
    /// Name relative to its parent, as mounted.
    pub mounted_name: String,
    /// Whether the object can itself be globbed for children.
    pub is_globbable: bool,
    pub item_type: ItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

impl NamespaceItem {
    /// Placeholder for a name whose classification has not arrived yet.
    /// Views show this row until the classified item for the same object
    /// name replaces it; the browser itself only publishes classified
    /// items.
    pub fn loading(object_name: impl Into<String>, mounted_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            mounted_name: mounted_name.into(),
            is_globbable: false,
            item_type: ItemType::Loading,
            item_error: None,
            server_info: None,
        }
    }

    /// An intermediary node: globbable, nothing serving it directly.
    pub fn subtable(object_name: impl Into<String>, mounted_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            mounted_name: mounted_name.into(),
            is_globbable: true,
            item_type: ItemType::Subtable,
            item_error: None,
            server_info: None,
        }
    }

    /// A reachable server with a known signature.
    pub fn server(
        object_name: impl Into<String>,
        mounted_name: impl Into<String>,
        signature: &ServiceSignature,
        endpoints: Vec<String>,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            mounted_name: mounted_name.into(),
            is_globbable: signature.is_globbable(),
            item_type: ItemType::Server,
            item_error: None,
            server_info: Some(ServerInfo {
                type_info: service_type_info(signature),
                endpoints,
            }),
        }
    }

    /// A server that failed to answer a signature request. The failure is
    /// kept on the item; it never aborts sibling results.
    pub fn inaccessible(
        object_name: impl Into<String>,
        mounted_name: impl Into<String>,
        error: impl Into<String>,
        endpoints: Vec<String>,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            mounted_name: mounted_name.into(),
            is_globbable: false,
            item_type: ItemType::Inaccessible,
            item_error: Some(error.into()),
            server_info: Some(ServerInfo {
                type_info: UNKNOWN_SERVICE_TYPE.clone(),
                endpoints,
            }),
        }
    }

    pub fn is_server(&self) -> bool {
        self.item_type == ItemType::Server
    }
}
