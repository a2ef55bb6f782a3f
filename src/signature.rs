//! Service signature model
//!
//! Signatures describe the interfaces a remote service exposes. The
//! aggregation layer uses them to classify glob results (mounttable vs
//! plain service, globbable or not) and the learners use a stable
//! canonical identity derived from them in composite state keys.

use serde::{Deserialize, Serialize};

/// One named argument of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    pub type_name: String,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// One method of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub in_args: Vec<ArgSpec>,
    #[serde(default)]
    pub out_args: Vec<ArgSpec>,
    /// True for methods that stream results back instead of returning once.
    #[serde(default)]
    pub streaming: bool,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            in_args: Vec::new(),
            out_args: Vec::new(),
            streaming: false,
        }
    }

    pub fn with_in_args(mut self, args: &[&str]) -> Self {
        self.in_args = args.iter().map(|a| ArgSpec::new(*a, "string")).collect();
        self
    }

    pub fn with_out_args(mut self, args: &[&str]) -> Self {
        self.out_args = args.iter().map(|a| ArgSpec::new(*a, "string")).collect();
        self
    }
}

/// One interface of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub name: String,
    #[serde(default)]
    pub pkg_path: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

/// Full signature of a remote service: every interface it implements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSignature {
    pub interfaces: Vec<InterfaceSpec>,
}

/// Canonical method-name form: leading character lowercased. Remote
/// signatures arrive with exported (capitalized) method names; callers
/// address methods in lower camel case.
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ServiceSignature {
    pub fn new(interfaces: Vec<InterfaceSpec>) -> Self {
        Self { interfaces }
    }

    /// Find a method by canonical name across all interfaces.
    pub fn find_method(&self, name: &str) -> Option<&MethodSpec> {
        let wanted = uncapitalize(name);
        self.interfaces
            .iter()
            .flat_map(|interface| interface.methods.iter())
            .find(|method| uncapitalize(&method.name) == wanted)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.find_method(name).is_some()
    }

    /// A service is globbable when it exposes a `glob` method.
    pub fn is_globbable(&self) -> bool {
        self.has_method("glob")
    }

    /// Mounttable heuristic: the service can enumerate, mount, and
    /// unmount names.
    pub fn is_mounttable(&self) -> bool {
        self.has_method("glob") && self.has_method("mount") && self.has_method("unmount")
    }

    /// Stable canonical identity of this signature, used as the
    /// signature component of learner composite keys. Covers interface
    /// identity plus method names and in-arg names: close enough to
    /// uniquely identify a service shape without volatile detail (docs,
    /// types, out-args).
    pub fn canonical_key(&self) -> String {
        use serde_json::{json, Value};

        let interfaces: Vec<Value> = self
            .interfaces
            .iter()
            .map(|interface| {
                let methods: Vec<Value> = interface
                    .methods
                    .iter()
                    .map(|method| {
                        let in_args: Vec<Value> = method
                            .in_args
                            .iter()
                            .map(|arg| Value::String(arg.name.clone()))
                            .collect();
                        json!([method.name, in_args])
                    })
                    .collect();
                json!([
                    format!("{}.{}", interface.pkg_path, interface.name),
                    methods
                ])
            })
            .collect();

        Value::Array(interfaces).to_string()
    }
}
