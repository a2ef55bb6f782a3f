//! Name manipulation utilities for hierarchical object names
//!
//! Object names are `/`-delimited. A *rooted* name begins with a slash and
//! carries a server address as its first component, e.g.
//! `/ns.example.com:8101/global/rps`; everything after the address is the
//! suffix relative to that server.

/// True when the name is rooted (addresses a specific server).
pub fn is_rooted(name: &str) -> bool {
    name.starts_with('/')
}

/// Collapse duplicate slashes and strip the trailing slash (a bare root
/// `/` is preserved).
pub fn clean(name: &str) -> String {
    let rooted = is_rooted(name);
    let joined = name
        .split('/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if rooted {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Join two name fragments with a single separator, tolerating stray
/// slashes on either side of the seam.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        return clean(child);
    }
    if child.is_empty() {
        return clean(parent);
    }
    clean(&format!("{}/{}", parent, child))
}

/// The last segment of a name: the name the object was mounted under.
pub fn basename(name: &str) -> String {
    clean(name)
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Split a rooted name into `(address, suffix)`. Non-rooted names have an
/// empty address and are all suffix.
pub fn split_address_name(name: &str) -> (String, String) {
    let cleaned = clean(name);
    if !is_rooted(&cleaned) {
        return (String::new(), cleaned);
    }
    let trimmed = &cleaned[1..];
    match trimmed.find('/') {
        Some(slash) => (
            trimmed[..slash].to_string(),
            trimmed[slash + 1..].to_string(),
        ),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Parse a name into its namespace parts: the address (if rooted)
/// followed by each suffix segment.
///
/// `"/ns.example.com:8101/global/rps"` ⇒
/// `["ns.example.com:8101", "global", "rps"]`.
pub fn parse_name(name: &str) -> Vec<String> {
    let (address, suffix) = split_address_name(name);
    let mut parts = Vec::new();
    if !address.is_empty() {
        parts.push(address);
    }
    if !suffix.is_empty() {
        parts.extend(suffix.split('/').map(str::to_string));
    }
    parts
}

/// Segment-aware prefix test: `prefix` names `name` itself or one of its
/// ancestors. Unlike a plain string prefix test, `house` is not a prefix
/// of `household`.
pub fn is_prefix_of(prefix: &str, name: &str) -> bool {
    let prefix = clean(prefix);
    let name = clean(name);
    if prefix.is_empty() {
        return true;
    }
    name == prefix || name.starts_with(&format!("{}/", prefix))
}
