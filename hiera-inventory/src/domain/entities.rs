//! Domain entities: core data structures

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::domain::DomainError;

/// First-entry marker that turns a settings list into "select everything".
pub const ALL_SENTINEL: &str = "all";

fn starts_with_all(list: &[String]) -> bool {
    list.first().is_some_and(|first| first == ALL_SENTINEL)
}

/// Which environments go into the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentSelector {
    /// Every node file found in the nodes directory
    All,
    /// Named environments, in the given order
    Explicit(Vec<String>),
}

impl EnvironmentSelector {
    /// Decode a raw settings list; `["all", ...]` selects everything.
    pub fn from_list(list: Vec<String>) -> Self {
        if starts_with_all(&list) {
            Self::All
        } else {
            Self::Explicit(list)
        }
    }
}

/// Which services of an environment go into the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceSelector {
    /// Every service in the node document, minus the ignored ones
    All,
    /// Named services, in the given order
    Explicit(Vec<String>),
}

impl ServiceSelector {
    /// Decode a raw settings list; `["all", ...]` selects everything.
    pub fn from_list(list: Vec<String>) -> Self {
        if starts_with_all(&list) {
            Self::All
        } else {
            Self::Explicit(list)
        }
    }

    /// Pick the services of `document` this selector asks for, in output order.
    ///
    /// `All` walks the document in its own key order and drops names in `ignored`.
    /// `Explicit` walks the requested names and silently skips those the document
    /// does not define; `ignored` does not apply to explicit requests.
    pub fn select<'a>(
        &'a self,
        document: &'a NodeDocument,
        ignored: &BTreeSet<String>,
    ) -> Vec<(&'a str, &'a [Host])> {
        match self {
            Self::All => document
                .iter()
                .filter(|(service, _)| !ignored.contains(*service))
                .collect(),
            Self::Explicit(requested) => requested
                .iter()
                .filter_map(|service| {
                    document
                        .get(service)
                        .map(|hosts| (service.as_str(), hosts))
                })
                .collect(),
        }
    }
}

/// One DNS entry of a service, kept as the YAML scalar the node file holds.
///
/// Serializes unchanged: strings stay strings, numbers stay numbers, booleans stay booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Host(Value);

impl Host {
    /// `None` for null and structured values.
    fn from_scalar(value: Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(Self(value)),
            Value::Tagged(tagged) => Self::from_scalar(tagged.value),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl From<&str> for Host {
    fn from(name: &str) -> Self {
        Self(Value::String(name.to_string()))
    }
}

/// Top-level entries of a node file in document order, repeated keys included.
///
/// Only the top level tolerates repeated service names; nested values are plain YAML.
#[derive(Debug, Default)]
pub struct NodeEntries(pub Vec<(Value, Value)>);

impl<'de> Deserialize<'de> for NodeEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = NodeEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of services to DNS names")
            }

            fn visit_unit<E: de::Error>(self) -> Result<NodeEntries, E> {
                Ok(NodeEntries::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<NodeEntries, E> {
                Ok(NodeEntries::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NodeEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<serde_yaml::Value, serde_yaml::Value>()? {
                    entries.push(entry);
                }
                Ok(NodeEntries(entries))
            }
        }

        deserializer.deserialize_any(EntriesVisitor)
    }
}

/// Service → DNS names of a single environment, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDocument {
    services: Vec<(String, Vec<Host>)>,
    index: HashMap<String, usize>,
}

impl NodeDocument {
    /// Build a node document from its top-level entries.
    ///
    /// Values must be sequences of scalars; a `null` value is an empty list.
    /// A repeated service name keeps its first position and its last value.
    pub fn from_entries(entries: NodeEntries) -> Result<Self, DomainError> {
        let mut document = Self::default();
        for (key, hosts) in entries.0 {
            let service = service_name(&key).ok_or(DomainError::InvalidServiceName {
                found: kind_of(&key),
            })?;
            let hosts = match hosts {
                Value::Null => Vec::new(),
                Value::Sequence(entries) => entries
                    .into_iter()
                    .map(|entry| {
                        let found = kind_of(&entry);
                        Host::from_scalar(entry).ok_or_else(|| DomainError::InvalidDnsName {
                            service: service.clone(),
                            found,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                other => {
                    return Err(DomainError::InvalidServiceValue {
                        service,
                        found: kind_of(&other),
                    })
                }
            };
            document.insert(service, hosts);
        }

        Ok(document)
    }

    fn insert(&mut self, service: String, hosts: Vec<Host>) {
        match self.index.get(&service) {
            Some(&slot) => self.services[slot].1 = hosts,
            None => {
                self.index.insert(service.clone(), self.services.len());
                self.services.push((service, hosts));
            }
        }
    }

    /// DNS names of `service`, if the document defines it.
    pub fn get(&self, service: &str) -> Option<&[Host]> {
        self.index
            .get(service)
            .map(|&slot| self.services[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Host])> {
        self.services
            .iter()
            .map(|(name, hosts)| (name.as_str(), hosts.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Service names become group name suffixes, so they must be text.
fn service_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => service_name(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Flat inventory: `"<environment>.<service>"` → DNS names, in insertion order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    groups: Vec<(String, Vec<Host>)>,
    index: HashMap<String, usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite group name for an environment/service pair.
    pub fn group_name(environment: &str, service: &str) -> String {
        format!("{environment}.{service}")
    }

    /// Add a group; an existing group of the same name is replaced in place.
    pub fn insert(&mut self, environment: &str, service: &str, hosts: Vec<Host>) {
        let name = Self::group_name(environment, service);
        match self.index.get(&name) {
            Some(&slot) => self.groups[slot].1 = hosts,
            None => {
                self.index.insert(name.clone(), self.groups.len());
                self.groups.push((name, hosts));
            }
        }
    }

    pub fn get(&self, group: &str) -> Option<&[Host]> {
        self.index
            .get(group)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, hosts) in &self.groups {
            map.serialize_entry(name, hosts)?;
        }
        map.end()
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like setting.
///
/// Unknown variables leave the input untouched.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<NodeDocument, DomainError> {
        NodeDocument::from_entries(serde_yaml::from_str(yaml).unwrap())
    }

    fn doc(yaml: &str) -> NodeDocument {
        parse(yaml).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn hosts(items: &[&str]) -> Vec<Host> {
        items.iter().map(|s| Host::from(*s)).collect()
    }

    #[test]
    fn given_all_as_first_entry_when_decoding_then_selects_everything() {
        assert_eq!(
            EnvironmentSelector::from_list(strings(&["all", "prod"])),
            EnvironmentSelector::All
        );
        assert_eq!(
            ServiceSelector::from_list(strings(&["all"])),
            ServiceSelector::All
        );
    }

    #[test]
    fn given_all_not_first_when_decoding_then_stays_explicit() {
        assert_eq!(
            ServiceSelector::from_list(strings(&["web", "all"])),
            ServiceSelector::Explicit(strings(&["web", "all"]))
        );
        assert_eq!(
            EnvironmentSelector::from_list(vec![]),
            EnvironmentSelector::Explicit(vec![])
        );
    }

    #[test]
    fn given_mapping_when_parsing_node_document_then_keeps_document_order() {
        let document = doc("zeta: [z.example.com]\nalpha: [a.example.com, b.example.com]\n");

        let names: Vec<&str> = document.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(
            document.get("alpha"),
            Some(&hosts(&["a.example.com", "b.example.com"])[..])
        );
    }

    #[test]
    fn given_numeric_entries_when_serializing_then_values_pass_through_as_parsed() {
        let document = doc("web: [0x1F, 1.50, 1_000, true, 10.0.0.1]\n");

        let json = serde_json::to_string(document.get("web").unwrap()).unwrap();

        assert_eq!(json, r#"[31,1.5,"1_000",true,"10.0.0.1"]"#);
    }

    #[test]
    fn given_null_service_when_parsing_then_empty_and_numeric_key_is_text() {
        let document = doc("web: ~\n404: [x.example.com]\n");

        assert_eq!(document.get("web"), Some(&[][..]));
        assert_eq!(document.get("404"), Some(&hosts(&["x.example.com"])[..]));
    }

    #[test]
    fn given_null_document_when_parsing_then_document_is_empty() {
        assert!(doc("~\n").is_empty());
    }

    #[test]
    fn given_repeated_service_when_parsing_then_last_value_wins_at_first_position() {
        let document = doc("web: [a]\ndb: [d]\nweb: [b]\n");

        let names: Vec<&str> = document.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["web", "db"]);
        assert_eq!(document.get("web"), Some(&hosts(&["b"])[..]));
    }

    #[test]
    fn given_non_mapping_when_parsing_entries_then_fails() {
        assert!(serde_yaml::from_str::<NodeEntries>("- a\n- b\n").is_err());
    }

    #[test]
    fn given_scalar_service_value_when_parsing_then_fails() {
        let err = parse("web: a.example.com\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidServiceValue { ref service, .. } if service == "web"));
    }

    #[test]
    fn given_nested_dns_entry_when_parsing_then_fails() {
        let err = parse("web: [{host: a}]\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidDnsName { found: "a mapping", .. }));
    }

    #[test]
    fn given_all_services_when_selecting_then_skips_ignored() {
        let document = doc("web: [w1]\ndb: [d1]\ncache: [c1]\n");
        let ignored: BTreeSet<String> = ["db".to_string()].into();

        let selected = ServiceSelector::All.select(&document, &ignored);

        let names: Vec<&str> = selected.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["web", "cache"]);
    }

    #[test]
    fn given_explicit_services_when_selecting_then_uses_request_order_and_skips_missing() {
        let document = doc("web: [w1]\ndb: [d1]\n");
        let selector = ServiceSelector::Explicit(strings(&["db", "missing", "web"]));
        let ignored: BTreeSet<String> = ["db".to_string()].into();

        let selected = selector.select(&document, &ignored);

        let names: Vec<&str> = selected.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["db", "web"]);
    }

    #[test]
    fn given_existing_group_when_inserting_then_replaces_in_place() {
        let mut inventory = Inventory::new();
        inventory.insert("prod", "web", hosts(&["a"]));
        inventory.insert("prod", "db", hosts(&["b"]));
        inventory.insert("prod", "web", hosts(&["c"]));

        assert_eq!(inventory.groups().collect::<Vec<_>>(), vec!["prod.web", "prod.db"]);
        assert_eq!(inventory.get("prod.web"), Some(&hosts(&["c"])[..]));
        assert_eq!(inventory.get("prod.db"), Some(&hosts(&["b"])[..]));
    }

    #[test]
    fn given_inventory_when_serializing_then_keys_follow_insertion_order() {
        let mut inventory = Inventory::new();
        inventory.insert("staging", "web", hosts(&["s1"]));
        inventory.insert("prod", "web", hosts(&["p1", "p2"]));

        let json = serde_json::to_string(&inventory).unwrap();

        assert_eq!(json, r#"{"staging.web":["s1"],"prod.web":["p1","p2"]}"#);
    }

    #[test]
    fn given_plain_path_when_expanding_then_unchanged() {
        assert_eq!(expand_env_vars("/etc/puppet/hiera.yaml"), "/etc/puppet/hiera.yaml");
    }
}
