use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// Key names of the fields every usable node carries.
const NAME_KEY: &str = "name";
const TYPE_KEY: &str = "type";
const SERVER_KEY: &str = "server";
const PORT_KEY: &str = "port";

/// Port of a proxy endpoint.
///
/// Subscription documents write ports either as YAML integers or as quoted
/// strings, so both shapes are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Port {
    Number(u64),
    Text(String),
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Port {
    fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number((*n).into()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

/// One proxy endpoint taken from the `proxies` list of a subscription.
///
/// The four display fields are lifted out of the raw mapping; every other key
/// (credentials, cipher, transport options, ...) stays in `extra` in document
/// order so the node can be written back out without losing anything.
///
/// A display field whose document value is not a plain non-empty string (an
/// integer name, `server: ""`, `port: -1`) is also kept in `extra` under its
/// own key, and [`ProxyNode::to_mapping`] writes that original value back.
///
/// Fields that are missing from the document are left empty. Use
/// [`ProxyNode::is_usable`] to check whether all required fields are present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProxyNode {
    pub name: String,
    /// Protocol tag (`ss`, `vmess`, `trojan`, ...). Written as `type` in documents.
    pub proxy_type: String,
    pub server: String,
    pub port: Option<Port>,
    pub extra: Mapping,
}

impl ProxyNode {
    /// Build a node from one entry of a `proxies` sequence.
    ///
    /// Scalar values of the display fields are rendered as strings (YAML lets
    /// `name: 2024` through as an integer). A non-scalar value under one of
    /// those keys is left in `extra` untouched.
    pub fn from_mapping(map: &Mapping) -> Self {
        let mut node = Self::default();

        for (key, value) in map {
            let slot = match key.as_str() {
                Some(NAME_KEY) => Some(&mut node.name),
                Some(TYPE_KEY) => Some(&mut node.proxy_type),
                Some(SERVER_KEY) => Some(&mut node.server),
                Some(PORT_KEY) => {
                    node.port = port_from_value(value);
                    if !is_plain_port(value) {
                        node.extra.insert(key.clone(), value.clone());
                    }
                    continue;
                }
                _ => None,
            };

            match (slot, scalar_to_string(value)) {
                (Some(slot), Some(text)) => {
                    *slot = text;
                    if !is_plain_text(value) {
                        node.extra.insert(key.clone(), value.clone());
                    }
                }
                _ => {
                    node.extra.insert(key.clone(), value.clone());
                }
            }
        }

        node
    }

    /// Whether `name`, `type`, `server` and `port` are all present.
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty()
            && !self.proxy_type.is_empty()
            && !self.server.is_empty()
            && self.port.is_some()
    }

    /// Case-insensitive substring match against name, type and server.
    ///
    /// `needle` must already be lowercase; callers filtering many nodes
    /// lowercase the query once.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.proxy_type.to_lowercase().contains(needle)
            || self.server.to_lowercase().contains(needle)
    }

    /// Rebuild the document mapping: display fields first, then extras in order.
    ///
    /// Display values that were kept in `extra` are written back as they
    /// appeared in the document.
    pub fn to_mapping(&self) -> Mapping {
        let mut map = Mapping::with_capacity(self.extra.len() + 4);
        let texts = [
            (NAME_KEY, &self.name),
            (TYPE_KEY, &self.proxy_type),
            (SERVER_KEY, &self.server),
        ];
        for (key, text) in texts {
            if let Some(original) = self.extra.get(key) {
                map.insert(key.into(), original.clone());
            } else if !text.is_empty() {
                map.insert(key.into(), text.clone().into());
            }
        }
        if let Some(original) = self.extra.get(PORT_KEY) {
            map.insert(PORT_KEY.into(), original.clone());
        } else if let Some(port) = &self.port {
            map.insert(PORT_KEY.into(), port.to_value());
        }
        // Keys already placed above keep their position
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    /// Pretty-printed JSON form, used for clipboard copies.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ProxyNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_mapping().serialize(serializer)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A display value the typed field reproduces exactly.
fn is_plain_text(value: &Value) -> bool {
    matches!(value, Value::String(s) if !s.is_empty())
}

fn is_plain_port(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_u64().is_some(),
        Value::String(_) => true,
        _ => false,
    }
}

fn port_from_value(value: &Value) -> Option<Port> {
    match value {
        Value::Number(n) => Some(
            n.as_u64()
                .map(Port::Number)
                .unwrap_or_else(|| Port::Text(n.to_string())),
        ),
        Value::String(s) => Some(Port::Text(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_lifts_display_fields() {
        let node = ProxyNode::from_mapping(&mapping(
            "{name: hk-01, type: ss, server: hk.example.com, port: 443, cipher: aes-128-gcm}",
        ));
        assert_eq!(node.name, "hk-01");
        assert_eq!(node.proxy_type, "ss");
        assert_eq!(node.server, "hk.example.com");
        assert_eq!(node.port, Some(Port::Number(443)));
        assert_eq!(node.extra.len(), 1);
        assert_eq!(
            node.extra.get("cipher").and_then(Value::as_str),
            Some("aes-128-gcm")
        );
        assert!(node.is_usable());
    }

    #[test]
    fn test_string_port_kept_as_text() {
        let node = ProxyNode::from_mapping(&mapping(
            "{name: a, type: vmess, server: b, port: \"8443\"}",
        ));
        assert_eq!(node.port, Some(Port::Text("8443".to_string())));
        assert_eq!(node.port.unwrap().to_string(), "8443");
    }

    #[test]
    fn test_numeric_name_rendered_as_string() {
        let node = ProxyNode::from_mapping(&mapping("{name: 2024, type: ss, server: h, port: 1}"));
        assert_eq!(node.name, "2024");
    }

    #[test]
    fn test_missing_fields_pass_through() {
        let node = ProxyNode::from_mapping(&mapping("{name: only-name, uuid: abc}"));
        assert_eq!(node.name, "only-name");
        assert!(node.proxy_type.is_empty());
        assert!(node.port.is_none());
        assert!(!node.is_usable());
        assert!(node.extra.contains_key("uuid"));
    }

    #[test]
    fn test_non_scalar_display_field_stays_in_extra() {
        let node = ProxyNode::from_mapping(&mapping("{name: [a, b], type: ss, server: h, port: 1}"));
        assert!(node.name.is_empty());
        assert!(node.extra.get("name").and_then(Value::as_sequence).is_some());
    }

    #[test]
    fn test_to_mapping_puts_display_fields_first() {
        let node = ProxyNode::from_mapping(&mapping(
            "{udp: true, port: 80, server: s, type: trojan, password: pw, name: n}",
        ));
        let mapping = node.to_mapping();
        let keys: Vec<&str> = mapping.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["name", "type", "server", "port", "udp", "password"]);
    }

    #[test]
    fn test_odd_display_values_are_written_back_unchanged() {
        let source = mapping("{name: \"\", type: ss, server: 10, port: -1, udp: true}");
        let node = ProxyNode::from_mapping(&source);

        assert!(node.name.is_empty());
        assert_eq!(node.server, "10");
        assert_eq!(node.port, Some(Port::Text("-1".to_string())));
        assert!(!node.is_usable());

        assert_eq!(node.to_mapping(), source);
        let mapping = node.to_mapping();
        let keys: Vec<&str> = mapping.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["name", "type", "server", "port", "udp"]);
    }

    #[test]
    fn test_json_copy_keeps_numeric_name() {
        let node = ProxyNode::from_mapping(&mapping("{name: 2024, type: ss, server: h, port: 1, tfo: false}"));
        let json: serde_json::Value = serde_json::from_str(&node.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": 2024, "type": "ss", "server": "h", "port": 1, "tfo": false})
        );
    }

    #[test]
    fn test_json_copy_format() {
        let node = ProxyNode::from_mapping(&mapping(
            "{name: n1, type: ss, server: h1, port: 443, udp: true}",
        ));
        let json: serde_json::Value = serde_json::from_str(&node.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "n1", "type": "ss", "server": "h1", "port": 443, "udp": true})
        );
    }

    #[test]
    fn test_matches_is_case_insensitive_over_three_fields() {
        let node = ProxyNode::from_mapping(&mapping(
            "{name: Tokyo-VIP, type: VMess, server: JP.Example.net, port: 1, uuid: Secret}",
        ));
        assert!(node.matches("tokyo"));
        assert!(node.matches("vmess"));
        assert!(node.matches("example.net"));
        assert!(node.matches(""));
        // Extras are not searched
        assert!(!node.matches("secret"));
    }
}
