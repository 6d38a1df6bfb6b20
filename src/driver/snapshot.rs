//! Accessibility snapshot tree
//!
//! `SnapshotNode` is the owned tree the classifier walks. Nodes own their
//! children, so a cyclic snapshot cannot be represented. agent-browser
//! output (a JSON envelope around an indented text tree) is parsed into it
//! by [`AgentBrowserSnapshot::into_tree`].

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One node of an accessibility snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// ARIA role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Element type attribute (`button`, `text`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Accessible name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Driver handle for interacting with the element
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Child nodes; `null` entries are dropped
    #[serde(default, deserialize_with = "non_null_children", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

fn non_null_children<'de, D>(deserializer: D) -> Result<Vec<SnapshotNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let children: Option<Vec<Option<SnapshotNode>>> = Option::deserialize(deserializer)?;
    Ok(children.unwrap_or_default().into_iter().flatten().collect())
}

impl SnapshotNode {
    /// Create a node with a role
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Default::default()
        }
    }

    /// Set the accessible name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the element ref
    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the type attribute
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Set the description
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a child
    pub fn child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    pub fn with_children(mut self, children: impl IntoIterator<Item = SnapshotNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in the subtree, including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    fn role_str(&self) -> &str {
        self.role.as_deref().unwrap_or("")
    }
}

/// JSON envelope returned by `agent-browser snapshot --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBrowserSnapshot {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Snapshot data
    #[serde(default)]
    pub data: Option<SnapshotData>,
}

/// Snapshot data content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Raw snapshot string (indented accessibility tree)
    #[serde(default)]
    pub snapshot: String,
    /// Element refs mapped to their info
    #[serde(default)]
    pub refs: HashMap<String, RefInfo>,
}

/// Role and name recorded for a ref
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefInfo {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
}

impl AgentBrowserSnapshot {
    /// Convert into a tree, `None` when the page produced no snapshot
    pub fn into_tree(self) -> Option<SnapshotNode> {
        if !self.success {
            return None;
        }
        let data = self.data?;
        let mut root = parse_tree(&data.snapshot)?;
        fill_from_refs(&mut root, &data.refs);
        Some(root)
    }
}

/// Parse agent-browser's indented text tree
///
/// ```text
/// - heading "Example Domain" [ref=e1] [level=1]
/// - form:
///   - textbox "用户名" [ref=e2]
///   - button "登录" [ref=e3]
/// ```
///
/// Top-level entries become children of a synthetic `document` root.
/// Returns `None` for blank input.
pub fn parse_tree(text: &str) -> Option<SnapshotNode> {
    let mut root = SnapshotNode::new("document");
    let mut stack: Vec<(usize, SnapshotNode)> = Vec::new();
    let mut seen_any = false;

    for line in text.lines() {
        let Some((indent, node)) = parse_line(line) else {
            continue;
        };
        seen_any = true;

        while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
            if let Some((_, done)) = stack.pop() {
                attach(&mut stack, &mut root, done);
            }
        }
        stack.push((indent, node));
    }

    while let Some((_, done)) = stack.pop() {
        attach(&mut stack, &mut root, done);
    }

    seen_any.then_some(root)
}

fn attach(stack: &mut [(usize, SnapshotNode)], root: &mut SnapshotNode, node: SnapshotNode) {
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => root.children.push(node),
    }
}

fn parse_line(line: &str) -> Option<(usize, SnapshotNode)> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();
    let body = trimmed.strip_prefix('-')?.trim_start();
    if body.is_empty() {
        return None;
    }

    let role_end = body
        .find(|c: char| c == ' ' || c == ':')
        .unwrap_or(body.len());
    let mut node = SnapshotNode::new(&body[..role_end]);
    let mut rest = body[role_end..].trim_start();

    if let Some(quoted) = rest.strip_prefix('"') {
        if let Some(end) = quoted.find('"') {
            node.name = Some(quoted[..end].to_string());
            rest = quoted[end + 1..].trim_start();
        }
    }

    while let Some(attr_body) = rest.strip_prefix('[') {
        let Some(end) = attr_body.find(']') else {
            break;
        };
        let attr = &attr_body[..end];
        if let Some(reference) = attr.strip_prefix("ref=") {
            node.reference = Some(reference.to_string());
        } else if let Some(node_type) = attr.strip_prefix("type=") {
            node.node_type = Some(node_type.to_string());
        }
        rest = attr_body[end + 1..].trim_start();
    }

    if let Some(text) = rest.strip_prefix(':') {
        let text = text.trim();
        if !text.is_empty() {
            if node.name.is_none() {
                node.name = Some(text.trim_matches('"').to_string());
            } else {
                node.description = Some(text.to_string());
            }
        }
    }

    Some((indent, node))
}

fn fill_from_refs(root: &mut SnapshotNode, refs: &HashMap<String, RefInfo>) {
    if refs.is_empty() {
        return;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(info) = node.reference.as_deref().and_then(|r| refs.get(r)) {
            if node.name.is_none() && !info.name.is_empty() {
                node.name = Some(info.name.clone());
            }
            if node.role_str().is_empty() && !info.role.is_empty() {
                node.role = Some(info.role.clone());
            }
        }
        stack.extend(node.children.iter_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_TREE: &str = r#"- heading "欢迎登录" [ref=e1] [level=1]
- form:
  - textbox "用户名" [ref=e2]
  - textbox "密码" [ref=e3]
  - button "登录" [ref=e4]
- text: 版权所有 2024"#;

    #[test]
    fn test_parse_tree_structure() {
        let root = parse_tree(LOGIN_TREE).unwrap();
        assert_eq!(root.role.as_deref(), Some("document"));
        assert_eq!(root.children.len(), 3);

        let form = &root.children[1];
        assert_eq!(form.role.as_deref(), Some("form"));
        assert_eq!(form.children.len(), 3);
        assert_eq!(form.children[2].name.as_deref(), Some("登录"));
        assert_eq!(form.children[2].reference.as_deref(), Some("e4"));

        let text = &root.children[2];
        assert_eq!(text.role.as_deref(), Some("text"));
        assert_eq!(text.name.as_deref(), Some("版权所有 2024"));
        assert_eq!(root.node_count(), 7);
    }

    #[test]
    fn test_parse_tree_blank() {
        assert!(parse_tree("").is_none());
        assert!(parse_tree("\n   \n").is_none());
    }

    #[test]
    fn test_parse_tree_dedent_attaches_to_right_parent() {
        let text = "- list:\n  - listitem:\n    - link \"A\" [ref=e1]\n  - listitem:\n    - link \"B\" [ref=e2]\n- button \"C\" [ref=e3]";
        let root = parse_tree(text).unwrap();
        assert_eq!(root.children.len(), 2);
        let list = &root.children[0];
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.children[1].children[0].name.as_deref(), Some("B"));
        assert_eq!(root.children[1].name.as_deref(), Some("C"));
    }

    #[test]
    fn test_envelope_into_tree_fills_names_from_refs() {
        let json = r#"{
            "success": true,
            "data": {
                "snapshot": "- button [ref=e1]",
                "refs": { "e1": { "role": "button", "name": "保存" } }
            }
        }"#;
        let snapshot: AgentBrowserSnapshot = serde_json::from_str(json).unwrap();
        let root = snapshot.into_tree().unwrap();
        assert_eq!(root.children[0].name.as_deref(), Some("保存"));
    }

    #[test]
    fn test_envelope_failure_is_none() {
        let snapshot: AgentBrowserSnapshot =
            serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(snapshot.into_tree().is_none());
    }

    #[test]
    fn test_json_node_drops_null_children() {
        let json = r#"{
            "role": "main",
            "children": [null, {"role": "button", "name": "提交", "ref": "e9"}, null]
        }"#;
        let node: SnapshotNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].reference.as_deref(), Some("e9"));

        let bare: SnapshotNode = serde_json::from_str(r#"{"children": null}"#).unwrap();
        assert!(bare.is_leaf());
    }
}
