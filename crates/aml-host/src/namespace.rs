//! Namespace tree
//!
//! Arena-backed ACPI namespace. Handles are arena indices, so they stay valid
//! for the lifetime of the tree and never own anything.

use aml_object::{AmlError, AmlName, AmlResult, NameSeg, Namespace, NodeHandle, NodeKind};

#[derive(Debug)]
struct Node {
    name: Option<NameSeg>,
    kind: NodeKind,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    alias_target: Option<NodeHandle>,
}

#[derive(Debug)]
pub struct NamespaceTree {
    nodes: Vec<Node>,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    pub const ROOT: NodeHandle = NodeHandle(0);

    /// Tree holding only the root scope
    pub fn new() -> Self {
        NamespaceTree {
            nodes: vec![Node {
                name: None,
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                alias_target: None,
            }],
        }
    }

    /// Add a child entry. Fails if `parent` is unknown or already has a child
    /// with the same name.
    pub fn add(&mut self, parent: NodeHandle, name: &str, kind: NodeKind) -> AmlResult<NodeHandle> {
        let seg = NameSeg::from_text(name)?;
        self.insert(parent, seg, kind, None)
    }

    /// Add an entry by absolute path; every scope above it must already exist
    pub fn add_path(&mut self, path: &str, kind: NodeKind) -> AmlResult<NodeHandle> {
        let name = AmlName::from_path(path)?;
        let (last, scopes) = match name.segments().split_last() {
            Some(split) if name.is_absolute() => split,
            _ => return Err(AmlError::IllegalArguments),
        };
        let mut parent = Self::ROOT;
        for seg in scopes {
            parent = self
                .lookup_child(parent, seg)
                .ok_or(AmlError::IllegalArguments)?;
        }
        self.insert(parent, *last, kind, None)
    }

    /// Add an alias that resolves to `target`
    pub fn add_alias(&mut self, parent: NodeHandle, name: &str, target: NodeHandle) -> AmlResult<NodeHandle> {
        if self.node(target).is_none() {
            return Err(AmlError::IllegalArguments);
        }
        let seg = NameSeg::from_text(name)?;
        self.insert(parent, seg, NodeKind::Alias, Some(target))
    }

    pub fn lookup_child(&self, parent: NodeHandle, seg: &NameSeg) -> Option<NodeHandle> {
        self.node(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0 as usize].name.as_ref() == Some(seg))
    }

    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node)?.parent
    }

    /// Absolute path of `node`, e.g. `\_SB.PCI0`
    pub fn path_of(&self, node: NodeHandle) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.node(node)?;
        while let Some(seg) = current.name {
            segments.push(seg);
            current = self.node(current.parent?)?;
        }
        segments.reverse();
        Some(AmlName::new(true, 0, segments).to_string())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0 as usize)
    }

    fn insert(
        &mut self,
        parent: NodeHandle,
        seg: NameSeg,
        kind: NodeKind,
        alias_target: Option<NodeHandle>,
    ) -> AmlResult<NodeHandle> {
        if self.node(parent).is_none() || self.lookup_child(parent, &seg).is_some() {
            return Err(AmlError::IllegalArguments);
        }
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: Some(seg),
            kind,
            parent: Some(parent),
            children: Vec::new(),
            alias_target,
        });
        self.nodes[parent.0 as usize].children.push(handle);
        log::trace!("namespace: added {:?} {}", kind, seg);
        Ok(handle)
    }

    /// Follow alias chains to the entry they name
    fn follow_alias(&self, mut handle: NodeHandle) -> NodeHandle {
        // Aliases can only target existing nodes, so a chain is at most as
        // long as the arena.
        for _ in 0..self.nodes.len() {
            match self.node(handle).and_then(|n| n.alias_target) {
                Some(target) => handle = target,
                None => break,
            }
        }
        handle
    }
}

impl Namespace for NamespaceTree {
    fn resolve(&self, context: NodeHandle, name: &AmlName) -> Option<NodeHandle> {
        self.node(context)?;

        if name.search_scopes() {
            let seg = &name.segments()[0];
            let mut scope = Some(context);
            while let Some(s) = scope {
                if let Some(found) = self.lookup_child(s, seg) {
                    return Some(self.follow_alias(found));
                }
                scope = self.parent(s);
            }
            return None;
        }

        let mut current = if name.is_absolute() { Self::ROOT } else { context };
        for _ in 0..name.height() {
            current = self.parent(current)?;
        }
        for seg in name.segments() {
            current = self.follow_alias(self.lookup_child(current, seg)?);
        }
        Some(current)
    }

    fn node_kind(&self, node: NodeHandle) -> Option<NodeKind> {
        self.node(node).map(|n| n.kind)
    }
}
