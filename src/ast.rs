//! Read-only arena AST for one C++ translation unit.
//!
//! The tree is produced by an external dumper and loaded from an
//! [`AstDocument`]. Nodes are addressed by [`NodeId`]; parent links and
//! subtree bounds are computed once at load time so checks can walk in both
//! directions without owning any tree structure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::diagnostics::Position;
use crate::error::{ClippyError, ClippyResult};
use crate::standard::LanguageFlags;

/// Opaque handle of a node inside a [`TranslationUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte range `[begin, end)` into the main file's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub begin: usize,
    pub end: usize,
}

impl SourceRange {
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reference {
    #[default]
    None,
    LValue,
    RValue,
}

/// Resolved facts about a type, as reported by the dumper.
///
/// `decl` names the declaration behind the type after stripping references,
/// pointers and qualifiers (`const std::vector<int>&` has decl `std::vector`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeRef {
    pub spelling: String,
    pub decl: Option<String>,
    pub is_const: bool,
    pub reference: Reference,
    pub is_pointer: bool,
    pub is_integer: bool,
    pub is_scoped_enum: bool,
}

impl TypeRef {
    pub fn named(decl: &str) -> Self {
        Self {
            spelling: decl.to_string(),
            decl: Some(normalize_qualified_name(decl)),
            ..Self::default()
        }
    }

    pub fn const_ref(decl: &str) -> Self {
        Self {
            spelling: format!("const {decl} &"),
            is_const: true,
            reference: Reference::LValue,
            ..Self::named(decl)
        }
    }

    pub fn lvalue_ref(decl: &str) -> Self {
        Self {
            spelling: format!("{decl} &"),
            reference: Reference::LValue,
            ..Self::named(decl)
        }
    }

    pub fn rvalue_ref(decl: &str) -> Self {
        Self {
            spelling: format!("{decl} &&"),
            reference: Reference::RValue,
            ..Self::named(decl)
        }
    }

    pub fn pointer(spelling: &str) -> Self {
        Self {
            spelling: spelling.to_string(),
            is_pointer: true,
            ..Self::default()
        }
    }

    pub fn integer(spelling: &str) -> Self {
        Self {
            spelling: spelling.to_string(),
            is_integer: true,
            ..Self::default()
        }
    }

    pub fn scoped_enum(name: &str) -> Self {
        Self {
            is_scoped_enum: true,
            ..Self::named(name)
        }
    }

    /// Neither a reference nor a pointer.
    pub fn is_value(&self) -> bool {
        self.reference == Reference::None && !self.is_pointer
    }

    pub fn decl_name(&self) -> Option<&str> {
        self.decl.as_deref()
    }

    fn normalize(&mut self) {
        if let Some(decl) = self.decl.as_mut() {
            *decl = normalize_qualified_name(decl);
        }
    }
}

// ============================================================================
// Node kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=>")]
    Spaceship,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "&&")]
    LAnd,
    #[serde(rename = "||")]
    LOr,
    #[serde(other)]
    Other,
}

impl Opcode {
    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Eq => "==",
            Opcode::Ne => "!=",
            Opcode::Lt => "<",
            Opcode::Gt => ">",
            Opcode::Le => "<=",
            Opcode::Ge => ">=",
            Opcode::Spaceship => "<=>",
            Opcode::Shl => "<<",
            Opcode::Shr => ">>",
            Opcode::Add => "+",
            Opcode::Sub => "-",
            Opcode::Mul => "*",
            Opcode::Div => "/",
            Opcode::Rem => "%",
            Opcode::Assign => "=",
            Opcode::LAnd => "&&",
            Opcode::LOr => "||",
            Opcode::Other => "?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionRole {
    #[default]
    Free,
    Method,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMember {
    #[default]
    None,
    CopyConstructor,
    MoveConstructor,
    CopyAssignment,
    MoveAssignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorKind {
    #[default]
    Regular,
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    #[default]
    Automatic,
    Static,
}

/// Kind-specific payload of a node. Serialized with an inline `"kind"` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    TranslationUnitDecl,
    NamespaceDecl {
        name: String,
    },
    RecordDecl {
        name: String,
    },
    FunctionDecl {
        name: String,
        #[serde(default)]
        returns: Option<TypeRef>,
        #[serde(default)]
        role: FunctionRole,
        #[serde(default)]
        special: SpecialMember,
        #[serde(default)]
        is_definition: bool,
        #[serde(default)]
        is_defaulted: bool,
        #[serde(default)]
        is_deleted: bool,
        #[serde(default)]
        is_noexcept: bool,
    },
    VarDecl {
        name: String,
        #[serde(default)]
        storage: Storage,
    },
    ParmVarDecl {
        #[serde(default)]
        name: String,
    },
    FieldDecl {
        name: String,
    },
    TypeAliasDecl {
        name: String,
    },
    CompoundStmt,
    ForStmt,
    WhileStmt,
    DoStmt,
    CxxForRangeStmt,
    IfStmt,
    ReturnStmt,
    CallExpr {
        #[serde(default)]
        callee: Option<String>,
    },
    MemberCallExpr {
        method: String,
        #[serde(default)]
        class: Option<String>,
        #[serde(default)]
        is_virtual: bool,
    },
    OperatorCallExpr {
        operator: Opcode,
    },
    BinaryOperator {
        opcode: Opcode,
    },
    RewrittenBinaryOperator {
        opcode: Opcode,
    },
    UnaryOperator {
        opcode: String,
    },
    ImplicitCastExpr,
    MaterializeTemporaryExpr,
    ExprWithCleanups,
    CxxBindTemporaryExpr,
    ParenExpr,
    ConstructExpr {
        #[serde(default)]
        constructor: ConstructorKind,
    },
    DeclRefExpr {
        name: String,
    },
    IntegerLiteral {
        value: u64,
    },
    StringLiteral,
    DynamicCastExpr,
    StaticCastExpr,
    ThrowExpr,
    LambdaExpr,
    #[serde(other)]
    Unknown,
}

/// Fieldless discriminant of [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeTag {
    TranslationUnitDecl,
    NamespaceDecl,
    RecordDecl,
    FunctionDecl,
    VarDecl,
    ParmVarDecl,
    FieldDecl,
    TypeAliasDecl,
    CompoundStmt,
    ForStmt,
    WhileStmt,
    DoStmt,
    CxxForRangeStmt,
    IfStmt,
    ReturnStmt,
    CallExpr,
    MemberCallExpr,
    OperatorCallExpr,
    BinaryOperator,
    RewrittenBinaryOperator,
    UnaryOperator,
    ImplicitCastExpr,
    MaterializeTemporaryExpr,
    ExprWithCleanups,
    CxxBindTemporaryExpr,
    ParenExpr,
    ConstructExpr,
    DeclRefExpr,
    IntegerLiteral,
    StringLiteral,
    DynamicCastExpr,
    StaticCastExpr,
    ThrowExpr,
    LambdaExpr,
    Unknown,
}

impl NodeTag {
    pub fn is_loop(self) -> bool {
        matches!(
            self,
            NodeTag::ForStmt | NodeTag::WhileStmt | NodeTag::DoStmt | NodeTag::CxxForRangeStmt
        )
    }

    /// Nodes the compiler inserts around an expression without changing what
    /// the user wrote.
    pub fn is_implicit_wrapper(self) -> bool {
        matches!(
            self,
            NodeTag::ImplicitCastExpr
                | NodeTag::MaterializeTemporaryExpr
                | NodeTag::ExprWithCleanups
                | NodeTag::CxxBindTemporaryExpr
                | NodeTag::ParenExpr
        )
    }
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::TranslationUnitDecl => NodeTag::TranslationUnitDecl,
            NodeKind::NamespaceDecl { .. } => NodeTag::NamespaceDecl,
            NodeKind::RecordDecl { .. } => NodeTag::RecordDecl,
            NodeKind::FunctionDecl { .. } => NodeTag::FunctionDecl,
            NodeKind::VarDecl { .. } => NodeTag::VarDecl,
            NodeKind::ParmVarDecl { .. } => NodeTag::ParmVarDecl,
            NodeKind::FieldDecl { .. } => NodeTag::FieldDecl,
            NodeKind::TypeAliasDecl { .. } => NodeTag::TypeAliasDecl,
            NodeKind::CompoundStmt => NodeTag::CompoundStmt,
            NodeKind::ForStmt => NodeTag::ForStmt,
            NodeKind::WhileStmt => NodeTag::WhileStmt,
            NodeKind::DoStmt => NodeTag::DoStmt,
            NodeKind::CxxForRangeStmt => NodeTag::CxxForRangeStmt,
            NodeKind::IfStmt => NodeTag::IfStmt,
            NodeKind::ReturnStmt => NodeTag::ReturnStmt,
            NodeKind::CallExpr { .. } => NodeTag::CallExpr,
            NodeKind::MemberCallExpr { .. } => NodeTag::MemberCallExpr,
            NodeKind::OperatorCallExpr { .. } => NodeTag::OperatorCallExpr,
            NodeKind::BinaryOperator { .. } => NodeTag::BinaryOperator,
            NodeKind::RewrittenBinaryOperator { .. } => NodeTag::RewrittenBinaryOperator,
            NodeKind::UnaryOperator { .. } => NodeTag::UnaryOperator,
            NodeKind::ImplicitCastExpr => NodeTag::ImplicitCastExpr,
            NodeKind::MaterializeTemporaryExpr => NodeTag::MaterializeTemporaryExpr,
            NodeKind::ExprWithCleanups => NodeTag::ExprWithCleanups,
            NodeKind::CxxBindTemporaryExpr => NodeTag::CxxBindTemporaryExpr,
            NodeKind::ParenExpr => NodeTag::ParenExpr,
            NodeKind::ConstructExpr { .. } => NodeTag::ConstructExpr,
            NodeKind::DeclRefExpr { .. } => NodeTag::DeclRefExpr,
            NodeKind::IntegerLiteral { .. } => NodeTag::IntegerLiteral,
            NodeKind::StringLiteral => NodeTag::StringLiteral,
            NodeKind::DynamicCastExpr => NodeTag::DynamicCastExpr,
            NodeKind::StaticCastExpr => NodeTag::StaticCastExpr,
            NodeKind::ThrowExpr => NodeTag::ThrowExpr,
            NodeKind::LambdaExpr => NodeTag::LambdaExpr,
            NodeKind::Unknown => NodeTag::Unknown,
        }
    }

    /// Name carried by a named declaration, if any.
    pub fn decl_name(&self) -> Option<&str> {
        match self {
            NodeKind::NamespaceDecl { name }
            | NodeKind::RecordDecl { name }
            | NodeKind::FunctionDecl { name, .. }
            | NodeKind::VarDecl { name, .. }
            | NodeKind::ParmVarDecl { name }
            | NodeKind::FieldDecl { name }
            | NodeKind::TypeAliasDecl { name } => Some(name),
            _ => None,
        }
    }

    fn normalize_names(&mut self) {
        match self {
            NodeKind::FunctionDecl { name, returns, .. } => {
                *name = normalize_qualified_name(name);
                if let Some(ty) = returns.as_mut() {
                    ty.normalize();
                }
            }
            NodeKind::RecordDecl { name } | NodeKind::DeclRefExpr { name } => {
                *name = normalize_qualified_name(name);
            }
            NodeKind::CallExpr { callee: Some(callee) } => {
                *callee = normalize_qualified_name(callee);
            }
            NodeKind::MemberCallExpr {
                class: Some(class), ..
            } => {
                *class = normalize_qualified_name(class);
            }
            _ => {}
        }
    }
}

/// Canonical spelling of a qualified name: no leading `::`, no standard
/// library inline namespaces (`std::__1::map` becomes `std::map`).
pub fn normalize_qualified_name(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches("::");
    let segments: Vec<&str> = trimmed.split("::").collect();
    let last = segments.len().saturating_sub(1);
    segments
        .iter()
        .enumerate()
        .filter(|(i, seg)| *i == last || !is_inline_namespace(seg))
        .map(|(_, seg)| *seg)
        .collect::<Vec<_>>()
        .join("::")
}

fn is_inline_namespace(segment: &str) -> bool {
    segment == "__cxx11"
        || segment
            .strip_prefix("__")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

// ============================================================================
// Serialized tree
// ============================================================================

/// Tree form of a node, as read from an AST document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    /// Set when the node was spelled in an included file rather than the
    /// main file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            range: None,
            file: None,
            ty: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, range: SourceRange) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub fn typed(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A class declaration and the names of the methods it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInfo {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl RecordInfo {
    pub fn new(name: &str, methods: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Serialized input of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstDocument {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub source: String,
    /// Absent when the dumper did not record the language options.
    #[serde(default)]
    pub language: Option<LanguageFlags>,
    #[serde(default)]
    pub records: Vec<RecordInfo>,
    pub root: AstNode,
}

impl AstDocument {
    pub fn from_json(text: &str) -> ClippyResult<Self> {
        let doc: Self = serde_json::from_str(text).map_err(ClippyError::AstDocument)?;
        crate::clippy_ensure!(
            doc.root.kind == NodeKind::TranslationUnitDecl,
            "AST document root must be a TranslationUnitDecl, found {:?}",
            doc.root.kind.tag()
        );
        Ok(doc)
    }

    pub fn load(path: &Path) -> ClippyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut doc = Self::from_json(&text)?;
        if doc.file.is_empty() {
            doc.file = path.display().to_string();
        }
        Ok(doc)
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Arena entry for one node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub range: Option<SourceRange>,
    pub file: Option<String>,
    pub ty: Option<TypeRef>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    subtree_end: u32,
}

/// One loaded translation unit. Ids are assigned in preorder, so a node's
/// descendants occupy the contiguous id range after it.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    file: String,
    source: String,
    language: LanguageFlags,
    nodes: Vec<NodeData>,
    records: HashMap<String, Vec<String>>,
}

impl TranslationUnit {
    pub fn new(
        file: impl Into<String>,
        source: impl Into<String>,
        language: LanguageFlags,
        records: Vec<RecordInfo>,
        root: AstNode,
    ) -> Self {
        let nodes = flatten(root);
        let records = records
            .into_iter()
            .map(|r| (normalize_qualified_name(&r.name), r.methods))
            .collect();

        Self {
            file: file.into(),
            source: source.into(),
            language,
            nodes,
            records,
        }
    }

    /// Build from a document, using `fallback` when the document carries no
    /// language flags.
    pub fn from_document(doc: AstDocument, fallback: LanguageFlags) -> Self {
        let language = doc.language.unwrap_or(fallback);
        Self::new(doc.file, doc.source, language, doc.records, doc.root)
    }

    #[must_use]
    pub fn with_language(mut self, language: LanguageFlags) -> Self {
        self.language = language;
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> &LanguageFlags {
        &self.language
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn tag(&self, id: NodeId) -> NodeTag {
        self.kind(id).tag()
    }

    pub fn ty(&self, id: NodeId) -> Option<&TypeRef> {
        self.node(id).ty.as_ref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Strict descendants in preorder.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + use<> {
        let end = self.nodes[id.index()].subtree_end;
        (id.0 + 1..end).map(NodeId)
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        id > ancestor && id.0 < self.nodes[ancestor.index()].subtree_end
    }

    /// Every node in preorder.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Descend through implicit wrapper nodes to the expression the user wrote.
    pub fn skip_implicit(&self, mut id: NodeId) -> NodeId {
        while self.tag(id).is_implicit_wrapper() {
            match self.child(id, 0) {
                Some(inner) => id = inner,
                None => break,
            }
        }
        id
    }

    /// The variable or parameter a `DeclRefExpr` names, found by walking the
    /// enclosing scopes outward. Only declarations that precede the reference
    /// are visible, and an inner declaration shadows an outer one.
    pub fn resolve_declaration(&self, reference: NodeId) -> Option<NodeId> {
        let NodeKind::DeclRefExpr { name } = self.kind(reference) else {
            return None;
        };
        self.ancestors(reference).find_map(|scope| {
            self.children(scope)
                .iter()
                .copied()
                .take_while(|&c| c < reference)
                .filter(|&c| {
                    matches!(
                        self.kind(c),
                        NodeKind::VarDecl { name: declared, .. }
                            | NodeKind::ParmVarDecl { name: declared }
                            if declared == name
                    )
                })
                .last()
        })
    }

    /// The node's range, when it was spelled in the main file.
    pub fn main_file_range(&self, id: NodeId) -> Option<SourceRange> {
        let node = self.node(id);
        if node.file.is_some() {
            return None;
        }
        node.range.filter(|r| r.end <= self.source.len() && r.begin <= r.end)
    }

    /// Source text spanned by the node; `None` outside the main file or on
    /// an invalid range.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let range = self.main_file_range(id)?;
        self.source.get(range.begin..range.end)
    }

    pub fn position(&self, byte_offset: usize) -> Position {
        position_from_byte_offset(&self.source, byte_offset)
    }

    pub fn record_declares(&self, class: &str, method: &str) -> bool {
        self.records
            .get(class)
            .is_some_and(|methods| methods.iter().any(|m| m == method))
    }
}

fn flatten(root: AstNode) -> Vec<NodeData> {
    let mut nodes: Vec<NodeData> = Vec::new();
    let mut stack: Vec<(AstNode, Option<NodeId>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        let id = NodeId(nodes.len() as u32);
        let AstNode {
            mut kind,
            range,
            file,
            mut ty,
            children,
        } = node;
        kind.normalize_names();
        if let Some(ty) = ty.as_mut() {
            ty.normalize();
        }

        nodes.push(NodeData {
            kind,
            range,
            file,
            ty,
            parent,
            children: Vec::with_capacity(children.len()),
            subtree_end: 0,
        });
        if let Some(p) = parent {
            nodes[p.index()].children.push(id);
        }
        for child in children.into_iter().rev() {
            stack.push((child, Some(id)));
        }
    }

    for idx in (0..nodes.len()).rev() {
        let end = match nodes[idx].children.last() {
            Some(last) => nodes[last.index()].subtree_end,
            None => idx as u32 + 1,
        };
        nodes[idx].subtree_end = end;
    }

    nodes
}

pub(crate) fn position_from_byte_offset(source: &str, byte_offset: usize) -> Position {
    let mut row = 1usize;
    let mut col = 1usize;

    let end = byte_offset.min(source.len());
    for b in source.as_bytes().iter().take(end) {
        if *b == b'\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    Position { row, column: col }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(callee: &str) -> AstNode {
        AstNode::new(NodeKind::CallExpr {
            callee: Some(callee.to_string()),
        })
    }

    #[test]
    fn preorder_ids_and_parent_links() {
        let root = AstNode::new(NodeKind::TranslationUnitDecl)
            .child(call("a").child(call("b")))
            .child(call("c"));
        let tu = TranslationUnit::new("t.cpp", "", LanguageFlags::default(), vec![], root);

        assert_eq!(tu.len(), 4);
        let ids: Vec<_> = tu.preorder().collect();
        assert_eq!(tu.parent(ids[1]), Some(ids[0]));
        assert_eq!(tu.parent(ids[2]), Some(ids[1]));
        assert_eq!(tu.parent(ids[3]), Some(ids[0]));
        assert_eq!(tu.children(ids[0]), &[ids[1], ids[3]]);
        assert_eq!(tu.descendants(ids[1]).collect::<Vec<_>>(), vec![ids[2]]);
        assert!(tu.is_descendant_of(ids[2], ids[0]));
        assert!(!tu.is_descendant_of(ids[3], ids[1]));
        assert_eq!(tu.ancestors(ids[2]).collect::<Vec<_>>(), vec![ids[1], ids[0]]);
    }

    #[test]
    fn references_resolve_through_enclosing_scopes() {
        let var = |name: &str, storage| {
            AstNode::new(NodeKind::VarDecl {
                name: name.to_string(),
                storage,
            })
        };
        let reference = || {
            AstNode::new(NodeKind::DeclRefExpr {
                name: "v".to_string(),
            })
        };
        // int v; void f() { { int v; } v; int v; v; }
        let root = AstNode::new(NodeKind::TranslationUnitDecl)
            .child(var("v", Storage::Static))
            .child(
                AstNode::new(NodeKind::CompoundStmt)
                    .child(AstNode::new(NodeKind::CompoundStmt).child(var("v", Storage::Automatic)))
                    .child(reference())
                    .child(var("v", Storage::Automatic))
                    .child(reference()),
            );
        let tu = TranslationUnit::new("t.cpp", "", LanguageFlags::default(), vec![], root);
        let ids: Vec<_> = tu.preorder().collect();

        assert_eq!(tu.resolve_declaration(ids[5]), Some(ids[1]));
        assert_eq!(tu.resolve_declaration(ids[7]), Some(ids[6]));
        assert_eq!(tu.resolve_declaration(ids[1]), None);
    }

    #[test]
    fn inline_namespaces_are_dropped() {
        assert_eq!(normalize_qualified_name("::std::__1::map"), "std::map");
        assert_eq!(
            normalize_qualified_name("std::__cxx11::to_string"),
            "std::to_string"
        );
        assert_eq!(
            normalize_qualified_name("__builtin_unreachable"),
            "__builtin_unreachable"
        );
    }

    #[test]
    fn text_requires_main_file_range() {
        let src = "int x = 0;";
        let root = AstNode::new(NodeKind::TranslationUnitDecl)
            .child(call("f").at(SourceRange::new(4, 5)))
            .child(call("g").at(SourceRange::new(4, 5)).in_file("x.h"))
            .child(call("h").at(SourceRange::new(4, 99)));
        let tu = TranslationUnit::new("t.cpp", src, LanguageFlags::default(), vec![], root);
        let ids: Vec<_> = tu.preorder().collect();

        assert_eq!(tu.text(ids[1]), Some("x"));
        assert_eq!(tu.text(ids[2]), None);
        assert_eq!(tu.text(ids[3]), None);
    }

    #[test]
    fn deserializes_tagged_nodes() {
        let json = r#"{
            "file": "a.cpp",
            "source": "f();",
            "root": {
                "kind": "TranslationUnitDecl",
                "children": [
                    { "kind": "CallExpr", "callee": "::f", "range": { "begin": 0, "end": 3 } },
                    { "kind": "SomethingNew" }
                ]
            }
        }"#;
        let doc = AstDocument::from_json(json).expect("document should parse");
        let tu = TranslationUnit::from_document(doc, LanguageFlags::default());
        let ids: Vec<_> = tu.preorder().collect();

        assert_eq!(
            tu.kind(ids[1]),
            &NodeKind::CallExpr {
                callee: Some("f".to_string())
            }
        );
        assert_eq!(tu.tag(ids[2]), NodeTag::Unknown);
    }
}
