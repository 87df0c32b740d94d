//! Declarative tree-shape queries.
//!
//! A [`Matcher`] is a predicate over one node of a [`TranslationUnit`]. It is
//! evaluated against every node during the single traversal; on success the
//! labels recorded by [`Matcher::Bind`] form the [`MatchBinding`] handed to the
//! owning check. Matchers only read the tree.

use std::collections::BTreeMap;

use regex::Regex;

use crate::ast::{ConstructorKind, FunctionRole, NodeId, NodeKind, NodeTag, Opcode, SpecialMember, Storage, TranslationUnit, TypeRef};

/// Nodes captured by one successful match, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchBinding {
    nodes: BTreeMap<&'static str, NodeId>,
}

impl MatchBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<NodeId> {
        self.nodes.get(label).copied()
    }

    pub fn insert(&mut self, label: &'static str, node: NodeId) {
        self.nodes.insert(label, node);
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A named matcher owned by a check.
#[derive(Debug, Clone)]
pub struct Query {
    pub id: &'static str,
    pub matcher: Matcher,
}

impl Query {
    pub fn new(id: &'static str, matcher: Matcher) -> Self {
        Self { id, matcher }
    }

    /// Evaluate the query at `node`, returning the binding on success.
    pub fn run(&self, tu: &TranslationUnit, node: NodeId) -> Option<MatchBinding> {
        let mut binding = MatchBinding::new();
        self.matcher.matches(tu, node, &mut binding).then_some(binding)
    }
}

// ============================================================================
// Names and types
// ============================================================================

/// Qualified-name pattern.
///
/// A pattern with a leading `::` must equal the whole qualified name. Without
/// it, the pattern matches any name that ends with it at a `::` boundary, so
/// `npos` matches `std::basic_string::npos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    One(&'static str),
    Any(&'static [&'static str]),
}

impl NamePattern {
    pub fn matches(&self, qualified: &str) -> bool {
        match self {
            NamePattern::One(p) => name_matches(p, qualified),
            NamePattern::Any(ps) => ps.iter().any(|p| name_matches(p, qualified)),
        }
    }
}

fn name_matches(pattern: &str, qualified: &str) -> bool {
    if let Some(full) = pattern.strip_prefix("::") {
        return qualified == full;
    }
    qualified
        .strip_suffix(pattern)
        .is_some_and(|head| head.is_empty() || head.ends_with("::"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePredicate {
    /// The named type itself, neither reference nor pointer.
    Named(NamePattern),
    /// The named type, with or without reference or const, but not a pointer.
    Class(NamePattern),
    ConstRefTo(NamePattern),
    RValueRefTo(NamePattern),
    Pointer,
    /// Accessed through a pointer or a reference.
    Indirect,
    Integer,
    ScopedEnum,
}

impl TypePredicate {
    pub fn matches(&self, ty: &TypeRef) -> bool {
        let decl_is = |p: &NamePattern| ty.decl_name().is_some_and(|d| p.matches(d));
        match self {
            TypePredicate::Named(p) => ty.is_value() && decl_is(p),
            TypePredicate::Class(p) => !ty.is_pointer && decl_is(p),
            TypePredicate::ConstRefTo(p) => {
                ty.reference == crate::ast::Reference::LValue && ty.is_const && decl_is(p)
            }
            TypePredicate::RValueRefTo(p) => {
                ty.reference == crate::ast::Reference::RValue && decl_is(p)
            }
            TypePredicate::Pointer => ty.is_pointer,
            TypePredicate::Indirect => {
                ty.is_pointer || ty.reference != crate::ast::Reference::None
            }
            TypePredicate::Integer => ty.is_integer && !ty.is_pointer,
            TypePredicate::ScopedEnum => ty.is_scoped_enum && !ty.is_pointer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionPredicate {
    Role(FunctionRole),
    Special(SpecialMember),
    Definition,
    Defaulted,
    Deleted,
    Noexcept,
    Returns(TypePredicate),
}

// ============================================================================
// Matcher
// ============================================================================

#[derive(Debug, Clone)]
pub enum Matcher {
    Kind(NodeTag),
    /// Call expression whose direct callee matches.
    Callee(NamePattern),
    /// Call expression whose `::`-prefixed callee matches the anchored regex.
    /// `None` when the pattern failed to compile; it then never matches.
    CalleeRegex(Regex),
    /// Member call whose method name matches.
    Method(NamePattern),
    /// Member call whose class declares a method with this name.
    ClassDeclares(&'static str),
    VirtualCall,
    /// Declaration reference whose target matches.
    Refers(NamePattern),
    /// Named declaration whose name matches.
    Named(NamePattern),
    /// Declared type of a declaration, or type of an expression.
    Type(TypePredicate),
    Operator(&'static [Opcode]),
    IntegerLiteral(Option<u64>),
    /// Construct expression invoking this kind of constructor.
    Constructs(ConstructorKind),
    ArgumentCount(usize),
    Argument(usize, Box<Matcher>),
    AnyArgument(Box<Matcher>),
    /// Implicit object argument of a member call.
    Object(Box<Matcher>),
    /// Either operand of a binary comparison or operator call.
    Operand(Box<Matcher>),
    /// First descendant in preorder that matches.
    Descendant(Box<Matcher>),
    /// Initializer of a variable declaration.
    Initializer(Box<Matcher>),
    /// Some enclosing loop, without crossing a function or lambda boundary.
    InsideLoop,
    /// Nearest enclosing function declaration.
    EnclosingFunction(Box<Matcher>),
    Function(FunctionPredicate),
    LocalStorage,
    AllOf(Vec<Matcher>),
    AnyOf(Vec<Matcher>),
    Not(Box<Matcher>),
    Bind(&'static str, Box<Matcher>),
}

impl Matcher {
    #[must_use]
    pub fn bind(self, label: &'static str) -> Self {
        Matcher::Bind(label, Box::new(self))
    }

    #[must_use]
    pub fn and(self, other: Matcher) -> Self {
        match self {
            Matcher::AllOf(mut all) => {
                all.push(other);
                Matcher::AllOf(all)
            }
            first => Matcher::AllOf(vec![first, other]),
        }
    }

    pub fn matches(&self, tu: &TranslationUnit, node: NodeId, binding: &mut MatchBinding) -> bool {
        match self {
            Matcher::Kind(tag) => tu.tag(node) == *tag,
            Matcher::Callee(pattern) => matches!(
                tu.kind(node),
                NodeKind::CallExpr { callee: Some(callee) } if pattern.matches(callee)
            ),
            Matcher::CalleeRegex(re) => matches!(
                tu.kind(node),
                NodeKind::CallExpr { callee: Some(callee) } if re.is_match(&format!("::{callee}"))
            ),
            Matcher::Method(pattern) => matches!(
                tu.kind(node),
                NodeKind::MemberCallExpr { method, .. } if pattern.matches(method)
            ),
            Matcher::ClassDeclares(method) => matches!(
                tu.kind(node),
                NodeKind::MemberCallExpr { class: Some(class), .. }
                    if tu.record_declares(class, method)
            ),
            Matcher::VirtualCall => matches!(
                tu.kind(node),
                NodeKind::MemberCallExpr {
                    is_virtual: true,
                    ..
                }
            ),
            Matcher::Refers(pattern) => matches!(
                tu.kind(node),
                NodeKind::DeclRefExpr { name } if pattern.matches(name)
            ),
            Matcher::Named(pattern) => tu.kind(node).decl_name().is_some_and(|n| pattern.matches(n)),
            Matcher::Type(pred) => tu.ty(node).is_some_and(|ty| pred.matches(ty)),
            Matcher::Operator(ops) => operator_of(tu.kind(node)).is_some_and(|op| ops.contains(&op)),
            Matcher::IntegerLiteral(expected) => match tu.kind(node) {
                NodeKind::IntegerLiteral { value } => expected.is_none_or(|e| e == *value),
                _ => false,
            },
            Matcher::Constructs(expected) => matches!(
                tu.kind(node),
                NodeKind::ConstructExpr { constructor } if constructor == expected
            ),
            Matcher::ArgumentCount(n) => {
                is_call_like(tu.tag(node)) && arguments(tu, node).len() == *n
            }
            Matcher::Argument(index, inner) => {
                if !is_call_like(tu.tag(node)) {
                    return false;
                }
                match arguments(tu, node).get(*index) {
                    Some(&arg) => inner.matches(tu, tu.skip_implicit(arg), binding),
                    None => false,
                }
            }
            Matcher::AnyArgument(inner) => {
                if !is_call_like(tu.tag(node)) {
                    return false;
                }
                first_match(tu, arguments(tu, node).iter().map(|&a| tu.skip_implicit(a)), inner, binding)
            }
            Matcher::Object(inner) => {
                if tu.tag(node) != NodeTag::MemberCallExpr {
                    return false;
                }
                match tu.child(node, 0) {
                    Some(object) => inner.matches(tu, tu.skip_implicit(object), binding),
                    None => false,
                }
            }
            Matcher::Operand(inner) => {
                if operator_of(tu.kind(node)).is_none() {
                    return false;
                }
                let operands = tu.children(node).iter().take(2).map(|&c| tu.skip_implicit(c));
                first_match(tu, operands, inner, binding)
            }
            Matcher::Descendant(inner) => first_match(tu, tu.descendants(node), inner, binding),
            Matcher::Initializer(inner) => {
                if tu.tag(node) != NodeTag::VarDecl {
                    return false;
                }
                match tu.child(node, 0) {
                    Some(init) => inner.matches(tu, tu.skip_implicit(init), binding),
                    None => false,
                }
            }
            Matcher::InsideLoop => tu
                .ancestors(node)
                .map(|a| tu.tag(a))
                .take_while(|t| !matches!(t, NodeTag::FunctionDecl | NodeTag::LambdaExpr))
                .any(NodeTag::is_loop),
            Matcher::EnclosingFunction(inner) => {
                match tu.ancestors(node).find(|&a| tu.tag(a) == NodeTag::FunctionDecl) {
                    Some(function) => inner.matches(tu, function, binding),
                    None => false,
                }
            }
            Matcher::Function(pred) => function_matches(tu.kind(node), pred),
            Matcher::LocalStorage => matches!(
                tu.kind(node),
                NodeKind::VarDecl {
                    storage: Storage::Automatic,
                    ..
                }
            ),
            Matcher::AllOf(all) => all.iter().all(|m| m.matches(tu, node, binding)),
            Matcher::AnyOf(any) => first_match_of(tu, node, any, binding),
            Matcher::Not(inner) => {
                let mut scratch = binding.clone();
                !inner.matches(tu, node, &mut scratch)
            }
            Matcher::Bind(label, inner) => {
                if inner.matches(tu, node, binding) {
                    binding.insert(*label, node);
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Try `matcher` on each candidate; keep the bindings of the first success
/// and roll back those of every failed attempt.
fn first_match(
    tu: &TranslationUnit,
    candidates: impl Iterator<Item = NodeId>,
    matcher: &Matcher,
    binding: &mut MatchBinding,
) -> bool {
    for candidate in candidates {
        let mut attempt = binding.clone();
        if matcher.matches(tu, candidate, &mut attempt) {
            *binding = attempt;
            return true;
        }
    }
    false
}

fn first_match_of(
    tu: &TranslationUnit,
    node: NodeId,
    alternatives: &[Matcher],
    binding: &mut MatchBinding,
) -> bool {
    for alternative in alternatives {
        let mut attempt = binding.clone();
        if alternative.matches(tu, node, &mut attempt) {
            *binding = attempt;
            return true;
        }
    }
    false
}

pub(crate) fn operator_of(kind: &NodeKind) -> Option<Opcode> {
    match kind {
        NodeKind::BinaryOperator { opcode } | NodeKind::RewrittenBinaryOperator { opcode } => {
            Some(*opcode)
        }
        NodeKind::OperatorCallExpr { operator } => Some(*operator),
        _ => None,
    }
}

fn is_call_like(tag: NodeTag) -> bool {
    matches!(
        tag,
        NodeTag::CallExpr
            | NodeTag::MemberCallExpr
            | NodeTag::OperatorCallExpr
            | NodeTag::ConstructExpr
    )
}

/// Argument list of a call-like node. The implicit object of a member call
/// is not an argument.
pub fn arguments(tu: &TranslationUnit, node: NodeId) -> &[NodeId] {
    let children = tu.children(node);
    match tu.tag(node) {
        NodeTag::MemberCallExpr => children.get(1..).unwrap_or(&[]),
        _ => children,
    }
}

fn function_matches(kind: &NodeKind, pred: &FunctionPredicate) -> bool {
    let NodeKind::FunctionDecl {
        returns,
        role,
        special,
        is_definition,
        is_defaulted,
        is_deleted,
        is_noexcept,
        ..
    } = kind
    else {
        return false;
    };
    match pred {
        FunctionPredicate::Role(r) => role == r,
        FunctionPredicate::Special(s) => special == s,
        FunctionPredicate::Definition => *is_definition,
        FunctionPredicate::Defaulted => *is_defaulted,
        FunctionPredicate::Deleted => *is_deleted,
        FunctionPredicate::Noexcept => *is_noexcept,
        FunctionPredicate::Returns(ty) => returns.as_ref().is_some_and(|r| ty.matches(r)),
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn kind(tag: NodeTag) -> Matcher {
    Matcher::Kind(tag)
}

pub fn all_of(matchers: impl IntoIterator<Item = Matcher>) -> Matcher {
    Matcher::AllOf(matchers.into_iter().collect())
}

pub fn any_of(matchers: impl IntoIterator<Item = Matcher>) -> Matcher {
    Matcher::AnyOf(matchers.into_iter().collect())
}

pub fn not(matcher: Matcher) -> Matcher {
    Matcher::Not(Box::new(matcher))
}

pub fn call_to(names: &'static [&'static str]) -> Matcher {
    kind(NodeTag::CallExpr).and(Matcher::Callee(NamePattern::Any(names)))
}

/// Call whose qualified callee matches `pattern` in full, e.g.
/// `::std::sto(i|l|ul)`. Patterns are literals fixed at registration, so an
/// invalid one panics while the registry is built.
pub fn call_matching(pattern: &'static str) -> Matcher {
    let anchored = Regex::new(&format!("^(?:{pattern})$"))
        .unwrap_or_else(|err| panic!("invalid callee pattern {pattern}: {err}"));
    kind(NodeTag::CallExpr).and(Matcher::CalleeRegex(anchored))
}

pub fn member_call(methods: &'static [&'static str]) -> Matcher {
    kind(NodeTag::MemberCallExpr).and(Matcher::Method(NamePattern::Any(methods)))
}

pub fn decl_ref(names: &'static [&'static str]) -> Matcher {
    kind(NodeTag::DeclRefExpr).and(Matcher::Refers(NamePattern::Any(names)))
}

pub fn typed(pred: TypePredicate) -> Matcher {
    Matcher::Type(pred)
}

pub fn integer_literal() -> Matcher {
    kind(NodeTag::IntegerLiteral).and(Matcher::IntegerLiteral(None))
}

pub fn zero_literal() -> Matcher {
    kind(NodeTag::IntegerLiteral).and(Matcher::IntegerLiteral(Some(0)))
}

/// Construction of a fresh object, not a copy or move of an existing one.
pub fn temporary() -> Matcher {
    kind(NodeTag::ConstructExpr).and(Matcher::Constructs(ConstructorKind::Regular))
}

pub fn argument(index: usize, matcher: Matcher) -> Matcher {
    Matcher::Argument(index, Box::new(matcher))
}

pub fn any_argument(matcher: Matcher) -> Matcher {
    Matcher::AnyArgument(Box::new(matcher))
}

pub fn object(matcher: Matcher) -> Matcher {
    Matcher::Object(Box::new(matcher))
}

pub fn operand(matcher: Matcher) -> Matcher {
    Matcher::Operand(Box::new(matcher))
}

pub fn descendant(matcher: Matcher) -> Matcher {
    Matcher::Descendant(Box::new(matcher))
}

pub fn initializer(matcher: Matcher) -> Matcher {
    Matcher::Initializer(Box::new(matcher))
}

pub fn enclosing_function(matcher: Matcher) -> Matcher {
    Matcher::EnclosingFunction(Box::new(matcher))
}

pub fn function(pred: FunctionPredicate) -> Matcher {
    Matcher::Function(pred)
}
