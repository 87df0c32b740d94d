mod support;

use cxx_clippy::ast::{AstNode, ConstructorKind, TranslationUnit, TypeRef};
use cxx_clippy::lint::{CheckOptions, InplaceVectorOptions};
use cxx_clippy::standard::CapabilityTier;
use support::ast_harness::*;

#[test]
fn prefer_function_ref_flags_non_owning_parameters() {
    let src = Source("void a(std::function<void()> f); void b(const std::function<void()>& g); void c(std::function<void()>&& h);");
    let make = |tier| {
        unit(
            tier,
            src,
            vec![],
            vec![
                function("a").child(param("f", TypeRef::named("std::function")).at(src.at("f)"))),
                function("b").child(param("g", TypeRef::const_ref("std::function")).at(src.at("g)"))),
                function("c").child(param("h", TypeRef::rvalue_ref("std::function")).at(src.at("h)"))),
            ],
        )
    };

    assert!(run_check("prefer-function-ref", &make(CapabilityTier::Tier23)).is_empty());
    let findings = run_check("prefer-function-ref", &make(CapabilityTier::Tier26));
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].notes.len(), 2);
}

fn vec_ref(name: &str) -> AstNode {
    decl_ref(name).typed(TypeRef::lvalue_ref("std::vector"))
}

/// `void f() { std::vector<int> v; v.reserve(N); }` with the reserve on a
/// local or on a global `g`.
fn reserve_unit(src: Source, target: &str, size: AstNode) -> TranslationUnit {
    unit(
        CapabilityTier::Tier26,
        src,
        vec![],
        vec![
            global("g", TypeRef::named("std::vector")),
            function("f").child(
                compound()
                    .child(local("v", TypeRef::named("std::vector")))
                    .child(
                        member_call("reserve", "std::vector", implicit(vec_ref(target)))
                            .child(size)
                            .at(src.at(&format!("{target}.reserve("))),
                    ),
            ),
        ],
    )
}

#[test]
fn prefer_inplace_vector_small_local_reserve() {
    let src = Source("void f() { std::vector<int> v; v.reserve(10); }");
    insta::assert_snapshot!(render(&run_check("prefer-inplace-vector", &reserve_unit(src, "v", int(10)))), @r"
    1:32: standard-upgrade.prefer-inplace-vector: std::vector with reserve(10) in local scope; consider std::inplace_vector<10> (C++26) to avoid heap allocation
      note: std::inplace_vector stores all elements inline (on the stack), eliminating allocator overhead entirely
    ");
}

#[test]
fn prefer_inplace_vector_respects_threshold() {
    let src = Source("void f() { std::vector<int> v; v.reserve(N); }");
    assert!(run_check("prefer-inplace-vector", &reserve_unit(src, "v", int(100))).is_empty());
    assert_eq!(run_check("prefer-inplace-vector", &reserve_unit(src, "v", int(64))).len(), 1);

    let options = CheckOptions {
        prefer_inplace_vector: InplaceVectorOptions {
            max_inplace_size: 128,
        },
    };
    let findings = run_check_with("prefer-inplace-vector", &reserve_unit(src, "v", int(100)), &options);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.contains("reserve(100)"));
}

#[test]
fn prefer_inplace_vector_needs_literal_size_on_local() {
    let src = Source("void f() { std::vector<int> v; v.reserve(N); g.reserve(N); }");
    assert!(run_check("prefer-inplace-vector", &reserve_unit(src, "v", decl_ref("n"))).is_empty());
    assert!(run_check("prefer-inplace-vector", &reserve_unit(src, "g", int(10))).is_empty());
}

#[test]
fn prefer_inplace_vector_ignores_unrelated_locals_with_the_same_name() {
    let src = Source("std::vector<int> v; void f() { { int v = 0; } v.reserve(10); }");
    let tu = unit(
        CapabilityTier::Tier26,
        src,
        vec![],
        vec![
            global("v", TypeRef::named("std::vector")),
            function("f").child(
                compound()
                    .child(compound().child(local("v", TypeRef::integer("int"))))
                    .child(
                        member_call("reserve", "std::vector", implicit(vec_ref("v")))
                            .child(int(10))
                            .at(src.at("v.reserve(")),
                    ),
            ),
        ],
    );
    assert!(run_check("prefer-inplace-vector", &tu).is_empty());
}

#[test]
fn prefer_inplace_vector_treats_by_value_parameters_as_local() {
    let src = Source("void f(std::vector<int> v, const std::vector<int>& r) { v.reserve(10); r.reserve(10); }");
    let reserve = |target: &str| {
        member_call("reserve", "std::vector", implicit(vec_ref(target)))
            .child(int(10))
            .at(src.at(&format!("{target}.reserve(")))
    };
    let tu = unit(
        CapabilityTier::Tier26,
        src,
        vec![],
        vec![
            function("f")
                .child(param("v", TypeRef::named("std::vector")))
                .child(param("r", TypeRef::const_ref("std::vector")))
                .child(compound().child(reserve("v")).child(reserve("r"))),
        ],
    );

    let findings = run_check("prefer-inplace-vector", &tu);
    assert_eq!(findings.len(), 1);
    assert_eq!((findings[0].span.start.row, findings[0].span.start.column), (1, 57));
}

#[test]
fn prefer_inplace_vector_local_sized_construction() {
    let src = Source("void f() { std::vector<int> v(8); } std::vector<int> g(8);");
    let sized = || construct(ConstructorKind::Regular).child(int(8));
    let tu = unit(
        CapabilityTier::Tier26,
        src,
        vec![],
        vec![
            function("f").child(
                compound().child(
                    local("v", TypeRef::named("std::vector"))
                        .child(sized())
                        .at(src.at("v(8)")),
                ),
            ),
            global("g", TypeRef::named("std::vector"))
                .child(sized())
                .at(src.at("g(8)")),
        ],
    );

    let findings = run_check("prefer-inplace-vector", &tu);
    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0].message,
        "local std::vector(8) with small fixed size; consider std::inplace_vector<T, 8> (C++26) for zero-allocation storage"
    );
}

#[test]
fn prefer_copyable_function_labels_each_declaration() {
    let src = Source("std::function<void()> cb; struct S { std::function<void()> m; }; void f(const std::function<void()>& p);");
    let tu = unit(
        CapabilityTier::Tier26,
        src,
        vec![],
        vec![
            global("cb", TypeRef::named("std::function")).at(src.at("cb")),
            record("S").child(field("m", TypeRef::named("std::function")).at(src.at("m;"))),
            function("f").child(param("p", TypeRef::const_ref("std::function")).at(src.at("p)"))),
        ],
    );

    let findings = run_check("prefer-copyable-function", &tu);
    let labels: Vec<_> = findings
        .iter()
        .map(|f| f.message.split_whitespace().nth(1).unwrap_or_default())
        .collect();
    assert_eq!(labels, ["variable", "field", "parameter"]);
}

#[test]
fn prefer_hive_flags_linked_lists() {
    let src = Source("std::list<Order> book; std::forward_list<int> free_ids; std::list<int>* borrowed;");
    let tu = unit(
        CapabilityTier::Tier26,
        src,
        vec![],
        vec![
            global("book", TypeRef::named("std::__cxx11::list")).at(src.at("book")),
            global("free_ids", TypeRef::named("std::forward_list")).at(src.at("free_ids")),
            global("borrowed", TypeRef::pointer("std::list<int> *")).at(src.at("borrowed")),
        ],
    );

    let findings = run_check("prefer-hive", &tu);
    assert_eq!(findings.len(), 2);
    assert!(findings[0].message.starts_with("std::list has per-node allocation"));
    assert!(findings[1].message.starts_with("std::forward_list has per-node allocation"));
    assert!(run_check("prefer-hive", &unit(CapabilityTier::Tier23, src, vec![], vec![])).is_empty());
}
