use crate::ast::TranslationUnit;
use crate::lint::{CheckContext, RegisteredCheck};

/// Walk the unit once in preorder. At every node, each eligible check's
/// queries are tried in registration order and every match is handed to the
/// owning check with a fresh binding.
pub fn walk_translation_unit(
    tu: &TranslationUnit,
    checks: &[&RegisteredCheck],
    ctx: &mut CheckContext<'_>,
) -> usize {
    let mut matches = 0;
    for node in tu.preorder() {
        for registered in checks {
            for query in registered.queries() {
                let Some(binding) = query.run(tu, node) else {
                    continue;
                };
                matches += 1;
                registered.check().on_match(query.id, &binding, ctx);
            }
        }
    }
    matches
}
