pub mod ast_harness;
