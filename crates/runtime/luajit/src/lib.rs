//! Translator from legacy editor scripts to LuaJIT source.
//!
//! The generated chunk does not evaluate anything by itself: every
//! operation with legacy semantics is a call into a runtime library that
//! the chunk `require`s (see [`TranslateOptions::runtime_module`]). Errors
//! that only exist when the code runs (arity, list length, unknown
//! variables) become calls that raise the legacy error at the original
//! `line:col:command` position.

mod codegen;
mod options;

pub use codegen::{TranslateError, translate, translate_expression, translate_script};
pub use options::TranslateOptions;

#[cfg(test)]
mod tests;
