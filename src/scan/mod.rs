//! Text scanning layer
//!
//! Restricted, tokenizer-free scanning of C/C++ source text:
//! - [`normalize`]: canonical token stream (comments, preprocessor lines,
//!   and initializers stripped; whitespace normalized).
//! - [`extract`]: brace-balanced extraction of struct/union definitions.
//! - [`registry`]: REGISTER_STRUCT marker invocation scanning over the raw
//!   (non-normalized) text.

pub mod extract;
pub mod normalize;
pub mod registry;
