//! The two translation seams.
//!
//! Both output targets implement the same pair of traits, so the HTML
//! renderer and the structured document translator apply one rule set to
//! one token model.

use crate::token::{Inline, Token};

/// Translates a sequence of inline tokens, preserving their order.
pub trait InlineTranslator {
    type Output;

    fn translate_inlines(&self, inlines: &[Inline]) -> Self::Output;
}

/// Translates one block token. Never fails: kinds without a rule degrade to
/// plain text or to nothing.
pub trait BlockTranslator {
    type Output;

    fn translate_block(&self, token: &Token) -> Self::Output;
}
