//! Value objects - immutable types that represent domain concepts

mod meme_id;
mod signature;

pub use meme_id::{ChatId, MemeId, MemeIdParseError, MessageId, UserId};
pub use signature::{Signature, SignatureParseError, HASH_BITS};
