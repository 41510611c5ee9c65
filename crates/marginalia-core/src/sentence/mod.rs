//! Sentence address codec.

mod codec;

pub use codec::{
    ADDRESS_SEPARATOR, SentenceAddress, decode, encode, locate_message, resolve_text,
    sentences_of, split_sentences,
};
