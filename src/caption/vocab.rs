use std::collections::HashMap;

use crate::error::CaptionError;

use super::model::Vocabulary;
use super::TokenId;

pub const DEFAULT_START_WORD: &str = "<S>";
pub const DEFAULT_END_WORD: &str = "</S>";
pub const DEFAULT_UNKNOWN_WORD: &str = "<UNK>";

/// In-memory token table. Ids are positions in the token list; the unknown
/// word is appended when the list does not already contain it.
#[derive(Debug, Clone)]
pub struct TokenTable {
    tokens: Vec<String>,
    ids: HashMap<String, TokenId>,
    start_id: TokenId,
    end_id: TokenId,
    unknown_id: TokenId,
}

impl TokenTable {
    pub fn new<I, T>(
        tokens: I,
        start_word: &str,
        end_word: &str,
        unknown_word: &str,
    ) -> Result<Self, CaptionError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        let mut ids = HashMap::new();
        for token in tokens {
            let token = token.into();
            if ids.contains_key(&token) {
                continue;
            }
            ids.insert(token.clone(), list.len() as TokenId);
            list.push(token);
        }
        if !ids.contains_key(unknown_word) {
            ids.insert(unknown_word.to_string(), list.len() as TokenId);
            list.push(unknown_word.to_string());
        }

        let lookup = |word: &str| {
            ids.get(word).copied().ok_or_else(|| {
                CaptionError::InvalidArgument(format!("vocabulary has no {word:?} token"))
            })
        };
        let start_id = lookup(start_word)?;
        let end_id = lookup(end_word)?;
        let unknown_id = lookup(unknown_word)?;

        Ok(Self {
            tokens: list,
            ids,
            start_id,
            end_id,
            unknown_id,
        })
    }

    /// Builds a table with the `<S>`, `</S>` and `<UNK>` marker words.
    pub fn with_default_markers<I, T>(tokens: I) -> Result<Self, CaptionError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(tokens, DEFAULT_START_WORD, DEFAULT_END_WORD, DEFAULT_UNKNOWN_WORD)
    }

    pub fn id_for_token(&self, token: &str) -> TokenId {
        self.ids.get(token).copied().unwrap_or(self.unknown_id)
    }

    pub fn unknown_id(&self) -> TokenId {
        self.unknown_id
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Vocabulary for TokenTable {
    fn start_id(&self) -> TokenId {
        self.start_id
    }

    fn end_id(&self) -> TokenId {
        self.end_id
    }

    fn token_for_id(&self, id: TokenId) -> &str {
        self.tokens
            .get(id as usize)
            .unwrap_or(&self.tokens[self.unknown_id as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_word_is_appended() {
        let table = TokenTable::with_default_markers(["<S>", "</S>", "a", "dog"]).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.unknown_id(), 4);
        assert_eq!(table.start_id(), 0);
        assert_eq!(table.end_id(), 1);
    }

    #[test]
    fn lookups_fall_back_to_unknown() {
        let table = TokenTable::with_default_markers(["<S>", "</S>", "<UNK>", "cat"]).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.id_for_token("cat"), 3);
        assert_eq!(table.id_for_token("zebra"), 2);
        assert_eq!(table.token_for_id(3), "cat");
        assert_eq!(table.token_for_id(99), "<UNK>");
    }

    #[test]
    fn duplicate_tokens_keep_first_id() {
        let table = TokenTable::with_default_markers(["<S>", "a", "a", "</S>"]).unwrap();
        assert_eq!(table.id_for_token("a"), 1);
        assert_eq!(table.end_id(), 2);
    }

    #[test]
    fn missing_markers_are_rejected() {
        let err = TokenTable::with_default_markers(["a", "b"]).unwrap_err();
        assert!(matches!(err, CaptionError::InvalidArgument(_)));
    }
}
