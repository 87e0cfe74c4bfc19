//! Command word list files
//!
//! Bulk provisioning reads the command words from a TOML file:
//!
//! ```toml
//! [[word]]
//! id = 1
//! text = "turn on the light"
//!
//! [[word]]
//! id = 2
//! text = "turn off the light"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use isrmod_core::chunk::MAX_TEXT_LEN;
use isrmod_core::register::{NO_MATCH_ID, WAKE_WORD_ID};
use thiserror::Error;

/// Word list file structure
#[derive(Debug, serde::Deserialize)]
struct WordFile {
    #[serde(default)]
    word: Vec<WordEntry>,
}

/// One command word to provision
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct WordEntry {
    /// Id reported when the word is recognized
    pub id: u8,
    /// Text as the module should match it
    pub text: String,
}

/// Errors from loading a word list
#[derive(Debug, Error)]
pub enum WordListError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid word list: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Id {0} is reserved (0 is the wake word, 255 means no match)")]
    ReservedId(u8),

    #[error("Id {0} appears more than once")]
    DuplicateId(u8),

    #[error("Word {id} is empty")]
    EmptyText { id: u8 },

    #[error("Word {id} is {len} bytes, maximum is 255")]
    TextTooLong { id: u8, len: usize },
}

/// Validated list of command words
#[derive(Debug, Clone, Default)]
pub struct WordList {
    /// Entries in file order
    pub words: Vec<WordEntry>,
}

impl WordList {
    /// Load a word list from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WordListError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| WordListError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a word list from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, WordListError> {
        let file: WordFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        for entry in &file.word {
            if entry.id == WAKE_WORD_ID || entry.id == NO_MATCH_ID {
                return Err(WordListError::ReservedId(entry.id));
            }
            if !seen.insert(entry.id) {
                return Err(WordListError::DuplicateId(entry.id));
            }
            if entry.text.is_empty() {
                return Err(WordListError::EmptyText { id: entry.id });
            }
            if entry.text.len() > MAX_TEXT_LEN {
                return Err(WordListError::TextTooLong {
                    id: entry.id,
                    len: entry.text.len(),
                });
            }
        }

        Ok(Self { words: file.word })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list has no entries
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_list() {
        let list = WordList::from_toml_str(
            r#"
            [[word]]
            id = 1
            text = "turn on the light"

            [[word]]
            id = 2
            text = "开灯"
            "#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(
            list.words[0],
            WordEntry {
                id: 1,
                text: "turn on the light".to_string()
            }
        );
        // Length limit counts bytes, not characters
        assert_eq!(list.words[1].text.len(), 6);
    }

    #[test]
    fn test_empty_file_is_empty_list() {
        assert!(WordList::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_reserved_and_duplicate_ids() {
        let reserved = "[[word]]\nid = 255\ntext = \"x\"\n";
        assert!(matches!(
            WordList::from_toml_str(reserved),
            Err(WordListError::ReservedId(255))
        ));

        let duplicate = "[[word]]\nid = 3\ntext = \"a\"\n[[word]]\nid = 3\ntext = \"b\"\n";
        assert!(matches!(
            WordList::from_toml_str(duplicate),
            Err(WordListError::DuplicateId(3))
        ));
    }

    #[test]
    fn test_rejects_bad_text_and_out_of_range_id() {
        let long = format!("[[word]]\nid = 4\ntext = \"{}\"\n", "a".repeat(256));
        assert!(matches!(
            WordList::from_toml_str(&long),
            Err(WordListError::TextTooLong { id: 4, len: 256 })
        ));
        assert!(matches!(
            WordList::from_toml_str("[[word]]\nid = 4\ntext = \"\"\n"),
            Err(WordListError::EmptyText { id: 4 })
        ));
        assert!(matches!(
            WordList::from_toml_str("[[word]]\nid = 300\ntext = \"a\"\n"),
            Err(WordListError::Parse(_))
        ));
    }
}
