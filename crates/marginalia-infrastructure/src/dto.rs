//! On-disk representations of annotation and vault files.
//!
//! TOML cannot hold `None` inside arrays, so vault batches are stored as one
//! table per sentence and converted back into parallel arrays on load.

use marginalia_core::annotation::{HighlightRecord, MemoRecord};
use marginalia_core::thread::ThreadType;
use marginalia_core::vault::{RelatedSentence, SentenceBatch, VaultEntry, VaultItem, VaultMemo};
use marginalia_core::{MarginaliaError, Result};
use serde::{Deserialize, Serialize};

/// `annotations.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationsFileV1 {
    #[serde(default)]
    pub memos: Vec<MemoRecord>,
    #[serde(default)]
    pub highlights: Vec<HighlightRecord>,
}

/// `vault.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultFileV1 {
    #[serde(default)]
    pub items: Vec<VaultItemDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultItemKind {
    Sentences,
    Memo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultItemDto {
    pub id: String,
    pub created_at: String,
    pub kind: VaultItemKind,
    pub thread_id: String,
    pub thread_type: ThreadType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    /// Memo text for `Memo` items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_sentence_id: Option<String>,
    #[serde(default)]
    pub sentences: Vec<VaultSentenceDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSentenceDto {
    pub sentence_id: String,
    pub content: String,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl From<&VaultItem> for VaultItemDto {
    fn from(item: &VaultItem) -> Self {
        match &item.entry {
            VaultEntry::Sentences(batch) => {
                let sentences = (0..batch.len())
                    .map(|i| VaultSentenceDto {
                        sentence_id: batch.sentence_ids[i].clone(),
                        content: batch.sentences[i].clone(),
                        highlighted: batch.highlight_states[i],
                        highlight_color: batch.highlight_colors[i].clone(),
                        memo: batch.memo_contents[i].clone(),
                    })
                    .collect();
                VaultItemDto {
                    id: item.id.clone(),
                    created_at: item.created_at.clone(),
                    kind: VaultItemKind::Sentences,
                    thread_id: batch.thread_id.clone(),
                    thread_type: batch.thread_type,
                    persona_id: batch.persona_id.clone(),
                    memo: None,
                    anchor_sentence_id: None,
                    sentences,
                }
            }
            VaultEntry::Memo(memo) => VaultItemDto {
                id: item.id.clone(),
                created_at: item.created_at.clone(),
                kind: VaultItemKind::Memo,
                thread_id: memo.thread_id.clone(),
                thread_type: memo.thread_type,
                persona_id: memo.persona_id.clone(),
                memo: Some(memo.content.clone()),
                anchor_sentence_id: Some(memo.anchor_sentence_id.clone()),
                sentences: memo
                    .related_sentences
                    .iter()
                    .map(|related| VaultSentenceDto {
                        sentence_id: related.sentence_id.clone(),
                        content: related.content.clone(),
                        highlighted: false,
                        highlight_color: None,
                        memo: None,
                    })
                    .collect(),
            },
        }
    }
}

impl TryFrom<VaultItemDto> for VaultItem {
    type Error = MarginaliaError;

    fn try_from(dto: VaultItemDto) -> Result<Self> {
        let entry = match dto.kind {
            VaultItemKind::Sentences => {
                let mut batch = SentenceBatch {
                    thread_id: dto.thread_id,
                    thread_type: dto.thread_type,
                    persona_id: dto.persona_id,
                    sentence_ids: Vec::with_capacity(dto.sentences.len()),
                    sentences: Vec::with_capacity(dto.sentences.len()),
                    highlight_states: Vec::with_capacity(dto.sentences.len()),
                    highlight_colors: Vec::with_capacity(dto.sentences.len()),
                    memo_contents: Vec::with_capacity(dto.sentences.len()),
                };
                for sentence in dto.sentences {
                    batch.sentence_ids.push(sentence.sentence_id);
                    batch.sentences.push(sentence.content);
                    batch.highlight_states.push(sentence.highlighted);
                    batch.highlight_colors.push(sentence.highlight_color);
                    batch.memo_contents.push(sentence.memo);
                }
                VaultEntry::Sentences(batch)
            }
            VaultItemKind::Memo => {
                let anchor_sentence_id = dto
                    .anchor_sentence_id
                    .or_else(|| dto.sentences.first().map(|s| s.sentence_id.clone()))
                    .ok_or_else(|| {
                        MarginaliaError::Serialization {
                            format: "TOML".to_string(),
                            message: format!("Vault memo {} has no anchor sentence", dto.id),
                        }
                    })?;
                VaultEntry::Memo(VaultMemo {
                    thread_id: dto.thread_id,
                    thread_type: dto.thread_type,
                    persona_id: dto.persona_id,
                    anchor_sentence_id,
                    content: dto.memo.unwrap_or_default(),
                    related_sentences: dto
                        .sentences
                        .into_iter()
                        .map(|s| RelatedSentence {
                            sentence_id: s.sentence_id,
                            content: s.content,
                        })
                        .collect(),
                })
            }
        };

        Ok(VaultItem {
            id: dto.id,
            created_at: dto.created_at,
            entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_with_gaps_survives_toml() {
        let item = VaultItem::new(VaultEntry::Sentences(SentenceBatch {
            thread_id: "t1".into(),
            thread_type: ThreadType::Proceed,
            persona_id: Some("freud".into()),
            sentence_ids: vec!["s1".into(), "s2".into()],
            sentences: vec!["text1".into(), "text2".into()],
            highlight_states: vec![true, false],
            highlight_colors: vec![Some("yellow".into()), None],
            memo_contents: vec![Some("note".into()), None],
        }));

        let file = VaultFileV1 {
            items: vec![VaultItemDto::from(&item)],
        };
        let text = toml::to_string_pretty(&file).unwrap();
        let parsed: VaultFileV1 = toml::from_str(&text).unwrap();
        let restored = VaultItem::try_from(parsed.items[0].clone()).unwrap();

        assert_eq!(restored, item);
    }

    #[test]
    fn test_memo_without_anchor_uses_first_sentence() {
        let dto = VaultItemDto {
            id: "v1".into(),
            created_at: "now".into(),
            kind: VaultItemKind::Memo,
            thread_id: "t1".into(),
            thread_type: ThreadType::Sentence,
            persona_id: None,
            memo: Some("why".into()),
            anchor_sentence_id: None,
            sentences: vec![VaultSentenceDto {
                sentence_id: "s9".into(),
                content: "text".into(),
                highlighted: false,
                highlight_color: None,
                memo: None,
            }],
        };
        let item = VaultItem::try_from(dto).unwrap();
        match item.entry {
            VaultEntry::Memo(memo) => assert_eq!(memo.anchor_sentence_id, "s9"),
            other => panic!("unexpected entry: {other:?}"),
        }
    }
}
