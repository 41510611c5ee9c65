use marginalia_core::annotation::{AnnotationService, MemoWrite};
use marginalia_core::thread::ThreadType;
use marginalia_core::vault::{SentenceBatch, VaultEntry, VaultService};
use marginalia_infrastructure::paths::MarginaliaPaths;
use marginalia_infrastructure::{TomlAnnotationService, TomlVaultService};
use tempfile::TempDir;

#[tokio::test]
async fn test_annotations_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let paths = MarginaliaPaths::new(Some(temp_dir.path().to_path_buf()));

    {
        let service = TomlAnnotationService::new(&paths).expect("Should create service");
        service
            .upsert_memo(MemoWrite {
                thread_id: "interpretation_freud".into(),
                thread_type: ThreadType::Interpretation,
                sentence_id: "2024-01-01T00:00:00+00:00|1|0".into(),
                content: "slip of the tongue".into(),
                sentence_content: "I meant to say mother".into(),
            })
            .await
            .expect("Should save memo");
        service
            .create_highlight(
                "interpretation_freud",
                ThreadType::Interpretation,
                "2024-01-01T00:00:00+00:00|1|1",
            )
            .await
            .expect("Should save highlight");
    }

    let reopened = TomlAnnotationService::new(&paths).expect("Should create service");
    let snapshot = reopened
        .fetch_thread_annotations("interpretation_freud")
        .await
        .expect("Should load snapshot");

    assert_eq!(
        snapshot.memos.get("2024-01-01T00:00:00+00:00|1|0").map(String::as_str),
        Some("slip of the tongue")
    );
    assert!(snapshot.highlighted.contains("2024-01-01T00:00:00+00:00|1|1"));
}

#[tokio::test]
async fn test_vault_batch_keeps_positional_alignment() {
    let temp_dir = TempDir::new().unwrap();
    let paths = MarginaliaPaths::new(Some(temp_dir.path().to_path_buf()));
    let service = TomlVaultService::new(&paths).expect("Should create service");

    let batch = SentenceBatch {
        thread_id: "proceed_jung_1700000000000".into(),
        thread_type: ThreadType::Proceed,
        persona_id: Some("jung".into()),
        sentence_ids: vec!["a|1|0".into(), "a|1|1".into(), "a|1|2".into()],
        sentences: vec!["one".into(), "two".into(), "three".into()],
        highlight_states: vec![false, true, false],
        highlight_colors: vec![None, Some("yellow".into()), None],
        memo_contents: vec![Some("first".into()), None, Some("third".into())],
    };
    service
        .save_sentences(batch.clone())
        .await
        .expect("Should save batch");

    let reopened = TomlVaultService::new(&paths).expect("Should create service");
    let items = reopened.list().await.expect("Should list vault");
    assert_eq!(items.len(), 1);
    match &items[0].entry {
        VaultEntry::Sentences(stored) => assert_eq!(stored, &batch),
        other => panic!("unexpected entry: {other:?}"),
    }
}
