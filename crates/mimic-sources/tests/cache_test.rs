use std::io::Write;
use std::sync::Arc;

use mimic_core::Error;
use mimic_sources::{BUILTIN_LOCATION, DictionaryCache};
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_file_dictionary_through_cache() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "  river\nstone\n\n42\nwind  ").unwrap();

    let cache = DictionaryCache::new(format!("file:{}", file.path().display()));
    let dictionary = cache.get().await.unwrap();
    assert_eq!(dictionary.len(), 3);
    assert_eq!(dictionary.bucket(5), ["river".to_string(), "stone".to_string()]);
    assert_eq!(dictionary.bucket(4), ["wind".to_string()]);
}

#[tokio::test]
async fn test_builtin_dictionary_is_loaded_once() {
    let cache = Arc::new(DictionaryCache::new(BUILTIN_LOCATION));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get().await.unwrap() })
        })
        .collect();

    let mut loaded = Vec::new();
    for handle in handles {
        loaded.push(handle.await.unwrap());
    }
    assert!(loaded.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[tokio::test]
async fn test_missing_file_then_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    let cache = DictionaryCache::new(path.display().to_string());

    assert!(matches!(cache.get().await, Err(Error::Dictionary(_))));

    std::fs::write(&path, "cloud\nrain\n").unwrap();
    assert_eq!(cache.get().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_word_list_without_words_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "123\n--\n").unwrap();

    let cache = DictionaryCache::new(file.path().display().to_string());
    let err = cache.get().await.unwrap_err();
    assert!(err.to_string().contains("no usable words"));
}
