//! 転載済みスレッドIDの永続台帳。
//!
//! 実体は挿入順を保った文字列IDのJSON配列1ファイル。読み込みは失敗しても
//! 空の台帳で続行し、書き込み失敗だけを呼び出し側へ返す。

use std::{
    fs,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to serialize ledger for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write ledger file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 既に転載したスレッドIDの集合。重複書き込みはここで防ぐ。
#[derive(Debug)]
pub struct PublicationLedger {
    path: PathBuf,
    ids: Vec<String>,
    index: FxHashSet<String>,
}

impl PublicationLedger {
    /// 台帳ファイルを読み込む。ファイルが無い場合や壊れている場合は
    /// 警告ログの上で空の台帳から始める。読み込みはエラーにしない。
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let raw_ids: Vec<String> = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(ids) => ids,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "ledger file is not a JSON string array, starting empty"
                    );
                    Vec::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "ledger file unreadable, starting empty"
                );
                Vec::new()
            }
        };

        // 一意性保証の無かった旧形式のファイルも読めるように、初出のみ残す
        let mut index = FxHashSet::default();
        let mut ids = Vec::with_capacity(raw_ids.len());
        for id in raw_ids {
            if index.insert(id.clone()) {
                ids.push(id);
            }
        }

        Self {
            path: path.to_path_buf(),
            ids,
            index,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// IDを台帳に追記し、直ちに全件をファイルへ書き戻す。既知のIDは
    /// 追加されない。公開が成功した後にだけ呼ぶこと。
    ///
    /// # Errors
    /// 書き込みに失敗した場合は [`LedgerError`] を返す。メモリ上の状態は
    /// 巻き戻さないので、呼び出し側はログに残して続行してよい。
    pub fn record(&mut self, id: &str) -> Result<(), LedgerError> {
        if self.index.insert(id.to_string()) {
            self.ids.push(id.to_string());
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let payload = serde_json::to_string(&self.ids).map_err(|source| LedgerError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, payload).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_file_starts_empty() {
        let dir = tempdir().expect("tempdir");
        let ledger = PublicationLedger::load(&dir.path().join("absent.json"));

        assert!(ledger.is_empty());
        assert!(!ledger.contains("t3_abc"));
    }

    #[test]
    fn load_garbage_file_starts_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("posted.json");
        fs::write(&path, "{not json at all").expect("write fixture");

        let ledger = PublicationLedger::load(&path);

        assert!(ledger.is_empty());
    }

    #[test]
    fn record_then_contains() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("posted.json");
        let mut ledger = PublicationLedger::load(&path);

        ledger.record("t3_abc").expect("record persists");

        assert!(ledger.contains("t3_abc"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn record_persists_immediately() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("posted.json");
        let mut ledger = PublicationLedger::load(&path);

        ledger.record("t3_abc").expect("record persists");

        let on_disk = fs::read_to_string(&path).expect("file exists");
        assert_eq!(on_disk, r#"["t3_abc"]"#);
    }

    #[test]
    fn double_record_keeps_id_once() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("posted.json");
        let mut ledger = PublicationLedger::load(&path);

        ledger.record("t3_abc").expect("record persists");
        ledger.record("t3_abc").expect("record persists");

        let reloaded = PublicationLedger::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains("t3_abc"));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("posted.json");
        let mut ledger = PublicationLedger::load(&path);

        ledger.record("first").expect("record persists");
        ledger.record("second").expect("record persists");
        ledger.record("third").expect("record persists");

        let on_disk = fs::read_to_string(&path).expect("file exists");
        assert_eq!(on_disk, r#"["first","second","third"]"#);
    }

    #[test]
    fn legacy_file_with_duplicates_is_deduplicated() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("posted.json");
        fs::write(&path, r#"["a","b","a","c","b"]"#).expect("write fixture");

        let mut ledger = PublicationLedger::load(&path);
        assert_eq!(ledger.len(), 3);

        ledger.record("d").expect("record persists");

        let on_disk = fs::read_to_string(&path).expect("file exists");
        assert_eq!(on_disk, r#"["a","b","c","d"]"#);
    }
}
