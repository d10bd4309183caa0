//! Synthetic documents on disk and their link to the recipe they mirror.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::error::EmbeddedError;
use super::language::EmbeddedLanguage;

/// Folder below the storage path that holds every synthetic file
pub const EMBEDDED_DOCUMENTS_DIR: &str = "embedded-documents";

/// One synthetic file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocument {
    pub uri: Url,
    pub path: PathBuf,
    pub language: EmbeddedLanguage,
    pub original_uri: Url,
    /// Lines added in front of the original text
    pub line_offset: u32,
}

/// Tracks the synthetic files of every open recipe.
///
/// Each (recipe, language) pair maps to at most one file. Saving new content
/// writes a fresh file and only then removes the previous one, so a client
/// never sees a half-written document.
#[derive(Debug)]
pub struct EmbeddedDocumentStore {
    root: PathBuf,
    documents: Mutex<FxHashMap<Url, Vec<EmbeddedDocument>>>,
}

impl EmbeddedDocumentStore {
    pub fn new(storage_path: &Path) -> Self {
        Self {
            root: storage_path.join(EMBEDDED_DOCUMENTS_DIR),
            documents: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` as the `language` view of `original` and return the
    /// new document.
    pub async fn save(
        &self,
        original: &Url,
        language: EmbeddedLanguage,
        content: &str,
    ) -> Result<EmbeddedDocument, EmbeddedError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EmbeddedError::io(&self.root, e))?;

        let path = self
            .root
            .join(format!("{}{}", Uuid::new_v4(), language.extension()));
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| EmbeddedError::io(&path, e))?;
        let uri = Url::from_file_path(&path).map_err(|()| EmbeddedError::RelativePath(path.clone()))?;

        let document = EmbeddedDocument {
            uri,
            path,
            language,
            original_uri: original.clone(),
            line_offset: language.line_offset(),
        };

        let previous = {
            let mut documents = self.documents.lock();
            let entries = documents.entry(original.clone()).or_default();
            let previous = entries
                .iter()
                .position(|d| d.language == language)
                .map(|idx| entries.remove(idx));
            entries.push(document.clone());
            previous
        };
        if let Some(previous) = previous {
            unlink(&previous.path).await;
        }
        debug!(original = %original, path = %document.path.display(), "saved embedded document");
        Ok(document)
    }

    pub fn get(&self, original: &Url, language: EmbeddedLanguage) -> Option<EmbeddedDocument> {
        self.documents
            .lock()
            .get(original)
            .and_then(|docs| docs.iter().find(|d| d.language == language).cloned())
    }

    pub fn documents_for(&self, original: &Url) -> Vec<EmbeddedDocument> {
        self.documents.lock().get(original).cloned().unwrap_or_default()
    }

    /// The synthetic document published under `uri`
    pub fn find_by_uri(&self, uri: &Url) -> Option<EmbeddedDocument> {
        self.documents
            .lock()
            .values()
            .flatten()
            .find(|d| &d.uri == uri)
            .cloned()
    }

    /// Forget every view of `original` and delete their files.
    pub async fn remove(&self, original: &Url) -> Vec<EmbeddedDocument> {
        let removed = self.documents.lock().remove(original).unwrap_or_default();
        for document in &removed {
            unlink(&document.path).await;
        }
        removed
    }

    /// Files stay where they are, only the owning recipe changes.
    pub fn rename(&self, old: &Url, new: &Url) {
        let mut documents = self.documents.lock();
        if let Some(mut entries) = documents.remove(old) {
            for document in &mut entries {
                document.original_uri = new.clone();
            }
            documents.insert(new.clone(), entries);
        }
    }

    /// Delete the whole storage folder, tracked or not.
    pub async fn cleanup(&self) -> Result<(), EmbeddedError> {
        self.documents.lock().clear();
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EmbeddedError::io(&self.root, e)),
        }
    }
}

async fn unlink(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), %error, "failed to delete embedded document");
    }
}
