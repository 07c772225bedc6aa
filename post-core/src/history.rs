//! Saved post history.
//!
//! Posts are kept newest-first. With a data directory configured, every
//! mutation rewrites `post-history.json` in that directory.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::post::Post;

/// Storage key of the history; also the file stem on disk.
pub const HISTORY_KEY: &str = "post-history";

/// Errors that can occur during history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The requested post does not exist.
    #[error("Post not found: {0}")]
    NotFound(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Newest-first list of saved posts.
#[derive(Debug, Clone, Default)]
pub struct PostHistory {
    posts: Vec<Post>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl PostHistory {
    /// History that lives only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the history stored in `data_dir`, creating the directory if it
    /// doesn't exist. A missing history file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the directory cannot be created or the
    /// file cannot be read, and [`HistoryError::Serialization`] if the file
    /// is not a valid history.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let path = history_path(&data_dir);

        let posts = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| HistoryError::Serialization(e.to_string()))?
        } else {
            Vec::new()
        };

        tracing::debug!("Loaded {} post(s) from {}", posts.len(), path.display());
        Ok(Self {
            posts,
            data_dir: Some(data_dir),
        })
    }

    /// Path of the history file, if persisted.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.data_dir.as_deref().map(history_path)
    }

    /// All posts, newest first.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Look up a post.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Number of saved posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Check if the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Save a post at the front of the history.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the history is left unchanged.
    pub fn add(&mut self, post: Post) -> Result<Uuid, HistoryError> {
        let id = post.id;
        self.posts.insert(0, post);
        if let Err(e) = self.persist() {
            self.posts.remove(0);
            return Err(e);
        }
        Ok(id)
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] if no post has this ID, or an
    /// error if persisting fails, in which case the post is kept.
    pub fn delete(&mut self, id: Uuid) -> Result<Post, HistoryError> {
        let index = self
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        let post = self.posts.remove(index);
        if let Err(e) = self.persist() {
            self.posts.insert(index, post);
            return Err(e);
        }
        Ok(post)
    }

    /// Delete every post.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the posts are kept.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        let previous = std::mem::take(&mut self.posts);
        if let Err(e) = self.persist() {
            self.posts = previous;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.posts)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        let path = history_path(data_dir);
        std::fs::write(&path, json)?;
        tracing::trace!("Persisted {} post(s) to {}", self.posts.len(), path.display());
        Ok(())
    }
}

fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join(format!("{HISTORY_KEY}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut history = PostHistory::in_memory();
        let first = history.add(Post::new("first", Vec::new())).expect("add");
        let second = history.add(Post::new("second", Vec::new())).expect("add");
        assert_eq!(history.posts()[0].id, second);
        assert_eq!(history.posts()[1].id, first);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut history = PostHistory::in_memory();
        let id = history.add(Post::new("a", Vec::new())).expect("add");
        history.add(Post::new("b", Vec::new())).expect("add");

        let removed = history.delete(id).expect("delete");
        assert_eq!(removed.text, "a");
        assert!(history.get(id).is_none());
        assert!(matches!(history.delete(id), Err(HistoryError::NotFound(_))));

        history.clear().expect("clear");
        assert!(history.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_history_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut history = PostHistory::open(dir.path()).expect("open");
        let kept = history.add(Post::new("kept", Vec::new())).expect("add");

        // A directory where the file belongs makes every write fail
        let path = history.path().expect("persisted");
        std::fs::remove_file(&path).expect("remove");
        std::fs::create_dir(&path).expect("block");

        assert!(matches!(
            history.add(Post::new("lost", Vec::new())),
            Err(HistoryError::Io(_))
        ));
        assert_eq!(history.len(), 1);

        assert!(history.delete(kept).is_err());
        assert!(history.get(kept).is_some());

        assert!(history.clear().is_err());
        assert_eq!(history.posts()[0].id, kept);
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let id = {
            let mut history = PostHistory::open(dir.path()).expect("open");
            assert!(history.is_empty());
            history
                .add(
                    Post::new("persisted", vec!["data:image/png;base64,AA".to_string()])
                        .with_author("Ana", "ana"),
                )
                .expect("add")
        };

        let reopened = PostHistory::open(dir.path()).expect("reopen");
        assert_eq!(reopened.len(), 1);
        let post = reopened.get(id).expect("post persisted");
        assert_eq!(post.text, "persisted");
        assert_eq!(post.user_name.as_deref(), Some("ana"));
        assert!(dir.path().join("post-history.json").exists());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("post-history.json"), "not json").expect("write");
        assert!(matches!(
            PostHistory::open(dir.path()),
            Err(HistoryError::Serialization(_))
        ));
    }
}
