//! Page storage
//!
//! Pages live in one flat directory, one `<title>.txt` file per page,
//! raw bytes with no header. There is no cache and no write locking:
//! concurrent saves of the same title are last-writer-wins.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::WikiError;
use crate::routing::Title;

const PAGE_EXTENSION: &str = ".txt";

/// A titled text document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub const fn new(title: Title, body: Vec<u8>) -> Self {
        Self { title, body }
    }

    /// Empty page used when editing a title that has no file yet
    pub const fn empty(title: Title) -> Self {
        Self::new(title, Vec::new())
    }

    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Directory-backed page store
#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `title`
    pub fn page_path(&self, title: &Title) -> PathBuf {
        self.dir.join(format!("{title}{PAGE_EXTENSION}"))
    }

    /// Create the pages directory if it does not exist
    pub async fn ensure_dir(&self) -> Result<(), WikiError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Read a page, `NotFound` when the file is absent
    pub async fn load(&self, title: &Title) -> Result<Page, WikiError> {
        match fs::read(self.page_path(title)).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(WikiError::NotFound(title.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a page, creating or truncating its file with owner-only permissions
    pub async fn save(&self, page: &Page) -> Result<(), WikiError> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(self.page_path(&page.title)).await?;
        file.write_all(&page.body).await?;
        file.flush().await?;
        Ok(())
    }

    /// Titles of every non-directory entry, in directory enumeration order
    pub async fn list(&self) -> Result<Vec<String>, WikiError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut titles = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let title = name
                .strip_suffix(PAGE_EXTENSION)
                .map_or_else(|| name.clone(), ToString::to_string);
            titles.push(title);
        }
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(s: &str) -> Title {
        Title::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path());
        let body = b"line one\nline two\n\xff raw byte".to_vec();

        store.save(&Page::new(title("Notes"), body.clone())).await.unwrap();
        let page = store.load(&title("Notes")).await.unwrap();

        assert_eq!(page.title, title("Notes"));
        assert_eq!(page.body, body);
        assert!(dir.path().join("Notes.txt").is_file());
    }

    #[tokio::test]
    async fn test_save_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path());
        let page = Page::new(title("Same"), b"same body".to_vec());

        store.save(&page).await.unwrap();
        let first = std::fs::read(dir.path().join("Same.txt")).unwrap();
        store.save(&page).await.unwrap();
        let second = std::fs::read(dir.path().join("Same.txt")).unwrap();

        assert_eq!(first, second);
        assert_eq!(second, b"same body");
    }

    #[tokio::test]
    async fn test_save_truncates_longer_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path());

        store.save(&Page::new(title("Short"), b"a much longer body".to_vec())).await.unwrap();
        store.save(&Page::new(title("Short"), b"tiny".to_vec())).await.unwrap();

        assert_eq!(store.load(&title("Short")).await.unwrap().body, b"tiny");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_save_uses_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path());
        store.save(&Page::new(title("Private"), b"x".to_vec())).await.unwrap();

        let mode = std::fs::metadata(dir.path().join("Private.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path());

        let err = store.load(&title("Missing")).await.unwrap_err();
        assert!(matches!(err, WikiError::NotFound(t) if t == "Missing"));
    }

    #[tokio::test]
    async fn test_list_strips_extension_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path());
        store.save(&Page::new(title("Alpha"), b"a".to_vec())).await.unwrap();
        store.save(&Page::new(title("Beta"), b"b".to_vec())).await.unwrap();
        std::fs::create_dir(dir.path().join("archive")).unwrap();

        let mut titles = store.list().await.unwrap();
        titles.sort();
        assert_eq!(titles, vec!["Alpha".to_string(), "Beta".to_string()]);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path().join("nope"));

        assert!(matches!(store.list().await, Err(WikiError::Io(_))));
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path().join("texts"));

        store.ensure_dir().await.unwrap();
        assert!(dir.path().join("texts").is_dir());
        assert!(store.list().await.unwrap().is_empty());
    }
}
