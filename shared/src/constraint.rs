use serde::{Deserialize, Serialize};

use crate::format::format_bytes;

pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_MAX_SIZE: u64 = 5 * 1024 * 1024;
pub const DOCUMENTS_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Limits governing which files may enter a batch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileConstraint {
    pub max_files: usize,
    pub max_size: u64,
    /// MIME pattern (`image/*`, `application/pdf`) to accepted file extensions,
    /// in the order they are shown to the user.
    pub accept: Vec<(String, Vec<String>)>,
}

impl Default for FileConstraint {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILES,
            DEFAULT_MAX_SIZE,
            [
                ("image/*", &[".jpeg", ".jpg", ".png", ".gif"][..]),
                ("application/pdf", &[".pdf"][..]),
            ],
        )
    }
}

impl FileConstraint {
    pub fn new<'a>(
        max_files: usize,
        max_size: u64,
        accept: impl IntoIterator<Item = (&'a str, &'a [&'a str])>,
    ) -> Self {
        let accept = accept
            .into_iter()
            .map(|(pattern, exts)| {
                (
                    pattern.to_string(),
                    exts.iter().map(|e| e.to_string()).collect(),
                )
            })
            .collect();

        Self {
            max_files,
            max_size,
            accept,
        }
    }

    /// Images, PDF, Word and plain text up to 10 MiB each.
    pub fn documents() -> Self {
        Self::new(
            DEFAULT_MAX_FILES,
            DOCUMENTS_MAX_SIZE,
            [
                ("image/*", &[".jpeg", ".jpg", ".png", ".gif", ".webp"][..]),
                ("application/pdf", &[".pdf"][..]),
                ("application/msword", &[".doc", ".docx"][..]),
                ("text/plain", &[".txt"][..]),
            ],
        )
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// True when the MIME type matches a pattern or the name ends with a listed extension.
    /// An empty accept map admits everything.
    pub fn accepts(&self, name: &str, mime_type: &str) -> bool {
        if self.accept.is_empty() {
            return true;
        }

        let mime_type = mime_type.trim().to_ascii_lowercase();
        let name = name.to_ascii_lowercase();

        self.accept.iter().any(|(pattern, extensions)| {
            mime_matches(pattern, &mime_type)
                || extensions
                    .iter()
                    .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
        })
    }

    pub fn exceeds_size(&self, size_bytes: u64) -> bool {
        size_bytes > self.max_size
    }

    /// Value for an `<input type="file" accept=...>` attribute.
    pub fn accept_attr(&self) -> String {
        self.accept
            .iter()
            .flat_map(|(pattern, exts)| std::iter::once(pattern.as_str()).chain(exts.iter().map(String::as_str)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Help text listing the extensions and the size limit.
    pub fn describe(&self) -> String {
        let extensions = self
            .accept
            .iter()
            .map(|(_, exts)| exts.join(", "))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} (Max {})", extensions, format_bytes(self.max_size))
    }
}

fn mime_matches(pattern: &str, mime_type: &str) -> bool {
    let pattern = pattern.trim().to_ascii_lowercase();
    match pattern.strip_suffix("/*") {
        Some(base) => mime_type
            .split_once('/')
            .is_some_and(|(mime_base, _)| mime_base == base),
        None => pattern == mime_type,
    }
}
