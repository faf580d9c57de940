//! Directory listing
//!
//! HTML index for directories that have no index file.

use std::fmt::Write as _;
use std::io;
use std::path::Path;
use tokio::fs;

use crate::http::response::escape_html;

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    /// Text shown for the entry: `dir/` for directories, `name@` for symlinks
    fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Percent-encoded relative link
    fn href(&self) -> String {
        let encoded = urlencoding::encode(&self.name);
        if self.is_dir {
            format!("{encoded}/")
        } else {
            encoded.into_owned()
        }
    }
}

/// Read a directory's entries, sorted case-insensitively by name
///
/// Directory-ness follows symlinks, so a link to a directory is listed with a
/// trailing slash in its href.
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_symlink = entry
            .file_type()
            .await
            .map(|t| t.is_symlink())
            .unwrap_or(false);
        let is_dir = fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(ListingEntry {
            name,
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_cached_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Render the listing page for `display_path` (already percent-decoded)
pub fn render(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));

    let mut page = String::with_capacity(256 + entries.len() * 64);
    page.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{title}</title>\n</head>\n<body>");
    let _ = writeln!(page, "<h1>{title}</h1>\n<hr>\n<ul>");
    for entry in entries {
        let _ = writeln!(
            page,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&entry.href()),
            escape_html(&entry.display_name())
        );
    }
    page.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    page
}
