//! Plain-text rendering of the current selection.

use crate::models::ManifestItem;

/// Render one line per item, prefixed by the index that removes it.
///
/// Example output:
/// ```text
/// [0] docs/a.txt (1.5 KB)
/// [1] docs/sub/b.txt (0.0 KB)
/// ```
pub fn render_selection(items: &[ManifestItem]) -> String {
    if items.is_empty() {
        return "No files selected.\n".to_string();
    }

    let mut output = String::new();
    for (index, item) in items.iter().enumerate() {
        output.push_str(&format!(
            "[{}] {} ({:.1} KB)\n",
            index,
            item.relative_path,
            item.size_kb()
        ));
    }
    output
}
