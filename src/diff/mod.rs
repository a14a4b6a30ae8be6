pub mod file;
pub mod full;
pub mod header;
pub mod hunk;

pub use file::FileDiff;
pub use full::Diff;
pub use header::{HunkHeader, hunk_contains_hunk, hunk_contains_line, order_headers};
pub use hunk::{ContentSection, DiffHunk, DiffLine, LineId, LineKind, classify, sections};

/// Format a diff for user display, one selectable line per row.
///
/// Each change line is prefixed with the reference that selects it: `-N`
/// for a removed old line, `+N` for an added new line.
pub fn format_diff(diff: &Diff) -> String {
    let mut result = String::new();

    for file_diff in &diff.files {
        result.push_str(&file_diff.path);
        result.push_str(":\n");

        for hunk in &file_diff.hunks {
            result.push_str(&format!("  {}\n", hunk.header));
            for line in hunk.lines().iter().filter(|l| l.kind.is_change()) {
                result.push_str(&format!("  {}:\t{}\n", line.id, line.content));
            }
            result.push('\n');
        }
    }

    // Remove trailing newline if present
    if result.ends_with("\n\n") {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_lists_change_lines() {
        let diff = Diff::parse(
            "diff --git a/gtk.nix b/gtk.nix\n--- a/gtk.nix\n+++ b/gtk.nix\n@@ -10,3 +10,3 @@\n-    theme = 1;\n+    theme = 2;\n     size = 24;\n-    icons = 3;\n+    icons = 4;\n",
        );
        insta::assert_snapshot!(format_diff(&diff), @r"
        gtk.nix:
          @@ -10,3 +10,3 @@
          -10:	    theme = 1;
          +10:	    theme = 2;
          -12:	    icons = 3;
          +12:	    icons = 4;
        ");
    }
}
