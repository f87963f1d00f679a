//! Line-level unified diff between original and proposed file content

use colored::Colorize;
use similar::TextDiff;
use std::io::Write;

/// Lines of context around each hunk
const CONTEXT_LINES: usize = 3;

/// Render a unified diff with `original` / `proposed` headers
pub fn unified_diff(original: &str, proposed: &str) -> String {
    TextDiff::from_lines(original, proposed)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header("original", "proposed")
        .to_string()
}

/// Write a unified diff with added lines green, removed lines red, hunk headers cyan
pub fn write_colored_diff(
    writer: &mut dyn Write,
    original: &str,
    proposed: &str,
) -> std::io::Result<()> {
    for line in unified_diff(original, proposed).lines() {
        let styled = if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.dimmed()
        };
        writeln!(writer, "{}", styled)?;
    }
    Ok(())
}
