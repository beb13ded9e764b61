//! The pending-decisions document shown to a human at session start.

use crate::classifier::Action;
use crate::error::Result;
use crate::io;
use crate::types::Risk;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Render the review document; `None` when there is nothing to report.
pub fn render(auto_items: &[String], review: &[Action], now: DateTime<Utc>) -> Option<String> {
    if auto_items.is_empty() && review.is_empty() {
        return None;
    }

    let mut lines = vec![
        format!("## Skill catalog review ({})", now.format("%Y-%m-%d %H:%M UTC")),
        String::new(),
    ];

    if !auto_items.is_empty() {
        lines.push("### Auto-applied".to_string());
        lines.extend(auto_items.iter().map(|item| format!("- {item}")));
        lines.push(String::new());
    }

    if !review.is_empty() {
        lines.push("### Needs review".to_string());
        lines.push("Check each item, then run its command.".to_string());
        lines.push(String::new());
        for (risk, heading) in [
            (Risk::Medium, "#### MEDIUM: recommended"),
            (Risk::High, "#### HIGH: confirm before running"),
        ] {
            let items: Vec<&Action> = review.iter().filter(|a| a.risk == risk).collect();
            if items.is_empty() {
                continue;
            }
            lines.push(heading.to_string());
            for a in items {
                lines.push(format!("**{}**: {}", a.title, a.detail));
                if let Some(cmd) = &a.command {
                    lines.push(format!("```bash\n{cmd}\n```"));
                }
                lines.push(String::new());
            }
        }
    }

    Some(lines.join("\n"))
}

/// Write the document to `path`, or remove it when there is nothing to report.
/// Returns whether a document now exists.
pub fn write(
    path: &Path,
    auto_items: &[String],
    review: &[Action],
    now: DateTime<Utc>,
) -> Result<bool> {
    match render(auto_items, review, now) {
        Some(doc) => {
            io::atomic_write(path, doc.as_bytes())?;
            Ok(true)
        }
        None => {
            io::remove_if_exists(path)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap()
    }

    fn action(title: &str, risk: Risk, command: Option<&str>) -> Action {
        Action {
            title: title.to_string(),
            risk,
            detail: "Last used: never".to_string(),
            command: command.map(str::to_string),
        }
    }

    #[test]
    fn renders_sections_by_risk() {
        let doc = render(
            &["combos generated (2 entries)".to_string()],
            &[
                action("Downgrade candidate: `x`", Risk::High, None),
                action("Parking candidate: `y`", Risk::Medium, Some("rm /s/y")),
            ],
            now(),
        )
        .unwrap();

        assert!(doc.starts_with("## Skill catalog review (2026-06-01 09:30 UTC)\n"));
        assert!(doc.contains("### Auto-applied\n- combos generated (2 entries)\n"));
        let medium = doc.find("#### MEDIUM").unwrap();
        let high = doc.find("#### HIGH").unwrap();
        assert!(medium < high);
        assert!(doc.contains("**Parking candidate: `y`**: Last used: never\n```bash\nrm /s/y\n```"));
        assert!(!doc[high..].contains("```"));
    }

    #[test]
    fn auto_only_has_no_review_section() {
        let doc = render(&["done".to_string()], &[], now()).unwrap();
        assert!(!doc.contains("Needs review"));
    }

    #[test]
    fn empty_report_removes_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pending-decisions.md");
        assert!(write(&path, &[], &[action("t", Risk::High, None)], now()).unwrap());
        assert!(path.exists());
        assert!(!write(&path, &[], &[], now()).unwrap());
        assert!(!path.exists());
    }
}
