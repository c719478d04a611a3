use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::models::scan_result::ScanResult;

pub fn export_markdown(
    results: &[ScanResult],
    generated_at: DateTime<Utc>,
    output_path: &Path,
) -> anyhow::Result<()> {
    std::fs::write(output_path, render_markdown(results, generated_at)?)?;
    Ok(())
}

pub fn render_markdown(
    results: &[ScanResult],
    generated_at: DateTime<Utc>,
) -> Result<String, std::fmt::Error> {
    let mut md = String::new();

    writeln!(md, "# Stale File Report")?;
    writeln!(md)?;
    writeln!(md, "- **Generated:** {}", generated_at.to_rfc3339())?;
    writeln!(md, "- **Directories:** {}", results.len())?;
    writeln!(
        md,
        "- **Failed:** {}",
        results.iter().filter(|r| !r.is_ok()).count()
    )?;
    writeln!(md)?;

    writeln!(md, "| Path | Interval | Cutoff | Stale | Status |")?;
    writeln!(md, "|------|----------|--------|-------|--------|")?;
    for result in results {
        let cutoff = result
            .cutoff
            .map(|c| c.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            md,
            "| {} | {} | {} | {} | {} |",
            escape_cell(&result.path.display().to_string()),
            escape_cell(&result.interval),
            cutoff,
            result.stale_count,
            result.status,
        )?;
    }

    let failures: Vec<&ScanResult> = results.iter().filter(|r| r.error.is_some()).collect();
    if !failures.is_empty() {
        writeln!(md)?;
        writeln!(md, "## Errors ({} total)", failures.len())?;
        writeln!(md)?;
        for result in failures {
            writeln!(
                md,
                "- **{}**: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or_default()
            )?;
        }
    }

    Ok(md)
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scan_result::{ScanRequest, ScanStatus};

    #[test]
    fn test_render_markdown() {
        let now = Utc::now();
        let results = vec![
            ScanResult::ok(&ScanRequest::new("/in", "3d"), now, 4),
            ScanResult::failed(
                &ScanRequest::new("/a|b", "bogus"),
                None,
                ScanStatus::InvalidInterval,
                "bad interval",
            ),
        ];

        let md = render_markdown(&results, now).unwrap();
        assert!(md.contains("- **Directories:** 2"));
        assert!(md.contains("- **Failed:** 1"));
        assert!(md.contains("| /in | 3d |"));
        assert!(md.contains("| 4 | ok |"));
        assert!(md.contains("| /a\\|b | bogus | - | -1 | invalid interval |"));
        assert!(md.contains("## Errors (1 total)"));
    }
}
