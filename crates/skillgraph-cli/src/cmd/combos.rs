use crate::output::{print_json, print_table};
use crate::root::Home;
use skillgraph_core::combos::{self, ComboReport};

pub fn run(home: &Home, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let report = combos::generate(&cache, &home.config, dry_run);

    if json {
        print_json(&report)?;
        return finish(&report);
    }

    println!(
        "{} flows ({} rows skipped), {} entries, {} with candidates",
        report.flows, report.skipped_rows, report.known, report.with_candidates
    );
    if !report.updated.is_empty() {
        let rows = report
            .updated
            .iter()
            .map(|name| {
                let list = report.combos.get(name).cloned().unwrap_or_default();
                vec![name.clone(), list.join(", ")]
            })
            .collect();
        print_table(&["ENTRY", "COMBOS"], rows);
    }
    let verb = if dry_run { "would update" } else { "updated" };
    println!(
        "{verb}: {}, unchanged: {}, failed: {}",
        report.updated.len(),
        report.unchanged,
        report.failed.len()
    );
    finish(&report)
}

/// A non-zero exit tells `orchestrate` that nothing was applied.
fn finish(report: &ComboReport) -> anyhow::Result<()> {
    if report.all_failed() {
        anyhow::bail!("no descriptor could be written: {}", report.failed.join(", "));
    }
    Ok(())
}
