use crate::output::{print_json, print_table};
use crate::root::Home;
use skillgraph_core::{ranks, usage};

pub fn run(home: &Home, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let usage = usage::load(&home.layout.usage_file);
    let report = ranks::update_ranks(&cache, &usage, dry_run);

    if json {
        return print_json(&report);
    }

    if report.upgraded.is_empty() {
        println!("No promotions.");
    } else {
        let rows = report
            .upgraded
            .iter()
            .map(|u| {
                vec![
                    u.name.clone(),
                    u.from.to_string(),
                    u.to.to_string(),
                    u.count.to_string(),
                ]
            })
            .collect();
        print_table(&["ENTRY", "FROM", "TO", "USES"], rows);
    }
    if !report.skipped.is_empty() {
        println!("\nSkipped ({}):", report.skipped.len());
        for s in &report.skipped {
            println!("  - {s}");
        }
    }
    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for e in &report.errors {
            println!("  ! {e}");
        }
    }
    Ok(())
}
