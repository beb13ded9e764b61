use crate::output::{print_json, print_table};
use crate::root::Home;
use skillgraph_core::{stats, usage};

pub fn run(home: &Home, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let snap = cache.snapshot();
    let usage = usage::load(&home.layout.usage_file);
    let stats = stats::collect(
        &snap,
        &usage,
        chrono::Utc::now(),
        home.config.policy.stale_after(),
    );

    if json {
        return print_json(&stats);
    }

    println!("{} entries, {} active\n", stats.total, stats.active);
    let rows = stats
        .distribution
        .iter()
        .map(|r| {
            vec![
                r.rank.to_string(),
                r.active.to_string(),
                r.parked.to_string(),
            ]
        })
        .collect();
    print_table(&["RANK", "ACTIVE", "PARKED"], rows);

    let days = home.config.policy.stale_days;
    println!("\nUnused for over {days} days ({}):", stats.long_unused.len());
    for e in &stats.long_unused {
        println!("  {} [{}] last used: {}", e.name, e.rank, e.last_used_label());
    }
    println!(
        "\nDowngrade candidates ({}):",
        stats.downgrade_candidates.len()
    );
    for e in &stats.downgrade_candidates {
        println!("  {} [{} → {}]", e.name, e.rank, e.rank.downgraded());
    }
    Ok(())
}
