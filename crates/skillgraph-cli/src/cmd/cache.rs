use crate::output::print_json;
use crate::root::Home;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum CacheSubcommand {
    /// Show the current snapshot (loading or rebuilding it as needed)
    Show,

    /// Delete the persisted snapshot so the next access rescans
    Invalidate,
}

pub fn run(home: &Home, subcmd: CacheSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CacheSubcommand::Show => show(home, json),
        CacheSubcommand::Invalidate => invalidate(home, json),
    }
}

fn show(home: &Home, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let snap = cache.snapshot();
    if json {
        return print_json(&*snap);
    }

    let built = chrono::DateTime::from_timestamp(snap.ts, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| snap.ts.to_string());
    let with_combos = snap.meta.values().filter(|m| m.has_combos).count();
    println!("snapshot: {}", home.layout.snapshot_path().display());
    println!("built:    {built}");
    println!("ttl:      {}s", home.config.cache.ttl_secs);
    println!("active:   {}", snap.active.len());
    println!("entries:  {} ({with_combos} with combos)", snap.meta.len());
    println!("linked:   {} entries cite others", snap.cross_refs.len());
    Ok(())
}

fn invalidate(home: &Home, json: bool) -> anyhow::Result<()> {
    let path = home.layout.snapshot_path();
    let existed = path.exists();
    home.cache().invalidate();
    if json {
        print_json(&serde_json::json!({ "invalidated": existed }))?;
    } else if existed {
        println!("Removed {}", path.display());
    } else {
        println!("No snapshot to remove.");
    }
    Ok(())
}
