use crate::output::{join_or_none, print_json};
use crate::root::Home;
use clap::Subcommand;
use skillgraph_core::config::WarnLevel;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration and resolved paths
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(home: &Home, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(home, json),
        ConfigSubcommand::Validate => validate(home, json),
    }
}

fn show(home: &Home, json: bool) -> anyhow::Result<()> {
    let layout = &home.layout;
    if json {
        let value = serde_json::json!({
            "home": home.path,
            "config": home.config,
            "paths": {
                "pool": layout.pool_dir,
                "active": layout.active_dir,
                "descriptors": layout.descriptor_root(),
                "session": layout.session_dir,
                "workflow": layout.workflow_doc,
                "usage": layout.usage_file,
            },
        });
        return print_json(&value);
    }

    let policy = &home.config.policy;
    println!("home:              {}", home.path.display());
    println!("pool:              {}", layout.pool_dir.display());
    println!("active:            {}", layout.active_dir.display());
    println!("descriptors:       {}", layout.descriptor_root().display());
    println!("session:           {}", layout.session_dir.display());
    println!("workflow doc:      {}", layout.workflow_doc.display());
    println!("workflow section:  {}", home.config.workflow.section);
    println!("workflow ignore:   {}", join_or_none(&home.config.workflow.ignore));
    println!("usage:             {}", layout.usage_file.display());
    println!("cache ttl:         {}s", home.config.cache.ttl_secs);
    println!("stale after:       {} days", policy.stale_days);
    println!("max parking:       {}", policy.max_parking);
    println!("max downgrade:     {}", policy.max_downgrade);
    println!("max combos:        {}", policy.max_combos);
    println!("combos timeout:    {}s", policy.combos_timeout_secs);
    Ok(())
}

fn validate(home: &Home, json: bool) -> anyhow::Result<()> {
    let warnings = home.config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
