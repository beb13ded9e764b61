use crate::output::{join_or_none, print_json};
use crate::root::Home;
use skillgraph_core::{
    orchestrator::{self, RunOptions, RunReport},
    runner::{ComboGenerator, InProcessGenerator, SubprocessGenerator},
    types::Risk,
};

pub fn run(home: &Home, full: bool, in_process: bool, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let opts = RunOptions {
        full,
        now: chrono::Utc::now(),
    };

    let subprocess = if in_process {
        None
    } else {
        self_generator(home)
    };
    let in_proc = InProcessGenerator::new(&cache, &home.config);
    let generator: &dyn ComboGenerator = match &subprocess {
        Some(g) => g,
        None => &in_proc,
    };

    let report = orchestrator::run(&cache, &home.config, generator, &opts);

    if json {
        print_json(&report)?;
    } else if full {
        print_full(home, &report);
    } else {
        print_summary(home, &report);
    }
    Ok(())
}

/// Re-invoke this binary as `skillgraph --home <home> combos` under the policy
/// timeout.
fn self_generator(home: &Home) -> Option<SubprocessGenerator> {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            tracing::warn!("cannot locate own executable ({e}); generating in-process");
            return None;
        }
    };
    let args = vec![
        "--home".to_string(),
        home.path.display().to_string(),
        "combos".to_string(),
    ];
    Some(SubprocessGenerator::new(
        exe,
        args,
        home.config.policy.combos_timeout(),
    ))
}

fn print_summary(home: &Home, report: &RunReport) {
    if !report.auto_items.is_empty() {
        println!("auto-applied: {}", report.auto_items.join(", "));
    }
    if report.review.is_empty() || report.suppressed {
        return;
    }
    let mut parts = Vec::new();
    let medium = report.count(Risk::Medium);
    let high = report.count(Risk::High);
    if medium > 0 {
        parts.push(format!("{medium} MEDIUM"));
    }
    if high > 0 {
        parts.push(format!("{high} HIGH"));
    }
    println!(
        "needs review: {} (see {})",
        parts.join(", "),
        home.layout.review_path().display()
    );
}

fn print_full(home: &Home, report: &RunReport) {
    let width = 52;
    println!("{}", "=".repeat(width));
    println!("  Skill catalog report");
    println!("  generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("{}", "=".repeat(width));

    println!("\nAuto-applied (LOW)");
    println!("  {}", join_or_none(&report.auto_items));
    if !report.not_applied.is_empty() {
        println!("\nNot applied");
        for item in &report.not_applied {
            println!("  {item}");
        }
    }

    for risk in [Risk::Medium, Risk::High] {
        let items: Vec<_> = report.review.iter().filter(|a| a.risk == risk).collect();
        println!("\nNeeds review: {risk} ({})", items.len());
        if items.is_empty() {
            println!("  (none)");
        }
        for a in items {
            println!("  {}", a.title);
            println!("    {}", a.detail);
            if risk == Risk::Medium {
                if let Some(first) = a.command.as_deref().and_then(|c| c.lines().next()) {
                    println!("    → {first}");
                }
            }
        }
    }

    println!("\nSignals");
    println!("  undefined combos: {}", report.undefined_combos.len());
    println!(
        "  unused for over {} days: {}",
        home.config.policy.stale_days,
        report.stale.len()
    );
    println!("{}", "=".repeat(width));
}
