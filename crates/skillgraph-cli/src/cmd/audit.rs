use crate::output::print_json;
use crate::root::Home;
use skillgraph_core::audit::{self, AuditOutcome, AuditReport};

pub fn run(home: &Home, full: bool, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let snap = cache.snapshot();
    let outcome = audit::run(&home.layout, &snap, &home.config, full, chrono::Utc::now());

    if json {
        return print_json(&outcome);
    }

    match outcome {
        AuditOutcome::MissingDocument if full => {
            println!("No workflow document at {}", home.layout.workflow_doc.display());
        }
        AuditOutcome::Checked(report) if full => print_full(&report),
        AuditOutcome::Checked(report) if !report.broken.is_empty() => {
            println!(
                "workflow: {} broken references (see {})",
                report.broken.len(),
                home.layout.issues_path().display()
            );
        }
        _ => {}
    }
    Ok(())
}

fn print_full(report: &AuditReport) {
    let width = 52;
    println!("{}", "=".repeat(width));
    println!("  Workflow audit");
    println!("  generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("{}", "=".repeat(width));

    println!("\nBroken chains");
    if report.broken.is_empty() {
        println!(
            "  all {} flows, {} references resolve",
            report.flows, report.references
        );
    } else {
        for b in &report.broken {
            println!("  x {b}");
        }
    }

    println!("\nActive entries in no workflow");
    if report.unlisted_active.is_empty() {
        println!("  (none)");
    }
    for name in report.unlisted_active.iter().take(10) {
        println!("  - {name}");
    }
    if report.unlisted_active.len() > 10 {
        println!("  ... and {} more", report.unlisted_active.len() - 10);
    }
    println!("{}", "=".repeat(width));
}
