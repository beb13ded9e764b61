use crate::output::print_json;
use crate::root::Home;
use skillgraph_core::suggest::{self, SuggestOutcome};

pub fn run(home: &Home, entry: &str, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let snap = cache.snapshot();
    let outcome = suggest::suggest(&home.layout, &snap, entry);

    if json {
        return print_json(&outcome);
    }

    // Silent unless there is something new to show
    if let SuggestOutcome::Show(list) = outcome {
        println!("combos for {}:", entry.trim());
        for s in list {
            let mark = if s.active { "" } else { "  (inactive)" };
            println!("    {}{mark}", s.name);
        }
    }
    Ok(())
}
