use crate::output::print_json;
use crate::root::Home;
use anyhow::Context;
use skillgraph_core::{io, skillmap};
use std::path::Path;

pub fn run(home: &Home, output: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let cache = home.cache();
    let snap = cache.snapshot();

    if json {
        return print_json(&skillmap::stats(&snap));
    }

    let doc = skillmap::render_document(&snap, chrono::Local::now().date_naive());
    let Some(path) = output else {
        print!("{doc}");
        return Ok(());
    };

    io::atomic_write(path, doc.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    let st = skillmap::stats(&snap);
    println!("Wrote {}", path.display());
    println!(
        "{} entries, {} active, {} cross-references",
        st.total, st.active, st.edges
    );
    Ok(())
}
