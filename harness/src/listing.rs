use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use synth_model::{Catalog, Encoder, EncodingTable, Kind, NameStyle};

/// One catalog component as listed by the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub token: String,
    pub kind: Kind,
    pub signature: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}  {:<12} {}", self.token, self.kind.to_string(), self.signature)
    }
}

/// Sorted entries for every component, tokens drawn from `table`.
pub fn entries(catalog: &Catalog, table: &mut EncodingTable, style: NameStyle) -> Vec<Entry> {
    catalog
        .sorted()
        .iter()
        .map(|data| {
            let mut e = Encoder::new(table);
            data.encode(&mut e);
            Entry {
                token: e.finish(),
                kind: data.kind,
                signature: data.signature(style),
            }
        })
        .collect()
}

pub fn load_entries(path: &Path, table: &mut EncodingTable, style: NameStyle) -> Result<Vec<Entry>> {
    let catalog = Catalog::load(path).with_context(|| format!("Unable to load catalog {}", path.display()))?;
    Ok(entries(&catalog, table, style))
}

pub fn print(entries: &[Entry]) {
    for entry in entries {
        println!(
            "{:>4}  {:<12} {}",
            entry.token.yellow(),
            entry.kind.to_string().blue(),
            entry.signature
        );
    }
    println!("{} components", entries.len().to_string().bold());
}
