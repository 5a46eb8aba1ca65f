// Document assembly
//
// Concatenates cached entity fragments between the header and footer.
// Assembly is best-effort: a missing or unreadable fragment is skipped.

use crate::cache::FragmentCache;
use crate::render::entry_key;
use std::collections::HashSet;
use tracing::warn;

/// Build the dictionary source document.
///
/// `entities` are full names in the order they should appear; a name that
/// repeats (ignoring case) is included only at its first position.
pub fn assemble(header: &str, entities: &[String], cache: &FragmentCache, footer: &str) -> String {
    let mut out = String::from(header);
    ensure_newline(&mut out);

    let mut seen = HashSet::new();
    for name in entities {
        if !seen.insert(name.to_lowercase()) {
            continue;
        }

        let key = entry_key(name);
        match cache.get(&key) {
            Ok(fragment) => {
                out.push_str(fragment.as_str());
                ensure_newline(&mut out);
            }
            Err(e) => warn!(
                "Skipping: couldn't read: {}: {}",
                cache.dir().join(format!("{}.xml", key)).display(),
                e
            ),
        }
    }

    out.push_str(footer);
    ensure_newline(&mut out);
    out
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
