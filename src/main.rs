//! prefstack: merge layered pref()/user_pref() overlays into one preference set.

use anyhow::Result;

fn main() -> Result<()> {
    prefstack::cli::run()
}
