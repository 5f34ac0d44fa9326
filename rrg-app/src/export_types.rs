use std::{borrow::Cow, path::PathBuf};

use anyhow::anyhow;
use rrg_app_lib::mk_specta;
use specta_typescript::Typescript;

/// Where the frontend loads its bindings from, relative to this crate
const DEFAULT_BINDINGS: &str = "../frontend/bindings.ts";

pub fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_BINDINGS), PathBuf::from);

    let mut lang = Typescript::new();
    lang.header = Cow::Borrowed("/* eslint @typescript-eslint/no-unused-vars: 0 */");

    mk_specta()
        .export(lang, &path)
        .map_err(|why| anyhow!("Failed to export bindings to {}: {why}", path.display()))?;
    println!("Exported location commands and events to {}", path.display());
    Ok(())
}
