//! The cache inspection command

use crate::cache::CacheLocator;
use crate::cli::args::{CacheArgs, CacheCommands};
use crate::config::Config;
use crate::error::CapstanResult;
use crate::package::{LocalPackage, ARTIFACT_EXTENSION};
use std::fs;
use std::path::Path;

pub fn cache(args: CacheArgs, config: &Config) -> CapstanResult<()> {
    match args.command {
        CacheCommands::List {
            feed_id,
            cache_root,
        } => {
            let locator = match cache_root {
                Some(root) => CacheLocator::with_root(root),
                None => CacheLocator::new(config)?,
            };
            let root = locator.root(feed_id.as_deref());
            list(&root);
            Ok(())
        }
    }
}

fn list(root: &Path) {
    if !root.exists() {
        println!("Cache is empty ({})", root.display());
        return;
    }

    let mut entries = Vec::new();
    collect(root, &mut entries);
    if entries.is_empty() {
        println!("Cache is empty ({})", root.display());
        return;
    }

    entries.sort();
    for path in entries {
        // Unreadable entries are listed as such rather than hidden;
        // they may be mid-write or corrupt
        match LocalPackage::open(&path) {
            Ok(package) => {
                let manifest = package.manifest();
                println!("{} {}\t{}", manifest.id, manifest.version, path.display());
            }
            Err(_) => println!("<unreadable>\t{}", path.display()),
        }
    }
}

fn collect(dir: &Path, out: &mut Vec<std::path::PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
        {
            out.push(path);
        }
    }
}
