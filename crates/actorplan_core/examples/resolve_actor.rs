//! Example: Resolve an actor and print the import plan.
//!
//! Run with: cargo run --example resolve_actor -- art/actors/units/horse.xml [options.json]

use std::env;
use std::fs;
use std::path::Path;

use actorplan_core::memory::MemoryHost;
use actorplan_core::{ActorImporter, Diagnostic, ImportOptions};
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: resolve_actor <path-to-actor-xml> [options.json]");
        println!("\nExamples:");
        println!("  cargo run --example resolve_actor -- art/actors/units/horse.xml");
        println!("  cargo run --example resolve_actor -- art/actors/units/horse.xml depth1.json");
        return Ok(());
    }

    let options = match args.get(2) {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            ImportOptions::from_json_str(&json).with_context(|| format!("parsing {path}"))?
        }
        None => ImportOptions::default(),
    };

    let path = Path::new(&args[1]);
    println!("Resolving actor: {}", path.display());

    let mut host = MemoryHost::permissive();
    let report = ActorImporter::new(&mut host, options).import(path)?;

    println!("\n=== Bundle: {} ===", report.bundle_root.display());
    println!("Actors: {}", report.actor_count());
    println!("Mesh imports: {}", host.imports().len());
    println!("Scene nodes: {}", host.nodes().count());
    println!("Materials: {}", report.materials.join(", "));

    println!("\n--- Actors ---");
    for instance in report.root.iter() {
        println!(
            "  {}{} at {} - {} nodes, material {}",
            "  ".repeat(instance.depth.max(0) as usize),
            instance.actor.display(),
            instance.attachpoint,
            instance.nodes.len(),
            instance.material.as_deref().unwrap_or("-")
        );
    }

    if !report.diagnostics.is_empty() {
        println!("\n--- Diagnostics ---");
        for diagnostic in &report.diagnostics {
            match diagnostic {
                Diagnostic::UnresolvedAttachment { node, attachpoint, .. } => {
                    println!("  {} has no prop point for {}", node, attachpoint)
                }
                Diagnostic::PropSkipped { actor, reason, .. } => {
                    println!("  skipped prop {}: {}", actor, reason)
                }
                Diagnostic::MeshImportFailed { path, reason } => {
                    println!("  mesh {} failed: {}", path.display(), reason)
                }
                Diagnostic::TextureSkipped { path, reason } => {
                    println!("  texture {} skipped: {}", path.display(), reason)
                }
            }
        }
    }

    println!("\n--- Plan ---");
    println!("{}", report.to_json()?);

    Ok(())
}
