/// Diagnostic tool to verify dataset → tree → layout pipeline
use std::path::PathBuf;

use treemap_flip::config::EngineConfig;
use treemap_flip::data::{self, Dataset};
use treemap_flip::layout::{compute_layout, Canvas};
use treemap_flip::normalize::{normalize_set, EntityKind};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("treemap_flip=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let source = args.next().map(PathBuf::from);
    let width: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1280.0);
    let height: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(720.0);
    let config = EngineConfig::default();

    println!("=== DIAGNOSTIC: Dataset → Tree → Layout Pipeline ===");

    // Load
    let entities = match &source {
        Some(path) => {
            println!("Loading: {}", path.display());
            let raw = data::load_raw(path)?;
            println!("\n[1] Parsed {} raw records", raw.len());
            let set = normalize_set(&raw, EntityKind::Country, config.topic_limit);
            for error in &set.skipped {
                println!("    skipped: {}", error);
            }
            set.entities
        }
        None => {
            println!("No dataset given, using built-in samples");
            let dataset = Dataset::builtin(config.topic_limit);
            println!("\n[1] Built-in samples: {} states, {} countries", dataset.states.len(), dataset.countries.len());
            dataset.states.into_iter().chain(dataset.countries).collect()
        }
    };
    println!("\n[2] Normalized {} entities", entities.len());

    let canvas = Canvas::clamped(width, height, &config.layout);
    println!("\n[3] Canvas {}x{} (requested {}x{})", canvas.width, canvas.height, width, height);

    let mut anomalies = 0usize;
    for entity in &entities {
        let tree = entity.tree();
        let leaves = compute_layout(&tree, width, height, &config.layout);
        println!(
            "\n[{}] '{}' facet={} leaves={} total={:.2}",
            entity.code,
            entity.title,
            entity.preferred_facet().name(),
            tree.len(),
            tree.total()
        );

        for (i, leaf) in leaves.iter().take(10).enumerate() {
            println!(
                "    [{}] '{}' - rect: {:.0}x{:.0} at ({:.0}, {:.0}) - {:.1}%",
                i,
                leaf.name,
                leaf.rect.width(),
                leaf.rect.height(),
                leaf.rect.x0,
                leaf.rect.y0,
                leaf.pct * 100.0
            );
        }

        // Check for anomalies
        let pct_sum: f64 = leaves.iter().map(|l| l.pct).sum();
        if (pct_sum - 1.0).abs() > 1e-6 {
            println!("    ! pct sum {:.6}", pct_sum);
            anomalies += 1;
        }
        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                if a.rect.overlaps(&b.rect) {
                    println!("    ! '{}' overlaps '{}'", a.name, b.name);
                    anomalies += 1;
                }
            }
            if a.rect.x1 > canvas.width || a.rect.y1 > canvas.height || a.rect.x0 < 0.0 || a.rect.y0 < 0.0 {
                println!("    ! '{}' leaves the canvas", a.name);
                anomalies += 1;
            }
        }
        let area: f32 = leaves.iter().map(|l| l.rect.area()).sum();
        println!("    Coverage: {:.1}% (padding {})", area / canvas.area() * 100.0, config.layout.padding);
    }

    println!("\n[4] Anomalies: {}", anomalies);
    Ok(())
}
