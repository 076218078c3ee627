//! Example: Parse KML from stdin and print the geometry.
//!
//! Run with: RUST_LOG=kml_core=trace cargo run --example stdin_parse < point.kml

use std::io::Read;
use std::process::ExitCode;

use kml_core::Parser;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("failed to read stdin: {}", e);
        return ExitCode::FAILURE;
    }

    let (result, report) = Parser::default().parse_with_report(&input);
    eprintln!(
        "arena: {} nodes, {} attributes, {} coordinates registered",
        report.nodes.registered, report.attributes.registered, report.coordinates.registered
    );

    match result {
        Ok(geometry) => {
            println!("{}", geometry.to_ewkt());
            if let Some(bbox) = geometry.bounding_box() {
                println!(
                    "bbox: ({} {}) - ({} {})",
                    bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(span) = e.span() {
                let end = (span.end as usize).min(input.len());
                let start = (span.start as usize).min(end);
                eprintln!("  --> {:?}", String::from_utf8_lossy(&input[start..end]));
            }
            ExitCode::FAILURE
        }
    }
}
