//! Example: Parse KML to a node tree and navigate it.
//!
//! Run with: cargo run --example tree_parse

use kml_core::tree::{Document, Node};

fn main() {
    let input = br#"<?xml version="1.0" encoding="UTF-8"?>
<MultiGeometry id="campus">
  <!-- main building -->
  <Polygon>
    <outerBoundaryIs>
      <LinearRing>
        <coordinates>
          -122.0848,37.4223,0 -122.0843,37.4223,0
          -122.0843,37.4218,0 -122.0848,37.4218,0
          -122.0848,37.4223,0
        </coordinates>
      </LinearRing>
    </outerBoundaryIs>
  </Polygon>
  <Point targetId="flagpole">
    <coordinates>-122.0845,37.4225,12</coordinates>
  </Point>
</MultiGeometry>
"#;

    let doc = Document::parse(input).expect("parse failed");

    println!("=== Document Tree ===\n");
    for root in doc.roots() {
        print_node(root, 0);
    }

    println!("\n=== Tags ===\n");
    for node in doc.descendants() {
        println!("{:<16} {:?} {}", node.name(), node.tag(), node.span());
    }

    println!("\n=== Geometry ===\n");
    match kml_core::parse(input) {
        Ok(geometry) => println!("{}", geometry),
        Err(e) => println!("error: {}", e),
    }
}

fn print_node(node: Node<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut desc = node.name().to_string();
    for attr in node.attributes() {
        desc.push_str(&format!(" {}={:?}", attr.key, attr.value));
    }
    println!("{}{}", indent, desc);

    for token in node.coordinate_tokens() {
        println!("{}  · {}", indent, token);
    }
    for child in node.children() {
        print_node(child, depth + 1);
    }
}
