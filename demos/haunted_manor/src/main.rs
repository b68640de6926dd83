//! Haunted Manor Example
//!
//! Demonstrates the fabula engine end to end with a small branching
//! story: component registration, manifest resolution, graph validation,
//! and an event-driven play session with a gated edge.

use fabula_audit::load_story;
use fabula_core::{
    Condition, InventoryAction, InventoryItem, StoryEdge, StoryExecutor, StoryNode, Value,
    ValueMap,
};
use fabula_registry::{
    resolve_manifest, ComponentRegistration, ComponentRegistry, FallbackStrategy, StoryManifest,
};

fn main() {
    println!("=== Fabula Haunted Manor Example ===\n");

    // Register the renderer components this story's nodes use
    let mut registry = ComponentRegistry::new();
    for (component_type, version, binding) in [
        ("text_block", "1.0.0", "renderers/text"),
        ("text_block", "1.2.0", "renderers/text"),
        ("choice_gate", "2.1.0", "renderers/choice"),
        ("end", "1.0.0", "renderers/end"),
    ] {
        registry
            .register(ComponentRegistration::new(component_type, version, binding))
            .unwrap();
    }
    registry.mark_initialized();
    let summary = registry.summary();
    println!(
        "Registered {} components ({} blocks, {} gates, {} other)\n",
        summary.registrations, summary.blocks, summary.gates, summary.other
    );

    // Resolve what the story requires against what is registered
    let manifest = StoryManifest::new("1.0.0")
        .require("text_block", "^1.0.0")
        .require("choice_gate", "^2.0.0")
        .require("end", "^1.0.0");
    let resolution = resolve_manifest(&registry, &manifest, FallbackStrategy::Strict);
    println!("Manifest resolution:");
    for (component_type, version) in &resolution.resolved {
        println!("  {} -> {}", component_type, version);
    }
    println!();

    // Load and validate the story graph
    let nodes = vec![
        StoryNode::new("foyer", "foyer", "text_block")
            .with_data("text", "The manor door slams shut behind you."),
        StoryNode::new("hallway", "hallway", "choice_gate")
            .with_data("prompt", "A door stands at the end of the hall."),
        StoryNode::new("library", "library", "text_block")
            .with_data("text", "A brass key glints on the desk beside a locked hatch."),
        StoryNode::new("cellar", "cellar", "end")
            .with_data("text", "The hatch swings open onto the cellar stairs."),
    ];
    let edges = vec![
        StoryEdge::auto("enter", "foyer", "hallway"),
        StoryEdge::choice("to-library", "hallway", "library").with_label("Try the door"),
        StoryEdge::conditional(
            "open-hatch",
            "library",
            "cellar",
            Condition::all(vec![
                Condition::has_item("brass_key"),
                Condition::equals("hatch_examined", true),
            ]),
        )
        .with_label("Unlock the hatch"),
    ];

    let loaded = load_story(nodes, edges, "foyer", &registry);
    println!("Validation: {}", loaded.report.summary());
    for error in &loaded.report.errors {
        println!("  error: {}", error.message);
    }
    for warning in &loaded.report.warnings {
        println!("  warning: {}", warning.message);
    }
    println!();

    // Play through, watching the event stream
    let mut executor = StoryExecutor::new(loaded.graph);
    executor.subscribe(|event| println!("  [event] {}", event.name()));

    println!("Starting the story...");
    executor.start().unwrap();
    executor.complete_current_node().unwrap();

    println!("\nEntering the library...");
    executor.navigate(&"to-library".into()).unwrap();

    let hatch = "open-hatch".into();
    println!("\nHatch openable yet: {}", executor.can_navigate(&hatch));

    println!("\nTaking the key and examining the hatch...");
    executor.update_inventory(
        InventoryItem::new("brass_key", "Brass Key", 1),
        InventoryAction::Add,
    );
    let mut updates = ValueMap::new();
    updates.insert("hatch_examined".into(), Value::Bool(true));
    executor.update_game_state(updates);

    println!("\nHatch openable now: {}", executor.can_navigate(&hatch));
    executor.navigate(&hatch).unwrap();

    let context = executor.context();
    println!(
        "\nFinished at {:?}",
        context.current_node.as_ref().unwrap().node_key
    );
    println!(
        "Visited {} nodes, made {} choices",
        context.visited.len(),
        context.choice_count
    );
    println!("Complete: {}", executor.is_complete());

    // The host would persist this and restore it next launch
    let session = executor.serialize();
    println!(
        "\nSaved session holds {} visited nodes and {} inventory items",
        session.visited_nodes.len(),
        session.inventory.len()
    );

    println!("\n=== Story Complete ===");
}
