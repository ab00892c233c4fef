//! Signal listing command implementation.

use impetu_signals::SignalCategory;
use impetu_signals::registry::signals_by_category;

/// List the signals that feed the score, optionally filtered by category.
pub(crate) fn list_signals(category: Option<String>, verbose: bool) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Signals                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let categories = [
        (SignalCategory::Momentum, "Momentum"),
        (SignalCategory::Risk, "Risk"),
        (SignalCategory::Technical, "Technical"),
        (SignalCategory::Growth, "Growth"),
        (SignalCategory::Leverage, "Leverage"),
        (SignalCategory::Value, "Value"),
    ];

    for (cat, cat_name) in categories {
        if let Some(ref filter) = category
            && !cat_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let signals = signals_by_category(&cat);
        if signals.is_empty() {
            continue;
        }

        println!("{cat_name}:");
        println!("{}", "-".repeat(60));

        for signal in signals {
            if verbose {
                let scope = if signal.per_horizon { "per horizon" } else { "per instrument" };
                let source = if signal.requires_fundamentals { "fundamentals" } else { "prices" };
                let direction = if signal.higher_is_better { "higher" } else { "lower" };
                println!(
                    "  {:16} - {} ({scope}, {source}, {direction} is better)",
                    signal.name, signal.description
                );
            } else {
                println!("  {}", signal.name);
            }
        }
        println!("  {}\n", cat.description());
    }

    if !verbose {
        println!("Use --verbose for detailed signal descriptions.\n");
    }
}
