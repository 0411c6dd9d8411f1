use anyhow::Result;

use waqf_core::{Entity, MutationAction};
use waqf_query::{InvalidationRules, MutationEvent};

pub fn run(entity: &str, action: &str) -> Result<()> {
    let entity: Entity = entity.parse()?;
    let action: MutationAction = action.parse()?;
    let event = MutationEvent::new(entity, action);
    let rules = InvalidationRules::default();

    if !rules.has_rule(&event) {
        println!("No explicit rule for {event}; invalidating its own collection.");
    }
    println!("{event} invalidates:");
    for prefix in rules.prefixes_for(&event) {
        println!("  {prefix}");
    }
    Ok(())
}
