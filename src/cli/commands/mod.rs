pub mod config;
pub mod detect;
pub mod lot;
pub mod system;
pub mod vehicle;

use crate::cli::registry::CommandRegistry;

/// Registers every shell command in the order `help` lists them.
pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let definitions = vehicle::definitions()
        .into_iter()
        .chain(lot::definitions())
        .chain(detect::definitions())
        .chain(config::definitions())
        .chain(system::definitions());
    for entry in definitions {
        registry.register(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_is_registered_once() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        let names: Vec<_> = registry.names().collect();
        for expected in [
            "entry", "exit", "find", "vehicles", "rates", "layout", "analytics", "detect",
            "accuracy", "config", "help", "version", "quit",
        ] {
            assert!(names.contains(&expected), "missing `{expected}`");
        }
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }
}
