//! Device name generation for callers that omit a name.

use rand::seq::SliceRandom;

/// Source of generated device names. Injected into the registry so
/// tests can pin the output.
pub trait NameGenerator: Send + Sync {
    fn generate(&self) -> String;
}

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "clever", "eager", "gentle", "jolly", "keen", "lively", "mighty", "nimble",
    "proud", "swift",
];

const NOUNS: &[&str] = &[
    "badger", "falcon", "heron", "lynx", "marmot", "otter", "panther", "raven", "stoat", "tapir",
    "viper", "wombat",
];

/// Default generator: random adjective-noun pairs, e.g. `swift-otter`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNameGenerator;

impl NameGenerator for RandomNameGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("plain");
        let noun = NOUNS.choose(&mut rng).copied().unwrap_or("device");
        format!("{adjective}-{noun}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_adjective_noun_pairs() {
        let name = RandomNameGenerator.generate();
        let (adjective, noun) = name.split_once('-').expect("name has a dash");
        assert!(ADJECTIVES.contains(&adjective));
        assert!(NOUNS.contains(&noun));
    }
}
