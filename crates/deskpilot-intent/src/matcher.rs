//! Free-text command matching.
//!
//! Resolution order for a phrase:
//!
//! 1. **Pointer phrase** -- `click at 200, 300`, `double-click at (5 5)`.
//! 2. **Exact trigger** -- O(1) map lookup on the normalized phrase.
//! 3. **Substring trigger** -- Aho-Corasick over every trigger; the lowest
//!    registration index among the triggers found in the phrase wins.
//! 4. **Fuzzy trigger** -- best Levenshtein similarity, accepted only above
//!    [`FUZZY_THRESHOLD`].

use std::collections::HashMap;

use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::commands::{CommandAction, CommandDescriptor, PointerKind, builtin_commands};
use crate::similarity::similarity;

/// Similarity a fuzzy candidate must strictly exceed.
pub const FUZZY_THRESHOLD: f64 = 0.70;

const POINTER_PATTERN: &str =
    r"(?i)^(?P<verb>click|double[- ]?click|right[- ]?click) at \(?(?P<x>[0-9]+)[, ]+(?P<y>[0-9]+)\)?$";

/// How a phrase was matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "tier")]
pub enum MatchTier {
    Pointer,
    Exact,
    Substring,
    Fuzzy { similarity: f64 },
}

/// A descriptor selected for a phrase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCommand {
    pub descriptor: CommandDescriptor,
    pub tier: MatchTier,
}

/// Read-only index over a command catalogue.
pub struct CommandMatcher {
    commands: Vec<CommandDescriptor>,
    /// Normalized trigger -> first descriptor registering it.
    exact: HashMap<String, usize>,
    /// Flattened `(descriptor index, trigger)` pairs in registration order.
    triggers: Vec<(usize, String)>,
    automaton: Option<AhoCorasick>,
    pointer: Option<Regex>,
}

impl CommandMatcher {
    /// Index `commands`; earlier descriptors win every tie.
    pub fn new(commands: Vec<CommandDescriptor>) -> Self {
        let mut exact = HashMap::new();
        let mut triggers = Vec::new();
        for (idx, command) in commands.iter().enumerate() {
            for trigger in &command.triggers {
                let normalized = normalize(trigger);
                if normalized.is_empty() {
                    continue;
                }
                exact.entry(normalized.clone()).or_insert(idx);
                triggers.push((idx, normalized));
            }
        }

        let automaton = if triggers.is_empty() {
            None
        } else {
            match AhoCorasick::new(triggers.iter().map(|(_, t)| t.as_str())) {
                Ok(ac) => Some(ac),
                Err(e) => {
                    error!(error = %e, "failed to build trigger automaton");
                    None
                }
            }
        };

        let pointer = match Regex::new(POINTER_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                error!(error = %e, "invalid pointer command pattern");
                None
            }
        };

        trace!(
            commands = commands.len(),
            triggers = triggers.len(),
            "command matcher built"
        );

        Self {
            commands,
            exact,
            triggers,
            automaton,
            pointer,
        }
    }

    /// Matcher over [`builtin_commands`].
    pub fn builtin() -> Self {
        Self::new(builtin_commands())
    }

    /// The indexed catalogue, in registration order.
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Resolve a phrase, or `None` when nothing matches.
    pub fn resolve(&self, phrase: &str) -> Option<ResolvedCommand> {
        if let Some(resolved) = self.match_pointer(phrase.trim()) {
            return Some(resolved);
        }

        let normalized = normalize(phrase);
        if normalized.is_empty() {
            return None;
        }

        let resolved = self
            .match_exact(&normalized)
            .or_else(|| self.match_substring(&normalized))
            .or_else(|| self.match_fuzzy(&normalized));

        match &resolved {
            Some(r) => debug!(
                phrase = %normalized,
                command = %r.descriptor.description,
                tier = ?r.tier,
                "command matched"
            ),
            None => debug!(phrase = %normalized, "no command matched"),
        }
        resolved
    }

    // -- Tiers --------------------------------------------------------------

    fn match_pointer(&self, phrase: &str) -> Option<ResolvedCommand> {
        let caps = self.pointer.as_ref()?.captures(phrase)?;
        let pointer = PointerKind::from_verb(caps.name("verb")?.as_str())?;
        let x = caps.name("x")?.as_str().parse().ok()?;
        let y = caps.name("y")?.as_str().parse().ok()?;

        Some(ResolvedCommand {
            descriptor: CommandDescriptor {
                triggers: Vec::new(),
                action: CommandAction::Pointer { pointer, x, y },
                description: format!("{pointer} at ({x}, {y})"),
            },
            tier: MatchTier::Pointer,
        })
    }

    fn match_exact(&self, normalized: &str) -> Option<ResolvedCommand> {
        let idx = *self.exact.get(normalized)?;
        Some(self.resolved(idx, MatchTier::Exact))
    }

    fn match_substring(&self, normalized: &str) -> Option<ResolvedCommand> {
        let ac = self.automaton.as_ref()?;
        // Pattern ids follow registration order, so the smallest id found
        // anywhere in the phrase belongs to the earliest descriptor.
        let first = ac
            .find_overlapping_iter(normalized)
            .map(|mat| mat.pattern().as_usize())
            .min()?;
        let (idx, _) = self.triggers.get(first)?;
        Some(self.resolved(*idx, MatchTier::Substring))
    }

    fn match_fuzzy(&self, normalized: &str) -> Option<ResolvedCommand> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, trigger) in &self.triggers {
            let score = similarity(normalized, trigger);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((*idx, score));
            }
        }

        let (idx, score) = best?;
        if score > FUZZY_THRESHOLD {
            Some(self.resolved(idx, MatchTier::Fuzzy { similarity: score }))
        } else {
            trace!(phrase = %normalized, best = score, "fuzzy candidate below threshold");
            None
        }
    }

    fn resolved(&self, idx: usize, tier: MatchTier) -> ResolvedCommand {
        ResolvedCommand {
            descriptor: self.commands[idx].clone(),
            tier,
        }
    }
}

impl Default for CommandMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for CommandMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandMatcher")
            .field("commands", &self.commands.len())
            .field("triggers", &self.triggers.len())
            .finish()
    }
}

fn normalize(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}
