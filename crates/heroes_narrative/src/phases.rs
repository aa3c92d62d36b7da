//! The ten narrative phases of an issue.

/// Placeholder replaced by the hero's name.
pub const HERO_TOKEN: &str = "{HERO}";

/// Placeholder replaced by the co-star's name.
pub const COSTAR_TOKEN: &str = "{COSTAR}";

/// One step of the issue's dramatic arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativePhase {
    /// Phase name, e.g. "INCITING INCIDENT"
    pub name: &'static str,
    /// Instruction with `{HERO}`/`{COSTAR}` tokens
    pub instruction: &'static str,
}

impl NarrativePhase {
    /// Instruction with character names substituted.
    pub fn render(&self, hero: &str, costar: &str) -> String {
        self.instruction
            .replace(HERO_TOKEN, hero)
            .replace(COSTAR_TOKEN, costar)
    }
}

/// The ten story phases, one per story page.
pub const PHASES: [NarrativePhase; 10] = [
    NarrativePhase {
        name: "INCITING INCIDENT",
        instruction: "Shatter {HERO}'s ordinary world with an event that cannot be ignored.",
    },
    NarrativePhase {
        name: "REFUSAL AND RESOLVE",
        instruction: "{HERO} hesitates and weighs what is at stake, then commits.",
    },
    NarrativePhase {
        name: "CROSSING THE THRESHOLD",
        instruction: "{HERO} steps into the unknown and the rules of the story change.",
    },
    NarrativePhase {
        name: "ALLIES AND RIVALS",
        instruction: "Test {HERO} against new faces; give {COSTAR} a chance to prove their worth.",
    },
    NarrativePhase {
        name: "RISING ACTION",
        instruction: "Raise the pressure on {HERO}; every victory costs something.",
    },
    NarrativePhase {
        name: "MIDPOINT TWIST",
        instruction: "Reveal something that reframes what {HERO} believed.",
    },
    NarrativePhase {
        name: "COMPLICATION",
        instruction: "Plans fall apart and the bond between {HERO} and {COSTAR} is strained.",
    },
    NarrativePhase {
        name: "DARKEST HOUR",
        instruction: "{HERO} loses what mattered most and doubts the path.",
    },
    NarrativePhase {
        name: "FINAL PUSH",
        instruction: "{HERO} rallies, drawing on the consequences of earlier choices.",
    },
    NarrativePhase {
        name: "CLIMAX",
        instruction: "{HERO} confronts the central conflict head-on; the outcome hinges on their values.",
    },
];

/// Phase for a story page number; out-of-range pages clamp to the nearest phase.
///
/// # Examples
///
/// ```
/// use heroes_narrative::phase_for_page;
///
/// assert_eq!(phase_for_page(1).name, "INCITING INCIDENT");
/// assert_eq!(phase_for_page(10).name, "CLIMAX");
/// assert_eq!(phase_for_page(0).name, "INCITING INCIDENT");
/// assert_eq!(phase_for_page(42).name, "CLIMAX");
/// ```
pub fn phase_for_page(page: u32) -> &'static NarrativePhase {
    let index = (page.max(1) as usize - 1).min(PHASES.len() - 1);
    &PHASES[index]
}
