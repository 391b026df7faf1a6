//! Hook results returned by behavior modules.

/// Overrides a handling hook may apply to the acknowledgment step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerResult {
    /// `Some(text)` replaces the reaction; `Some("")` sends none; `None` keeps it.
    pub reaction: Option<String>,
    /// `Some(true)` skips the pacing delay.
    pub immediate: Option<bool>,
}

impl HandlerResult {
    pub fn reaction(reaction: impl Into<String>) -> Self {
        Self {
            reaction: Some(reaction.into()),
            immediate: None,
        }
    }

    /// Handled, but leave the note without a reaction.
    pub fn no_reaction() -> Self {
        Self::reaction("")
    }

    pub fn immediate(mut self) -> Self {
        self.immediate = Some(true);
        self
    }
}

/// What a mention hook or context hook made of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Not for this hook. A context hook falls through to the mention
    /// hooks; in the mention chain the next hook is tried.
    Pass,
    /// Handled with default acknowledgment.
    Handled,
    /// Handled with acknowledgment overrides.
    Respond(HandlerResult),
}

impl HookOutcome {
    /// Whether this outcome ends the mention-hook chain.
    pub fn is_definitive(&self) -> bool {
        !matches!(self, HookOutcome::Pass)
    }
}

impl From<bool> for HookOutcome {
    fn from(handled: bool) -> Self {
        if handled {
            HookOutcome::Handled
        } else {
            HookOutcome::Pass
        }
    }
}

impl From<HandlerResult> for HookOutcome {
    fn from(result: HandlerResult) -> Self {
        HookOutcome::Respond(result)
    }
}
