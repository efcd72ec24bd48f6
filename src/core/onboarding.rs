//! The three-step wizard that collects a [`Profile`] before chat begins.
//!
//! Values typed at each step are buffered here and only committed into a
//! `Profile` by [`Onboarding::complete`]. Moving back never discards what was
//! already entered.

use super::profile::{parse_age, validate_name, Interests, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    NameEntry,
    AgeEntry,
    InterestEntry,
    Complete,
}

impl OnboardingStep {
    /// One-based position for "step n of 3" style indicators.
    pub fn ordinal(self) -> usize {
        match self {
            OnboardingStep::NameEntry => 1,
            OnboardingStep::AgeEntry => 2,
            OnboardingStep::InterestEntry | OnboardingStep::Complete => 3,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            OnboardingStep::NameEntry => "Qual é o seu nome?",
            OnboardingStep::AgeEntry => "Qual é a sua idade?",
            OnboardingStep::InterestEntry => "Quais são seus interesses para hoje?",
            OnboardingStep::Complete => "Tudo pronto!",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Onboarding {
    step: OnboardingStep,
    name: String,
    age: String,
    pending_interest: String,
    interests: Interests,
}

impl Default for Onboarding {
    fn default() -> Self {
        Self::new()
    }
}

impl Onboarding {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::NameEntry,
            name: String::new(),
            age: String::new(),
            pending_interest: String::new(),
            interests: Interests::new(),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn pending_interest(&self) -> &str {
        &self.pending_interest
    }

    pub fn interests(&self) -> &Interests {
        &self.interests
    }

    /// The buffer edited by the current step's text field.
    pub fn current_input(&self) -> &str {
        match self.step {
            OnboardingStep::NameEntry => &self.name,
            OnboardingStep::AgeEntry => &self.age,
            OnboardingStep::InterestEntry | OnboardingStep::Complete => &self.pending_interest,
        }
    }

    pub fn set_current_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.step {
            OnboardingStep::NameEntry => self.name = text,
            OnboardingStep::AgeEntry => self.age = text,
            OnboardingStep::InterestEntry => self.pending_interest = text,
            OnboardingStep::Complete => {}
        }
    }

    /// Whether the advancing control for the current step should be enabled.
    pub fn can_advance(&self) -> bool {
        match self.step {
            OnboardingStep::NameEntry => validate_name(&self.name).is_some(),
            OnboardingStep::AgeEntry => parse_age(&self.age).is_some(),
            OnboardingStep::InterestEntry => true,
            OnboardingStep::Complete => false,
        }
    }

    /// Moves to the next step when the current one validates. Blocked
    /// advances leave the state untouched and report `false`.
    ///
    /// Advancing from `InterestEntry` is the same as completing, so callers
    /// should use [`Onboarding::complete`] there instead.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.step = match self.step {
            OnboardingStep::NameEntry => OnboardingStep::AgeEntry,
            OnboardingStep::AgeEntry => OnboardingStep::InterestEntry,
            OnboardingStep::InterestEntry | OnboardingStep::Complete => return false,
        };
        true
    }

    pub fn back(&mut self) -> bool {
        let previous = match self.step {
            OnboardingStep::AgeEntry => OnboardingStep::NameEntry,
            OnboardingStep::InterestEntry => OnboardingStep::AgeEntry,
            OnboardingStep::NameEntry | OnboardingStep::Complete => return false,
        };
        self.step = previous;
        true
    }

    /// Adds `tag`, or the pending interest buffer when `tag` is `None`.
    /// The buffer is cleared after a successful add.
    pub fn add_interest(&mut self, tag: Option<&str>) -> bool {
        if self.step != OnboardingStep::InterestEntry {
            return false;
        }
        match tag {
            Some(tag) => self.interests.add(tag),
            None => {
                let pending = std::mem::take(&mut self.pending_interest);
                let added = self.interests.add(&pending);
                if !added {
                    self.pending_interest = pending;
                }
                added
            }
        }
    }

    pub fn remove_interest(&mut self, tag: &str) -> bool {
        if self.step != OnboardingStep::InterestEntry {
            return false;
        }
        self.interests.remove(tag)
    }

    /// Commits the buffers into a [`Profile`] and enters `Complete`.
    ///
    /// Only valid from `InterestEntry`; the name and age are re-validated so a
    /// profile can never be built from unchecked input.
    pub fn complete(&mut self) -> Option<Profile> {
        if self.step != OnboardingStep::InterestEntry {
            return None;
        }
        let name = validate_name(&self.name)?.to_string();
        let age = parse_age(&self.age)?;
        self.step = OnboardingStep::Complete;
        Some(Profile::new(name, age, self.interests.clone()))
    }
}
