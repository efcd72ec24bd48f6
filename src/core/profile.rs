/// Youngest age the onboarding flow accepts.
pub const MINIMUM_AGE: u32 = 18;

/// Attributes collected during onboarding.
///
/// A `Profile` only exists once onboarding has completed; until then the
/// values live in the onboarding buffers. It is read-only afterwards and is
/// attached to every outbound frame.
///
/// The only way to build one is through onboarding, so it cannot be
/// materialized from arbitrary data:
///
/// ```compile_fail
/// let _ = serde_json::from_str::<paquera::core::profile::Profile>(
///     r#"{"name":"  ","age":5,"interests":["x","x",""]}"#,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    age: u32,
    interests: Interests,
}

impl Profile {
    pub(crate) fn new(name: String, age: u32, interests: Interests) -> Self {
        Self {
            name,
            age,
            interests,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn interests(&self) -> &[String] {
        self.interests.as_slice()
    }
}

/// Returns the trimmed name when it is acceptable.
pub fn validate_name(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Parses an age entry, accepting only integers at or above [`MINIMUM_AGE`].
pub fn parse_age(input: &str) -> Option<u32> {
    let age = input.trim().parse::<i64>().ok()?;
    if age < i64::from(MINIMUM_AGE) {
        return None;
    }
    u32::try_from(age).ok()
}

/// Interest tags in insertion order, without duplicates or blank entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interests(Vec<String>);

impl Interests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the trimmed tag. Returns `false` when it is blank or already present.
    pub fn add(&mut self, tag: &str) -> bool {
        let trimmed = tag.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.0.push(trimmed.to_string());
        true
    }

    /// Removes an exact match. Returns `false` when the tag is not a member.
    pub fn remove(&mut self, tag: &str) -> bool {
        match self.0.iter().position(|existing| existing == tag) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_boundary_is_inclusive() {
        assert_eq!(parse_age("18"), Some(18));
        assert_eq!(parse_age(" 25 "), Some(25));
        assert_eq!(parse_age("17"), None);
        assert_eq!(parse_age("-40"), None);
    }

    #[test]
    fn non_numeric_ages_are_rejected() {
        for input in ["", "   ", "abc", "25abc", "18.5", "dezoito"] {
            assert_eq!(parse_age(input), None, "input {input:?} should not parse");
        }
    }

    #[test]
    fn huge_ages_do_not_overflow() {
        assert_eq!(parse_age("99999999999999999999"), None);
        assert_eq!(parse_age("4294967296"), None);
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  Ana "), Some("Ana"));
        assert_eq!(validate_name(" \t "), None);
    }

    #[test]
    fn interests_reject_blank_and_duplicate_tags() {
        let mut interests = Interests::new();
        assert!(interests.add("music"));
        assert!(!interests.add("music"));
        assert!(!interests.add("  music  "));
        assert!(!interests.add("   "));
        assert!(interests.add("Music"));
        assert_eq!(interests.as_slice(), ["music", "Music"]);
    }

    #[test]
    fn interests_keep_insertion_order() {
        let mut interests = Interests::new();
        for tag in ["filmes", "esportes", "música"] {
            interests.add(tag);
        }
        assert!(interests.remove("esportes"));
        assert_eq!(interests.as_slice(), ["filmes", "música"]);
    }

    #[test]
    fn removing_a_missing_tag_changes_nothing() {
        let mut interests = Interests::new();
        interests.add("music");
        let before = interests.clone();
        assert!(!interests.remove("films"));
        assert!(!interests.remove(" music"));
        assert_eq!(interests, before);
    }
}
