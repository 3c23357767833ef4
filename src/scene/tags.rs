//! # Tag Merging
//!
//! Tags label scenes and objects with the classes a downstream
//! computer-vision dataset cares about. Scripts pass either a single tag or
//! a collection; [`IntoTags`] merges every accepted shape into a canonical
//! sorted set.

use std::collections::BTreeSet;

/// Conversion of a single tag or a collection of tags into a canonical set.
pub trait IntoTags {
    fn into_tags(self) -> BTreeSet<String>;
}

impl IntoTags for &str {
    fn into_tags(self) -> BTreeSet<String> {
        BTreeSet::from([self.to_string()])
    }
}

impl IntoTags for String {
    fn into_tags(self) -> BTreeSet<String> {
        BTreeSet::from([self])
    }
}

impl<const N: usize> IntoTags for [&str; N] {
    fn into_tags(self) -> BTreeSet<String> {
        self.iter().map(|t| t.to_string()).collect()
    }
}

impl IntoTags for &[&str] {
    fn into_tags(self) -> BTreeSet<String> {
        self.iter().map(|t| t.to_string()).collect()
    }
}

impl IntoTags for Vec<&str> {
    fn into_tags(self) -> BTreeSet<String> {
        self.iter().map(|t| t.to_string()).collect()
    }
}

impl IntoTags for Vec<String> {
    fn into_tags(self) -> BTreeSet<String> {
        self.into_iter().collect()
    }
}

impl IntoTags for BTreeSet<String> {
    fn into_tags(self) -> BTreeSet<String> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tag() {
        assert_eq!("cube".into_tags(), BTreeSet::from(["cube".to_string()]));
    }

    #[test]
    fn test_collections_merge_and_dedup() {
        let tags = ["sphere", "red", "sphere"].into_tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("sphere"));
        assert!(tags.contains("red"));

        let tags = vec!["a".to_string(), "b".to_string()].into_tags();
        assert_eq!(
            tags,
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
    }
}
