//! Property-based tests for the path grammar.
#![cfg(test)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use proptest::prelude::*;

use super::*;

// Arbitrary text drawn from the characters the grammar cares about.
fn text_strategy() -> impl Strategy<Value = String> {
    "[ab.:?/\\\\]{0,12}"
}

// Well-formed paths: a root followed by segments joined with single separators.
fn rooted_path(
    segments: Range<usize>,
    trailing: impl Strategy<Value = bool>,
) -> impl Strategy<Value = String> {
    let root = prop::sample::select(vec!["", "/", "C:", "C:/", "//net/", "\\\\?\\", "\\\\?\\C:/"]);
    let segment = "[a-z]{1,4}(\\.[a-z]{1,3})?";
    (root, prop::collection::vec(segment, segments), trailing).prop_map(|(root, segments, trailing)| {
        let mut text = String::from(root);
        text.push_str(&segments.join("/"));
        if trailing && !segments.is_empty() {
            text.push('/');
        }
        text
    })
}

fn path_strategy() -> impl Strategy<Value = String> {
    rooted_path(0..4, any::<bool>())
}

// At least one segment and no trailing separator, so the path always has a filename.
fn named_path_strategy() -> impl Strategy<Value = String> {
    rooted_path(1..4, Just(false))
}

fn hash_of(path: &Path) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // stem + extension always rebuilds the filename
    #[test]
    fn stem_and_extension_split_filename(text in text_strategy()) {
        let path = Path::new(&text);
        let rebuilt = format!("{}{}", path.stem().as_str(), path.extension().as_str());
        prop_assert_eq!(rebuilt.as_str(), path.filename().as_str());
        if path.extension().is_empty() {
            prop_assert_eq!(path.stem(), path.filename());
        }
    }

    // root and relative are a prefix and a suffix of the text
    #[test]
    fn root_and_relative_bracket_the_text(text in text_strategy()) {
        let path = Path::new(&text);
        prop_assert!(text.starts_with(path.root().as_str()));
        prop_assert!(text.ends_with(path.relative().as_str()));
        prop_assert!(path.root().len() + path.relative().len() <= text.len());
    }

    // without repeated separators after the root, root + relative is the original path
    #[test]
    fn root_and_relative_reconstruct_path(text in path_strategy()) {
        let path = Path::new(&text);
        let mut rebuilt = path.root().to_owned();
        rebuilt.concat(path.relative());
        prop_assert_eq!(rebuilt, path);
    }

    #[test]
    fn remove_trailing_separators_is_idempotent(text in text_strategy()) {
        let mut once = OwnedPath::from(text);
        once.remove_trailing_separators();
        let mut twice = once.clone();
        twice.remove_trailing_separators();
        prop_assert_eq!(once.as_str(), twice.as_str());
    }

    #[test]
    fn make_preferred_is_idempotent_and_preserves_equality(text in text_strategy()) {
        let original = OwnedPath::from(text);
        let mut once = original.clone();
        once.make_preferred();
        let mut twice = once.clone();
        twice.make_preferred();
        prop_assert_eq!(once.as_str(), twice.as_str());
        prop_assert_eq!(&once, &original);
        prop_assert_eq!(hash_of(&once), hash_of(&original));
    }

    // exactly one separator is inserted at the join point
    #[test]
    fn append_joins_with_one_separator(left in "[a-z]{1,6}", right in "[a-z]{1,6}", trailing in any::<bool>()) {
        let mut path = OwnedPath::from(left.clone());
        if trailing {
            path.concat("/");
        }
        path.append(&right);
        let expected = format!("{left}{}{right}", Path::SEPARATOR);
        prop_assert_eq!(path.as_str().len(), expected.len());
        prop_assert_eq!(path, expected);
    }

    // only the receiver decides whether a separator is inserted
    #[test]
    fn append_inserts_separator_only_when_missing(left in text_strategy(), right in text_strategy()) {
        let receiver = Path::new(&left);
        let mut expected = left.clone();
        if !receiver.is_empty() && !receiver.ends_with_separator() {
            expected.push(Path::SEPARATOR);
        }
        expected.push_str(&right);

        let mut path = receiver.to_owned();
        path.append(&right);
        prop_assert_eq!(path.as_str(), expected.as_str());
    }

    // every parent is a strictly shorter prefix, so ancestors always terminate
    #[test]
    fn parent_is_a_shorter_prefix(text in text_strategy()) {
        let path = Path::new(&text);
        let parent = path.parent();
        prop_assert!(text.starts_with(parent.as_str()));
        if !path.is_empty() {
            prop_assert!(parent.len() < path.len());
        }
    }

    // replacing the filename of a path with a filename keeps its parent
    #[test]
    fn replace_filename_keeps_parent(text in named_path_strategy(), name in "[a-z]{1,6}") {
        let original = Path::new(&text);
        let mut path = original.to_owned();
        path.replace_filename(&name);
        prop_assert_eq!(path.filename(), name.as_str());
        prop_assert_eq!(path.parent(), original.parent());
    }
}
