//! Property tests for template substitution.

use proptest::prelude::*;
use tw_core::{StateBag, Value, scan_for_template, statify};

proptest! {
    #[test]
    fn brace_free_text_is_unchanged(text in "[^{}]*") {
        prop_assert_eq!(statify(&text, &StateBag::new()), text);
    }

    #[test]
    fn every_placeholder_is_resolved(
        key in "[a-z_]{1,12}",
        value in ".*",
        prefix in "[^{}\\\\]*",
        suffix in "[^{}\\\\]*",
    ) {
        let mut bag = StateBag::new();
        bag.set(key.clone(), Value::text(value.clone()));
        let text = format!("{prefix}{{{key}}}{suffix}{{{key}}}");
        prop_assert_eq!(
            statify(&text, &bag),
            format!("{prefix}{value}{suffix}{value}")
        );
    }

    #[test]
    fn scanned_span_covers_braces(key in "[a-z]{1,8}", prefix in "[^{}\\\\]{0,20}") {
        let text = format!("{prefix}{{{key}}}");
        let m = scan_for_template(&text).unwrap();
        prop_assert_eq!(&text[m.start..m.end], format!("{{{key}}}"));
        prop_assert_eq!(m.key, key);
    }
}
