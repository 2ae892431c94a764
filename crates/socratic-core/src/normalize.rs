//! Markdown clean-up applied to model replies before they are stored.

use std::sync::LazyLock;

use regex::Regex;

/// A run of `#` together with the newlines directly in front of it.
static HEADER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n*#+").expect("header pattern compiles"));

/// Length of a level-3 header marker.
const H3_MARKER_LEN: usize = 3;

/// Ensure every level-3 header marker (`###`) is preceded by a blank line.
///
/// A marker directly after text gets two newlines in front of it; a marker
/// after a single newline gets one more; two or more newlines are left alone.
/// Runs of any other length (`#`, `####`) and a marker at the very start of
/// the text are untouched. Idempotent.
pub fn normalize(text: &str) -> String {
    HEADER_RUN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let run = caps.get(0).map_or("", |m| m.as_str());
            let starts_text = caps.get(0).is_some_and(|m| m.start() == 0);
            let hashes = run.bytes().rev().take_while(|&b| b == b'#').count();
            let newlines = run.len() - hashes;

            match (hashes, newlines) {
                (H3_MARKER_LEN, 0) if !starts_text => format!("\n\n{run}"),
                (H3_MARKER_LEN, 1) => format!("\n{run}"),
                _ => run.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_after_text() {
        assert_eq!(
            normalize("Evaluation text###Elaboration"),
            "Evaluation text\n\n###Elaboration"
        );
    }

    #[test]
    fn test_marker_with_space_after_text() {
        let out = normalize("Evaluation text### Elaboration");
        let idx = out.find("### Elaboration").unwrap();
        assert_eq!(&out[idx - 2..idx], "\n\n");
    }

    #[test]
    fn test_single_newline_gets_one_more() {
        assert_eq!(
            normalize("Good start.\n### Elaboration\nMore."),
            "Good start.\n\n### Elaboration\nMore."
        );
    }

    #[test]
    fn test_blank_line_already_present_unchanged() {
        let text = "Good start.\n\n### Elaboration";
        assert_eq!(normalize(text), text);
        let text = "Good start.\n\n\n### Elaboration";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_leading_marker_unchanged() {
        let text = "### Evaluation\nYou are close.";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_other_heading_levels_unchanged() {
        let text = "Intro\n#### Detail\nA C# note\n## Two";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_all_three_sections() {
        let raw = "### Evaluation\nNice.### Elaboration\nDeeper.\n### The Socratic Turn\n*Why?*";
        assert_eq!(
            normalize(raw),
            "### Evaluation\nNice.\n\n### Elaboration\nDeeper.\n\n### The Socratic Turn\n*Why?*"
        );
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("plain text\nline"), "plain text\nline");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn markdownish() -> impl Strategy<Value = String> {
        "[a #\n*]{0,64}"
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in markdownish()) {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_only_inserts_newlines(s in markdownish()) {
            let out = normalize(&s);
            prop_assert!(out.len() >= s.len());
            prop_assert_eq!(out.replace('\n', ""), s.replace('\n', ""));
        }

        #[test]
        fn every_inner_marker_follows_a_blank_line(s in markdownish()) {
            let out = normalize(&s);
            for m in HEADER_RUN.find_iter(&out) {
                let run = m.as_str();
                let hashes = run.bytes().rev().take_while(|&b| b == b'#').count();
                if hashes == H3_MARKER_LEN && m.start() > 0 {
                    prop_assert!(run.starts_with("\n\n"), "marker run {:?} in {:?}", run, out);
                }
            }
        }
    }
}
