use proptest::prelude::*;
use underwater_patcher::ini::{append_line, insert_into_section, remove_list_values};

/// Body lines that are neither headers nor comments
fn body_line() -> impl Strategy<Value = String> {
    "([a-z$][a-z0-9_ =,$]{0,16})?"
}

proptest! {
    #[test]
    fn insertion_keeps_every_original_line(
        body in prop::collection::vec(body_line(), 0..8),
        new_lines in prop::collection::vec(body_line(), 1..8),
    ) {
        let mut input = vec!["[Constants]".to_string()];
        input.extend(body.iter().cloned());
        input.extend(["[KeySwap]".to_string(), "key = VK_DOWN".to_string()]);
        let text = input.join("\n") + "\n";

        let output = insert_into_section(&text, "Constants", &new_lines).unwrap();

        // Without comments the block lands at the end of the section
        let mut expected = vec!["[Constants]".to_string()];
        expected.extend(body.iter().cloned());
        expected.extend(new_lines.iter().cloned());
        expected.extend(["[KeySwap]".to_string(), "key = VK_DOWN".to_string()]);
        prop_assert_eq!(output, expected.join("\n") + "\n");
    }

    #[test]
    fn insertion_lands_before_first_comment(
        body in prop::collection::vec(body_line(), 0..8),
        new_lines in prop::collection::vec(body_line(), 1..8),
        position in any::<prop::sample::Index>(),
    ) {
        let at = position.index(body.len() + 1);
        let mut section = body.clone();
        section.insert(at, "; Shader".to_string());
        section.push("; Overrides".to_string());

        let mut input = vec!["[Constants]".to_string()];
        input.extend(section.iter().cloned());
        input.extend(["[KeySwap]".to_string(), "key = VK_DOWN".to_string()]);
        let text = input.join("\n") + "\n";

        let output = insert_into_section(&text, "Constants", &new_lines).unwrap();

        let mut expected = vec!["[Constants]".to_string()];
        expected.extend(body[..at].iter().cloned());
        expected.extend(new_lines.iter().cloned());
        expected.push("; Shader".to_string());
        expected.extend(body[at..].iter().cloned());
        expected.extend([
            "; Overrides".to_string(),
            "[KeySwap]".to_string(),
            "key = VK_DOWN".to_string(),
        ]);
        prop_assert_eq!(output, expected.join("\n") + "\n");
    }

    #[test]
    fn insertion_into_missing_section_changes_nothing(
        body in prop::collection::vec(body_line(), 0..8),
        new_lines in prop::collection::vec(body_line(), 1..4),
    ) {
        let text = format!("[KeySwap]\n{}\n", body.join("\n"));
        prop_assert_eq!(insert_into_section(&text, "Constants", &new_lines).unwrap(), text);
    }

    #[test]
    fn removal_keeps_order_of_the_rest(
        list in prop::collection::vec(0i64..10, 0..12),
        remove in prop::collection::vec(0i64..10, 0..5),
    ) {
        let joined = list.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        let values: Vec<String> = remove.iter().map(ToString::to_string).collect();

        let remaining = remove_list_values(&joined, &values);

        let expected: Vec<String> = list
            .iter()
            .filter(|value| !remove.contains(*value))
            .map(ToString::to_string)
            .collect();
        prop_assert_eq!(remaining, expected);
    }

    #[test]
    fn appended_line_is_last(
        body in prop::collection::vec(body_line(), 0..8),
        trailing_newline in any::<bool>(),
    ) {
        let mut text = format!("[KeySwap]\n{}", body.join("\n"));
        if trailing_newline {
            text.push('\n');
        }

        let output = append_line(&text, "; signed").unwrap();

        prop_assert!(output.starts_with(&text));
        prop_assert!(output.ends_with("\n; signed\n"));
    }
}
