// src/utils/text.rs

//! Message splitting.
//!
//! Alert bodies can be longer than the messaging platform allows for one
//! message. They are cut into fixed-size parts by character count, without
//! looking for word or line boundaries: every part is guaranteed to fit, and
//! concatenating the parts gives back the original text.

use std::num::NonZeroUsize;

/// Split `text` into consecutive parts of at most `max_len` characters.
///
/// Every part except the last is exactly `max_len` characters long. Empty
/// input yields no parts. Lengths count Unicode scalar values, so a part
/// never ends inside a multi-byte character.
pub fn split(text: &str, max_len: NonZeroUsize) -> Vec<String> {
    let max_len = max_len.get();
    let mut parts = Vec::with_capacity(text.len() / max_len + 1);
    let mut rest = text;

    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max_len)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(cut);
        parts.push(head.to_string());
        rest = tail;
    }

    parts
}

/// Turn an alert body into the parts to deliver.
///
/// A body that fits is sent whole; anything longer goes through [`split`].
pub fn message_parts(body: &str, max_len: NonZeroUsize) -> Vec<String> {
    if body.chars().count() <= max_len.get() {
        if body.is_empty() {
            Vec::new()
        } else {
            vec![body.to_string()]
        }
    } else {
        split(body, max_len)
    }
}

/// Strip surrounding whitespace and line breaks from a message part.
pub fn trim_part(part: &str) -> &str {
    part.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: usize) -> NonZeroUsize {
        NonZeroUsize::new(v).unwrap()
    }

    fn lengths(parts: &[String]) -> Vec<usize> {
        parts.iter().map(|p| p.chars().count()).collect()
    }

    #[test]
    fn test_empty_input_has_no_parts() {
        assert!(split("", n(1)).is_empty());
        assert!(split("", n(4096)).is_empty());
        assert!(message_parts("", n(4096)).is_empty());
    }

    #[test]
    fn test_short_text_is_single_part() {
        assert_eq!(split("hello", n(10)), vec!["hello"]);
        assert_eq!(split("hello", n(5)), vec!["hello"]);
    }

    #[test]
    fn test_9000_chars_into_4096() {
        let text = "a".repeat(9000);
        let parts = split(&text, n(4096));
        assert_eq!(lengths(&parts), vec![4096, 4096, 808]);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_concatenation_and_part_sizes() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        for max in [1, 2, 3, 7, 64, 999, 1000, 1001] {
            let parts = split(&text, n(max));
            assert_eq!(parts.concat(), text, "max = {max}");

            let (last, full) = parts.split_last().unwrap();
            assert!(full.iter().all(|p| p.chars().count() == max));
            let last_len = last.chars().count();
            assert!((1..=max).contains(&last_len), "max = {max}");
        }
    }

    #[test]
    fn test_resplitting_is_stable() {
        let text = "Line one\nLine two\r\n".repeat(50);
        let parts = split(&text, n(37));
        assert_eq!(split(&parts.concat(), n(37)), parts);
    }

    #[test]
    fn test_multibyte_characters_are_not_cut() {
        let text = "Тривога! ".repeat(20);
        let parts = split(&text, n(7));
        assert!(parts.iter().all(|p| p.chars().count() <= 7));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_message_parts_keeps_body_whole_when_it_fits() {
        let body = "x".repeat(500);
        let parts = message_parts(&body, n(4096));
        assert_eq!(parts, vec![body]);

        let body = "y".repeat(4096);
        assert_eq!(message_parts(&body, n(4096)).len(), 1);
        let body = "y".repeat(4097);
        assert_eq!(lengths(&message_parts(&body, n(4096))), vec![4096, 1]);
    }

    #[test]
    fn test_trim_part() {
        assert_eq!(trim_part("\n\r  Alert body \r\n"), "Alert body");
        assert_eq!(trim_part("\n\n"), "");
    }
}
