//! Best-effort splitter for a `personal_info` value that arrived as one string.
//!
//! Tokens are the comma-separated parts of the string, visited in order. The
//! first matching rule picks the target field, and a later token overwrites an
//! earlier one in the same field (last wins). The split is lossy: a name
//! containing a digit lands in `phone`, an address without a known keyword
//! lands in `name`.

use super::model::PersonalInfo;

/// Lower-case substrings that mark a token as a location.
const LOCATION_KEYWORDS: [&str; 4] = ["singapore", "usa", "uk", "australia"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Email,
    Phone,
    Location,
    Name,
}

type Rule = (fn(&str) -> bool, Slot);

/// Ordered rule list; the last rule always matches.
const RULES: [Rule; 4] = [
    (is_email, Slot::Email),
    (is_phone, Slot::Phone),
    (is_location, Slot::Location),
    (any_token, Slot::Name),
];

fn is_email(token: &str) -> bool {
    token.contains('@')
}

fn is_phone(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

fn any_token(_token: &str) -> bool {
    true
}

fn is_location(token: &str) -> bool {
    let lower = token.to_lowercase();
    LOCATION_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn split_personal_info(raw: &str) -> PersonalInfo {
    let mut info = PersonalInfo::default();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some(slot) = RULES
            .iter()
            .find(|(matches, _)| matches(token))
            .map(|(_, slot)| *slot)
        else {
            continue;
        };

        let field = match slot {
            Slot::Email => &mut info.email,
            Slot::Phone => &mut info.phone,
            Slot::Location => &mut info.location,
            Slot::Name => &mut info.name,
        };
        *field = token.to_string();
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_four_part_string() {
        let info = split_personal_info("Jane Doe, jane@x.com, +1 555 1234, Singapore");
        assert_eq!(info.name, "Jane Doe");
        assert_eq!(info.email, "jane@x.com");
        assert_eq!(info.phone, "+1 555 1234");
        assert_eq!(info.location, "Singapore");
    }

    #[test]
    fn test_order_of_tokens_does_not_matter() {
        let info = split_personal_info("  Sydney, Australia , tom@mail.io,Tom Hanks ");
        // "Sydney" matches no keyword; the later "Tom Hanks" replaces it
        assert_eq!(info.name, "Tom Hanks");
        assert_eq!(info.location, "Australia");
        assert_eq!(info.email, "tom@mail.io");
        assert_eq!(info.phone, "");
    }

    #[test]
    fn test_later_token_overwrites_earlier_one() {
        let info = split_personal_info("a@b.com, c@d.com");
        assert_eq!(info.email, "c@d.com");

        let info = split_personal_info("Jane Doe, Senior Engineer, jane@x.com");
        assert_eq!(info.name, "Senior Engineer");
        assert_eq!(info.email, "jane@x.com");
    }

    #[test]
    fn test_email_rule_precedes_digit_rule() {
        let info = split_personal_info("jane99@x.com");
        assert_eq!(info.email, "jane99@x.com");
        assert!(info.phone.is_empty());
    }

    #[test]
    fn test_location_keyword_is_case_insensitive_substring() {
        let info = split_personal_info("London, UK");
        assert_eq!(info.location, "UK");
        assert_eq!(info.name, "London");
    }

    #[test]
    fn test_empty_input_yields_empty_fields() {
        assert_eq!(split_personal_info(""), PersonalInfo::default());
        assert_eq!(split_personal_info(" , ,"), PersonalInfo::default());
    }
}
