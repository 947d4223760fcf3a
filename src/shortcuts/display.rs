//! Display form of shortcuts.
//!
//! The display form is derived from the internal form on every call and is
//! never stored: qualifiers are dropped, modifier and named-key tokens are
//! swapped for PC labels or Mac glyphs, every part is title-cased, and the
//! parts are reordered by the platform's modifier precedence.

use std::cmp::Ordering;

use super::types::{KeyEventKind, Platform, INTERNAL_FORM_DELIMITER};

const PC_CTRL: &str = "Ctrl";
const PC_ALT: &str = "Alt";
const PC_SHIFT: &str = "Shift";
const PC_META: &str = "Meta";

const MAC_CTRL: &str = "^";
const MAC_OPTION: &str = "⌥";
const MAC_SHIFT: &str = "⇧";
const MAC_COMMAND: &str = "⌘";

const MAC_ORDER: [&str; 4] = [MAC_CTRL, MAC_OPTION, MAC_SHIFT, MAC_COMMAND];
const PC_ORDER: [&str; 3] = [PC_SHIFT, PC_CTRL, PC_ALT];

/// PC label and Mac glyph for a token.
struct KeyLabel {
    pc: &'static str,
    mac: &'static str,
}

const fn label(pc: &'static str, mac: &'static str) -> KeyLabel {
    KeyLabel { pc, mac }
}

const KEY_LABELS: &[(&str, KeyLabel)] = &[
    ("ctrl", label(PC_CTRL, MAC_CTRL)),
    ("control", label(PC_CTRL, MAC_CTRL)),
    ("alt", label(PC_ALT, MAC_OPTION)),
    ("shift", label(PC_SHIFT, MAC_SHIFT)),
    ("meta", label(PC_META, MAC_COMMAND)),
    ("BACK_SPACE", label("BackSpace", "⌫")),
    ("DELETE", label("Del", "⌦")),
    ("ENTER", label("Enter", "↩")),
    ("ESCAPE", label("Esc", "⎋")),
    ("HOME", label("Home", "↖")),
    ("END", label("End", "↘")),
    ("PAGE_UP", label("PgUp", "PgUp")),
    ("PAGE_DOWN", label("PgDn", "PgDn")),
    ("LEFT", label("Left", "←")),
    ("RIGHT", label("Right", "→")),
    ("UP", label("Up", "↑")),
    ("DOWN", label("Down", "↓")),
    ("TAB", label("Tab", "Tab")),
];

/// Render an internal form for display on `platform`.
pub fn render(internal_form: &str, platform: Platform) -> String {
    let mut parts: Vec<String> = internal_form
        .split(INTERNAL_FORM_DELIMITER)
        .filter(|token| !token.is_empty() && KeyEventKind::from_keyword(token).is_none())
        .map(|token| title_case(platform_label(token, platform)))
        .collect();

    let order: &[&str] = if platform.is_mac() {
        &MAC_ORDER
    } else {
        &PC_ORDER
    };
    // Stable: unranked parts keep their relative order after the ranked ones.
    parts.sort_by(|a, b| compare_by_rank(order, a, b));

    parts.join(separator(platform))
}

fn separator(platform: Platform) -> &'static str {
    if platform.is_mac() {
        ""
    } else {
        "+"
    }
}

fn platform_label(token: &str, platform: Platform) -> &str {
    match KEY_LABELS.iter().find(|(name, _)| *name == token) {
        Some((_, label)) if platform.is_mac() => label.mac,
        Some((_, label)) => label.pc,
        None => token,
    }
}

fn title_case(part: &str) -> String {
    let lower = part.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn compare_by_rank(order: &[&str], a: &str, b: &str) -> Ordering {
    let rank = |part: &str| order.iter().position(|ranked| *ranked == part);
    match (rank(a), rank(b)) {
        (Some(ra), Some(rb)) => ra.cmp(&rb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pc_orders_shift_before_ctrl() {
        assert_eq!(render("ctrl shift pressed S", Platform::Other), "Shift+Ctrl+S");
    }

    #[test]
    fn mac_uses_glyphs_in_precedence_order() {
        assert_eq!(render("ctrl shift pressed S", Platform::Mac), "^⇧S");
        assert_eq!(render("meta alt ctrl pressed S", Platform::Mac), "^⌥⌘S");
        assert_eq!(render("meta shift pressed Z", Platform::Mac), "⇧⌘Z");
    }

    #[test]
    fn control_keyword_renders_like_ctrl() {
        assert_eq!(render("control pressed A", Platform::Other), "Ctrl+A");
        assert_eq!(render("control pressed A", Platform::Mac), "^A");
    }

    #[test]
    fn named_keys_are_mapped_then_title_cased() {
        assert_eq!(render("pressed ESCAPE", Platform::Other), "Esc");
        assert_eq!(render("pressed ESCAPE", Platform::Mac), "⎋");
        assert_eq!(render("pressed BACK_SPACE", Platform::Other), "Backspace");
        assert_eq!(render("shift PAGE_UP", Platform::Other), "Shift+Pgup");
        assert_eq!(render("alt LEFT", Platform::Mac), "⌥←");
    }

    #[test]
    fn unmapped_tokens_pass_through_title_cased() {
        assert_eq!(render("ctrl F5", Platform::Other), "Ctrl+F5");
        assert_eq!(render("ctrl BACK_QUOTE", Platform::Other), "Ctrl+Back_quote");
    }

    #[test]
    fn meta_is_unranked_on_pc() {
        assert_eq!(render("meta shift pressed K", Platform::Other), "Shift+Meta+K");
    }

    #[test]
    fn all_qualifiers_are_dropped() {
        assert_eq!(render("typed a", Platform::Other), "A");
        assert_eq!(render("alt released X", Platform::Other), "Alt+X");
    }

    #[test]
    fn unranked_parts_keep_relative_order() {
        let order: &[&str] = &PC_ORDER;
        let mut parts = vec!["B", "Shift", "A"];
        parts.sort_by(|a, b| compare_by_rank(order, a, b));
        assert_eq!(parts, vec!["Shift", "B", "A"]);
    }
}
