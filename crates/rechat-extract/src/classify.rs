//! Role classifier — total and deterministic.
//!
//! Signals are tried from most to least stable: structural identity of the
//! container itself, then nested authorship markers, then lexical class
//! tokens, then positional alternation. Chat UIs strictly alternate turns,
//! so parity can misclassify but never fails.

use rechat_core::Role;
use scraper::{ElementRef, Selector};

/// A structural signal on the container itself.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// Attribute with an exact value, e.g. `data-message-author-role="user"`.
    Attr(&'static str, &'static str),
    /// The container's own tag name, e.g. `user-query`.
    Tag(&'static str),
    /// A class present on the container itself.
    Class(&'static str),
}

/// Per-platform classification table.
#[derive(Debug, Clone, Copy)]
pub struct RoleRules {
    pub user_markers: &'static [Signal],
    pub assistant_markers: &'static [Signal],
    /// Selectors for nested authorship markers.
    pub user_nested: &'static [&'static str],
    pub assistant_nested: &'static [&'static str],
    /// Lowercase substrings matched against the container's class string.
    pub user_tokens: &'static [&'static str],
    pub assistant_tokens: &'static [&'static str],
}

/// Decide whether `container` is a user or assistant turn.
///
/// `position_index` is the container's enumeration position and only
/// matters when every other signal misses: even positions become user
/// turns, odd positions assistant turns.
pub fn classify(container: ElementRef, position_index: usize, rules: &RoleRules) -> Role {
    if matches_any(container, rules.user_markers) {
        return Role::User;
    }
    if matches_any(container, rules.assistant_markers) {
        return Role::Assistant;
    }

    if has_descendant(container, rules.user_nested) {
        return Role::User;
    }
    if has_descendant(container, rules.assistant_nested) {
        return Role::Assistant;
    }

    let classes = container
        .value()
        .attr("class")
        .unwrap_or_default()
        .to_lowercase();
    if rules.user_tokens.iter().any(|t| classes.contains(t)) {
        return Role::User;
    }
    if rules.assistant_tokens.iter().any(|t| classes.contains(t)) {
        return Role::Assistant;
    }

    if position_index % 2 == 0 {
        Role::User
    } else {
        Role::Assistant
    }
}

fn matches_any(container: ElementRef, signals: &[Signal]) -> bool {
    signals.iter().any(|signal| match *signal {
        Signal::Attr(name, value) => container.value().attr(name) == Some(value),
        Signal::Tag(name) => container.value().name().eq_ignore_ascii_case(name),
        Signal::Class(class) => container.value().classes().any(|c| c == class),
    })
}

fn has_descendant(container: ElementRef, selectors: &[&str]) -> bool {
    selectors.iter().any(|raw| {
        if let Ok(selector) = Selector::parse(raw) {
            container.select(&selector).next().is_some()
        } else {
            false
        }
    })
}
