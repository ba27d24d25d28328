/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Input handling for the structure editor.
//!
//! Keyboard shortcuts are handled here. Pointer interpretation lives in
//! `pointer`, the view transform in `camera`.

pub mod camera;
pub mod pointer;

use crate::app::{EditorSession, NavigateDirection};
use crate::config::keybinds::KeybindConfig;
use crate::graph::Base;
use keyboard_types::{Key, KeyState, Modifiers, NamedKey};
use pointer::InteractionMode;

/// Keyboard actions collected from one key event.
///
/// This struct decouples input detection from action application (pure
/// state mutation), making actions testable.
#[derive(Debug, Default, PartialEq)]
pub struct KeyboardActions {
    pub create_nucleotide: bool,
    pub set_base: Option<Base>,
    pub navigate: Option<NavigateDirection>,
    pub delete_current: bool,
    pub clear_selection: bool,
    pub begin_pan: bool,
    pub end_pan: bool,
}

/// Collect keyboard actions from a key event (input detection only).
pub fn collect_actions(
    key: &Key,
    state: KeyState,
    modifiers: Modifiers,
    keybinds: &KeybindConfig,
    suppressed: bool,
) -> KeyboardActions {
    let mut actions = KeyboardActions::default();

    if state == KeyState::Up {
        // Releasing pan always restores select, even if an editor opened meanwhile
        actions.end_pan = keybinds.is_temporary_pan(key);
        return actions;
    }

    // Escape always works: clears selection and closes editors
    if keybinds.is_clear_selection(key) {
        actions.clear_selection = true;
        return actions;
    }

    // Skip remaining shortcuts while an editor has focus or a chord is held
    if suppressed || modifiers.intersects(Modifiers::CONTROL | Modifiers::META | Modifiers::ALT) {
        return actions;
    }

    if keybinds.is_temporary_pan(key) {
        actions.begin_pan = true;
    } else if keybinds.is_new_nucleotide(key) {
        actions.create_nucleotide = true;
    } else if keybinds.is_delete(key) {
        actions.delete_current = true;
    }

    match key {
        Key::Character(text) => {
            let mut chars = text.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if !actions.create_nucleotide {
                    actions.set_base = Base::from_char(c);
                }
            }
        },
        Key::Named(NamedKey::ArrowUp | NamedKey::ArrowLeft) => {
            actions.navigate = Some(NavigateDirection::Previous);
        },
        Key::Named(NamedKey::ArrowDown | NamedKey::ArrowRight) => {
            actions.navigate = Some(NavigateDirection::Next);
        },
        _ => {},
    }

    actions
}

/// Apply keyboard actions to the session (testable without a windowing layer).
pub fn apply_actions(session: &mut EditorSession, actions: &KeyboardActions) {
    if actions.clear_selection {
        session.clear_selection();
    }
    if actions.begin_pan {
        session.set_mode(InteractionMode::Pan);
    }
    if actions.end_pan && session.mode() == InteractionMode::Pan {
        session.set_mode(InteractionMode::Select);
    }
    if actions.create_nucleotide {
        session.add_nucleotide_chained();
    }
    if let Some(base) = actions.set_base {
        session.set_current_base(base);
    }
    if let Some(direction) = actions.navigate {
        session.navigate(direction);
    }
    if actions.delete_current {
        session.delete_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::default::Point2D;

    fn press(key: Key, session: &EditorSession) -> KeyboardActions {
        collect_actions(
            &key,
            KeyState::Down,
            Modifiers::empty(),
            &session.keybinds,
            session.shortcuts_suppressed(),
        )
    }

    fn character(c: &str) -> Key {
        Key::Character(c.to_string())
    }

    #[test]
    fn test_collect_base_letters() {
        let session = EditorSession::default();
        assert_eq!(press(character("g"), &session).set_base, Some(Base::G));
        assert_eq!(press(character("U"), &session).set_base, Some(Base::U));
        assert_eq!(press(character("x"), &session), KeyboardActions::default());
    }

    #[test]
    fn test_collect_suppressed_except_escape() {
        let mut session = EditorSession::default();
        session.open_label_create(Point2D::new(0.0, 0.0));

        assert_eq!(press(character("n"), &session), KeyboardActions::default());
        assert_eq!(press(character("a"), &session), KeyboardActions::default());
        assert!(press(Key::Named(NamedKey::Escape), &session).clear_selection);
    }

    #[test]
    fn test_collect_ignores_modifier_chords() {
        let session = EditorSession::default();
        let actions = collect_actions(
            &character("c"),
            KeyState::Down,
            Modifiers::CONTROL,
            &session.keybinds,
            false,
        );
        assert_eq!(actions, KeyboardActions::default());
    }

    #[test]
    fn test_create_nucleotide_action() {
        let mut session = EditorSession::default();
        session.set_mode(InteractionMode::Add);

        let actions = press(character("n"), &session);
        assert!(actions.create_nucleotide);
        assert_eq!(actions.set_base, None);
        apply_actions(&mut session, &actions);

        assert_eq!(session.structure().nucleotide_count(), 1);
        assert_eq!(session.mode(), InteractionMode::Select);
        assert_eq!(session.selection.current_nucleotide, Some(1));
        let n = session.structure().nucleotide(1).unwrap();
        assert_eq!(n.position, session.viewport_center());
    }

    #[test]
    fn test_create_nucleotide_chains_off_current() {
        let mut session = EditorSession::default();
        let first = session.add_nucleotide_at(Point2D::new(0.0, 0.0));

        apply_actions(&mut session, &KeyboardActions {
            create_nucleotide: true,
            ..Default::default()
        });

        let a = session.structure().nucleotide(first).unwrap().position;
        let b = session.structure().nucleotide(2).unwrap().position;
        assert!((a - b).length() > 0.0);
        assert!((a - b).length() < 100.0);
    }

    #[test]
    fn test_set_base_action() {
        let mut session = EditorSession::default();
        let id = session.add_nucleotide_at(Point2D::new(10.0, 10.0));

        let actions = press(character("c"), &session);
        apply_actions(&mut session, &actions);
        assert_eq!(session.structure().nucleotide(id).unwrap().base, Some(Base::C));
    }

    #[test]
    fn test_arrow_navigation_action() {
        let mut session = EditorSession::default();
        session.add_nucleotide_at(Point2D::new(0.0, 0.0));
        session.add_nucleotide_at(Point2D::new(300.0, 0.0));

        let actions = press(Key::Named(NamedKey::ArrowRight), &session);
        apply_actions(&mut session, &actions);
        assert_eq!(session.selection.current_nucleotide, Some(1));
        let actions = press(Key::Named(NamedKey::ArrowLeft), &session);
        apply_actions(&mut session, &actions);
        assert_eq!(session.selection.current_nucleotide, Some(2));
    }

    #[test]
    fn test_delete_action() {
        let mut session = EditorSession::default();
        let id = session.add_nucleotide_at(Point2D::new(0.0, 0.0));

        let actions = press(Key::Named(NamedKey::Backspace), &session);
        apply_actions(&mut session, &actions);
        assert!(!session.structure().contains(id));
    }

    #[test]
    fn test_space_pans_until_released() {
        let mut session = EditorSession::default();
        session.set_mode(InteractionMode::Pair);

        let actions = press(character(" "), &session);
        apply_actions(&mut session, &actions);
        assert_eq!(session.mode(), InteractionMode::Pan);

        let release = collect_actions(
            &character(" "),
            KeyState::Up,
            Modifiers::empty(),
            &session.keybinds,
            false,
        );
        apply_actions(&mut session, &release);
        assert_eq!(session.mode(), InteractionMode::Select);
    }

    #[test]
    fn test_escape_closes_editors() {
        let mut session = EditorSession::default();
        session.add_nucleotide_at(Point2D::new(0.0, 0.0));
        session.begin_id_edit();

        apply_actions(&mut session, &KeyboardActions {
            clear_selection: true,
            ..Default::default()
        });
        assert!(!session.shortcuts_suppressed());
        assert_eq!(session.selection.current_nucleotide, None);
    }
}
