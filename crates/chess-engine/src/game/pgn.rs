//! PGN tag pairs and export.

use super::Game;
use chess_core::Color;
use std::fmt::Write;

/// Tags written first, in this order.
const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

const LINE_WIDTH: usize = 75;

/// Ordered PGN tag pairs. Setting an existing tag replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnHeaders {
    tags: Vec<(String, String)>,
}

impl PgnHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.tags.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.tags.iter().position(|(k, _)| k == name)?;
        Some(self.tags.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Game {
    /// Exports the game as PGN with SAN movetext.
    ///
    /// The seven-tag roster comes first, filled with `?` placeholders where
    /// unset, followed by the remaining tags in insertion order.
    pub fn to_pgn(&self) -> String {
        let mut out = String::new();
        for (name, default) in SEVEN_TAG_ROSTER {
            let value = self.headers.get(name).unwrap_or(default);
            let _ = writeln!(out, "[{} \"{}\"]", name, escape(value));
        }
        for (name, value) in self.headers.iter() {
            if SEVEN_TAG_ROSTER.iter().all(|(roster, _)| *roster != name) {
                let _ = writeln!(out, "[{} \"{}\"]", name, escape(value));
            }
        }
        out.push('\n');

        let mut replay = self.detached();
        while replay.rollback().is_ok() {}

        let mut tokens = Vec::with_capacity(self.history.len() * 3 / 2 + 1);
        for (ply, mv) in self.moves().enumerate() {
            let number = replay.fullmove_number();
            match replay.side_to_move() {
                Color::White => tokens.push(format!("{}.", number)),
                Color::Black if ply == 0 => tokens.push(format!("{}...", number)),
                Color::Black => {}
            }
            tokens.push(replay.san(mv));
            replay.force_move(*mv);
        }
        tokens.push(self.header("Result").unwrap_or("*").to_string());

        let mut line = String::new();
        for token in tokens {
            if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
                out.push_str(&line);
                out.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&token);
        }
        out.push_str(&line);
        out.push('\n');
        out
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
