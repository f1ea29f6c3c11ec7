//! Position notation parser.
//!
//! A position is human-authored text made of `{...}` comments (ignored),
//! square-bracket blocks and an optional trailing move list:
//!
//! ```text
//! [Size "5x5"]
//! [Mode "5D"]
//! {the root board, white to move on turn 1}
//! [k3r/5/5/5/K3R:0:1:w]
//! (L0T1)e1>(L0T1)e2 submit
//! ```
//!
//! Metadata blocks hold a key, whitespace, and a (usually quoted) value;
//! the `Size` key fixes the board geometry for every board in the game.
//! Board blocks hold `layout:timeline:turn:side`. Whatever text remains
//! outside blocks is read as a move list and replayed after construction,
//! which lets a position be written as "start plus the moves that led
//! here". Parsing is all-or-nothing: any unreadable block fails the whole
//! position and nothing half-built escapes.

use std::collections::BTreeMap;

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::Side;
use crate::game_state::multiverse::{ActivationPolicy, BoardRecord, Multiverse};
use crate::moves::chess_move::ChessMove;
use crate::utils::fen_parser::parse_board_fen;

/// One replayed move with its routing and source token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub mv: ChessMove,
    /// `>>` tokens route through branching (indicator) application.
    pub indicator: bool,
    pub token: String,
}

/// A fully parsed position: the assembled multiverse plus the move list
/// still to be replayed on it.
#[derive(Debug, Clone)]
pub struct ParsedPosition {
    pub multiverse: Multiverse,
    pub replay: Vec<ReplayStep>,
}

/// Parse position text into a multiverse and replay list.
pub fn parse_position(
    text: &str,
    policy: ActivationPolicy,
) -> Result<ParsedPosition, ChessErrors> {
    let clean = strip_comments(text)?;
    let (blocks, remainder) = split_blocks(&clean)?;

    let mut metadata: BTreeMap<String, String> = BTreeMap::new();
    let mut raw_boards: Vec<(String, i32, i32, Side)> = Vec::new();

    for block in &blocks {
        if block.contains(':') {
            raw_boards.push(parse_board_block(block)?);
        } else {
            let (key, value) = parse_metadata_block(block)?;
            metadata.insert(key, value);
        }
    }

    let (width, height) = match metadata.get("Size") {
        Some(raw) => parse_size(raw)?,
        None => (8, 8),
    };
    // Normalize: the effective size is always recorded, so serializing and
    // reparsing a position reproduces identical metadata.
    metadata.insert("Size".to_owned(), format!("{}x{}", width, height));

    let mut records = Vec::with_capacity(raw_boards.len());
    for (fen, timeline, turn, side) in raw_boards {
        let board = parse_board_fen(&fen, width, height)?;
        records.push(BoardRecord {
            timeline,
            turn,
            side,
            board,
        });
    }

    let multiverse = Multiverse::assemble(records, width, height, metadata, policy)?;
    let replay = parse_move_list(&remainder)?;
    Ok(ParsedPosition { multiverse, replay })
}

/// Parse a `Size` tag value of the form `WxH`.
pub fn parse_size(raw: &str) -> Result<(u8, u8), ChessErrors> {
    let bad = || ChessErrors::InvalidBoardSize(raw.to_owned());
    let (w, h) = raw.trim().split_once('x').ok_or_else(bad)?;
    let width: u8 = w.trim().parse().map_err(|_| bad())?;
    let height: u8 = h.trim().parse().map_err(|_| bad())?;
    if !(1..=8).contains(&width) || !(1..=8).contains(&height) {
        return Err(bad());
    }
    Ok((width, height))
}

fn strip_comments(text: &str) -> Result<String, ChessErrors> {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0u32;
    for c in text.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return Err(ChessErrors::MalformedPositionSpec {
                        block: "}".to_owned(),
                        reason: "comment close without open".to_owned(),
                    });
                }
                depth -= 1;
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ChessErrors::MalformedPositionSpec {
            block: "{".to_owned(),
            reason: "unterminated comment".to_owned(),
        });
    }
    Ok(out)
}

/// Collect `[...]` block bodies and return the text left outside them.
fn split_blocks(text: &str) -> Result<(Vec<String>, String), ChessErrors> {
    let mut blocks = Vec::new();
    let mut remainder = String::new();
    let mut current: Option<String> = None;

    for c in text.chars() {
        match (c, current.as_mut()) {
            ('[', None) => current = Some(String::new()),
            ('[', Some(_)) => {
                return Err(ChessErrors::MalformedPositionSpec {
                    block: "[".to_owned(),
                    reason: "nested block open".to_owned(),
                })
            }
            (']', Some(body)) => {
                blocks.push(std::mem::take(body));
                current = None;
            }
            (']', None) => {
                return Err(ChessErrors::MalformedPositionSpec {
                    block: "]".to_owned(),
                    reason: "block close without open".to_owned(),
                })
            }
            (_, Some(body)) => body.push(c),
            (_, None) => remainder.push(c),
        }
    }
    if current.is_some() {
        return Err(ChessErrors::MalformedPositionSpec {
            block: "[".to_owned(),
            reason: "unterminated block".to_owned(),
        });
    }
    Ok((blocks, remainder))
}

fn parse_board_block(block: &str) -> Result<(String, i32, i32, Side), ChessErrors> {
    let bad = |reason: &str| ChessErrors::MalformedPositionSpec {
        block: block.to_owned(),
        reason: reason.to_owned(),
    };

    let parts: Vec<&str> = block.split(':').collect();
    if parts.len() != 4 {
        return Err(bad("expected layout:timeline:turn:side"));
    }
    let fen = parts[0].trim();
    if fen.is_empty() {
        return Err(bad("empty board layout"));
    }
    let timeline: i32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| bad("timeline is not an integer"))?;
    let turn: i32 = parts[2]
        .trim()
        .parse()
        .map_err(|_| bad("turn is not an integer"))?;
    let side_text = parts[3].trim();
    let mut side_chars = side_text.chars();
    let side = match (side_chars.next(), side_chars.next()) {
        (Some(c), None) => Side::from_letter(c).ok_or(ChessErrors::UnknownSideLetter(c))?,
        _ => return Err(bad("side must be a single letter")),
    };
    Ok((fen.to_owned(), timeline, turn, side))
}

fn parse_metadata_block(block: &str) -> Result<(String, String), ChessErrors> {
    let trimmed = block.trim();
    let (key, value) = trimmed
        .split_once(char::is_whitespace)
        .ok_or_else(|| ChessErrors::MalformedPositionSpec {
            block: block.to_owned(),
            reason: "metadata needs a key and a value".to_owned(),
        })?;
    let value = value.trim().trim_matches('"');
    Ok((key.to_owned(), value.to_owned()))
}

fn parse_move_list(remainder: &str) -> Result<Vec<ReplayStep>, ChessErrors> {
    let mut steps = Vec::new();
    for token in remainder.split_whitespace() {
        // Move numbers and slash separators are decoration.
        if token == "/" || (token.ends_with('.') && token[..token.len() - 1].parse::<u32>().is_ok())
        {
            continue;
        }
        let mv = ChessMove::from_notation(token)?;
        steps.push(ReplayStep {
            mv,
            indicator: token.contains(">>"),
            token: token.to_owned(),
        });
    }
    Ok(steps)
}
