//! Position serializer, the inverse of `notation_parser`.
//!
//! Every stored board is written out, so a serialized position replays to
//! the exact same multiverse: piece placement, unmoved markers, timeline
//! set and metadata all survive the round trip.

use crate::game_state::multiverse::Multiverse;
use crate::utils::fen_generator::generate_board_fen;

/// Serialize a multiverse into position notation.
pub fn generate_position(m: &Multiverse) -> String {
    let mut out = String::new();
    let (width, height) = m.board_size();

    let mut wrote_size = false;
    for (key, value) in m.metadata() {
        if key == "Size" {
            out.push_str(&format!("[Size \"{}x{}\"]\n", width, height));
            wrote_size = true;
        } else {
            out.push_str(&format!("[{} \"{}\"]\n", key, value));
        }
    }
    if !wrote_size {
        out.push_str(&format!("[Size \"{}x{}\"]\n", width, height));
    }

    for (timeline, turn, side, board) in m.boards() {
        out.push_str(&format!(
            "[{}:{}:{}:{}]\n",
            generate_board_fen(board),
            timeline,
            turn,
            side.letter()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::multiverse::ActivationPolicy;
    use crate::utils::notation_parser::parse_position;

    #[test]
    fn round_trip_is_stable() {
        let text = r#"
            [Size "5x5"]
            [Mode "5D"]
            [k3r/5/5/5/K3R:0:1:w]
        "#;
        let first = parse_position(text, ActivationPolicy::Balanced).unwrap();
        let serialized = generate_position(&first.multiverse);
        let second = parse_position(&serialized, ActivationPolicy::Balanced).unwrap();
        assert_eq!(first.multiverse, second.multiverse);
        assert_eq!(serialized, generate_position(&second.multiverse));
    }

    #[test]
    fn all_boards_and_timelines_survive() {
        let text = "
            [4k3/8/8/8/8/8/8/4K3:0:1:w]
            [4k3/8/8/8/8/8/8/4K3:0:1:b]
            [4k3/8/8/8/8/8/8/4K3:1:1:w]
        ";
        let parsed = parse_position(text, ActivationPolicy::Balanced).unwrap();
        let serialized = generate_position(&parsed.multiverse);
        let reparsed = parse_position(&serialized, ActivationPolicy::Balanced).unwrap();
        assert_eq!(parsed.multiverse, reparsed.multiverse);
        assert_eq!(
            reparsed.multiverse.boards().count(),
            parsed.multiverse.boards().count()
        );
    }

    #[test]
    fn size_tag_is_always_present() {
        let text = "[4k3/8/8/8/8/8/8/4K3:0:1:w]";
        let parsed = parse_position(text, ActivationPolicy::Balanced).unwrap();
        let serialized = generate_position(&parsed.multiverse);
        assert!(serialized.contains("[Size \"8x8\"]"));
    }
}
