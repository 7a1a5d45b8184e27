// Per-tick text protocol
//
// Input, whitespace separated:
//   <remaining_ticks> <controlled_snake_id>
//   <object_count>
//     <row> <col> <code>          code 1..=21 score, -1 growth, -2 trap, -4 wall
//   <snake_count>
//     <id> <name> <length> <score> <last_action> <shield_cooldown> <shield_time>
//     <row> <col>                 repeated <length> times, head first
//
// Output is the numeric action code on a line of its own.

use std::collections::VecDeque;
use std::fmt::Display;
use std::str::FromStr;

use crate::config::BoardConfig;
use crate::game::{Game, SnakeInfo};
use crate::types::{Action, ObjectTag, Point};

/// Token cursor that remembers which line each token came from
struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(|(n, line)| line.split_whitespace().map(move |t| (n + 1, t)))
            .collect();
        Tokens {
            tokens,
            position: 0,
        }
    }

    fn next<T>(&mut self, what: &str) -> Result<T, String>
    where
        T: FromStr,
        T::Err: Display,
    {
        let (line, token) = *self
            .tokens
            .get(self.position)
            .ok_or_else(|| format!("input ended while reading {}", what))?;
        self.position += 1;
        token
            .parse()
            .map_err(|e| format!("line {}: invalid {} '{}': {}", line, what, token, e))
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.position.saturating_sub(1))
            .map_or(0, |(line, _)| *line)
    }
}

/// Rebuilds the full game state from one tick of protocol input
pub fn parse_game(text: &str, board: &BoardConfig) -> Result<Game, String> {
    let mut tokens = Tokens::new(text);

    let remaining_ticks: u32 = tokens.next("remaining ticks")?;
    let my_id: i32 = tokens.next("controlled snake id")?;
    let mut game = Game::new(board.height, board.width, remaining_ticks, 0);

    let object_count: usize = tokens.next("object count")?;
    for _ in 0..object_count {
        let row: i32 = tokens.next("object row")?;
        let col: i32 = tokens.next("object column")?;
        let code: i64 = tokens.next("object type")?;
        let object = ObjectTag::from_code(code)
            .ok_or_else(|| format!("line {}: unknown object type {}", tokens.line(), code))?;
        game.place_object(Point::new(row, col), object)
            .map_err(|e| format!("line {}: {}", tokens.line(), e))?;
    }

    let snake_count: usize = tokens.next("snake count")?;
    let mut me = None;
    for _ in 0..snake_count {
        let id: i32 = tokens.next("snake id")?;
        let name: String = tokens.next("snake name")?;
        let length: usize = tokens.next("snake length")?;
        let score: i32 = tokens.next("snake score")?;
        let action_code: i64 = tokens.next("last action")?;
        let last_action = Action::from_code(action_code)
            .ok_or_else(|| format!("line {}: unknown action code {}", tokens.line(), action_code))?;
        let shield_cooldown: u32 = tokens.next("shield cooldown")?;
        let shield_time: u32 = tokens.next("shield time")?;

        let mut body = VecDeque::with_capacity(length);
        for _ in 0..length {
            let row: i32 = tokens.next("body row")?;
            let col: i32 = tokens.next("body column")?;
            body.push_back(Point::new(row, col));
        }

        let index = game
            .add_snake(SnakeInfo {
                id,
                alive: true,
                name,
                score,
                last_action,
                shield_cooldown,
                shield_time,
                body,
            })
            .map_err(|e| format!("line {}: {}", tokens.line(), e))?;
        if id == my_id {
            me = Some(index);
        }
    }

    game.me = me.ok_or_else(|| format!("controlled snake {} is not in the snake list", my_id))?;
    Ok(game)
}

/// Wire form of an action
pub fn encode_action(action: Action) -> String {
    action.code().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const SAMPLE: &str = "\
120 7
3
5 6 3
0 0 -4
2 2 -1
2
4 rival 2 10 1 0 0
8 8
9 8
7 me 1 25 2 3 1
5 5
";

    fn board() -> BoardConfig {
        Config::default_hardcoded().board
    }

    #[test]
    fn test_parse_sample_tick() {
        let game = parse_game(SAMPLE, &board()).unwrap();

        assert_eq!(game.remaining_ticks, 120);
        assert_eq!(game.me, 1);
        assert_eq!(game.cells[Point::new(5, 6)].object, ObjectTag::Score(3));
        assert_eq!(game.cells[Point::new(0, 0)].object, ObjectTag::Wall);
        assert_eq!(game.cells[Point::new(2, 2)].object, ObjectTag::Growth);

        let me = game.my_snake();
        assert_eq!(me.name, "me");
        assert_eq!(me.score, 25);
        assert_eq!(me.last_action, Action::Right);
        assert_eq!(me.shield_cooldown, 3);
        assert_eq!(me.shield_time, 1);
        assert_eq!(game.cells[Point::new(9, 8)].snake, Some(0));
    }

    #[test]
    fn test_unknown_object_type_is_rejected() {
        let err = parse_game("10 1\n1\n0 0 9\n0\n", &board()).unwrap_err();
        assert!(err.contains("line 3"), "{}", err);
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let err = parse_game("10 1\n1\n0 0\n", &board()).unwrap_err();
        assert!(err.contains("input ended"), "{}", err);
    }

    #[test]
    fn test_missing_controlled_snake_is_rejected() {
        let err = parse_game("10 1\n0\n1\n2 x 1 0 0 0 0\n3 3\n", &board()).unwrap_err();
        assert!(err.contains("controlled snake 1"), "{}", err);
    }

    #[test]
    fn test_offboard_body_is_rejected() {
        let err = parse_game("10 1\n0\n1\n1 me 1 0 0 0 0\n-1 3\n", &board()).unwrap_err();
        assert!(err.contains("outside the board"), "{}", err);
    }

    #[test]
    fn test_encode_action() {
        assert_eq!(encode_action(Action::Shield), "4");
        assert_eq!(encode_action(Action::Left), "0");
    }
}
