use arrayvec::ArrayVec;
use std::fmt;

use crate::error::{Error, Result};

pub const MAX_SIZE: usize = 64;
pub const MAX_BOXES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Goal,
}

/// A cell coordinate: column first, then row, both counted from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(pub u8, pub u8);

impl Position {
    pub fn manhattan(self, other: Position) -> usize {
        (self.0.abs_diff(other.0) + self.1.abs_diff(other.1)) as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Successors are always generated in this order.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Single-letter code used on the wire (`U`, `D`, `L`, `R`).
    pub fn code(&self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_code(code: char) -> Option<Direction> {
        match code.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// The dynamic part of a puzzle: where the player and the boxes are.
///
/// Boxes are kept sorted, so two states with the same player and the same box
/// cells compare and hash equal no matter how they were reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    player: Position,
    boxes: ArrayVec<Position, MAX_BOXES>,
}

impl State {
    /// Panics if more than `MAX_BOXES` boxes are given.
    pub fn new(player: Position, boxes: impl IntoIterator<Item = Position>) -> Self {
        let mut boxes: ArrayVec<Position, MAX_BOXES> = boxes.into_iter().collect();
        boxes.sort_unstable();
        State { player, boxes }
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn has_box_at(&self, pos: Position) -> bool {
        self.boxes.binary_search(&pos).is_ok()
    }

    fn stepped(&self, to: Position) -> State {
        State {
            player: to,
            boxes: self.boxes.clone(),
        }
    }

    fn pushed(&self, from: Position, to: Position) -> State {
        let mut boxes = self.boxes.clone();
        if let Ok(idx) = boxes.binary_search(&from) {
            boxes[idx] = to;
            boxes.sort_unstable();
        }
        State {
            player: from,
            boxes,
        }
    }
}

/// The static part of a puzzle: walls, goals and bounds. Built once per map
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    tiles: Vec<Tile>,
    goals: Vec<Position>,
    width: u8,
    height: u8,
}

impl Game {
    /// Parse a Sokoban board from newline separated text.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - ` ` = Floor (empty space)
    /// - `.` = Goal (target location for boxes)
    /// - `$` = Box
    /// - `@` = Player
    /// - `*` = Box on goal
    /// - `+` = Player on goal
    pub fn from_text(text: &str) -> Result<(Game, State)> {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_rows(&lines)
    }

    /// Parse a Sokoban board given as rows. Rows may have different lengths;
    /// cells past the end of a short row are floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<(Game, State)> {
        if rows.is_empty() {
            return Err(Error::MalformedMap("Empty board".to_string()));
        }

        let height = rows.len();
        let width = rows
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(0);

        if width > MAX_SIZE {
            return Err(Error::MalformedMap(format!(
                "Board width {} exceeds maximum size {}",
                width, MAX_SIZE
            )));
        }
        if height > MAX_SIZE {
            return Err(Error::MalformedMap(format!(
                "Board height {} exceeds maximum size {}",
                height, MAX_SIZE
            )));
        }

        let mut tiles = vec![Tile::Floor; width * height];
        let mut goals = Vec::new();
        let mut boxes = Vec::new();
        let mut player = None;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                let pos = Position(x as u8, y as u8);
                let tile = &mut tiles[y * width + x];
                match ch {
                    '#' => *tile = Tile::Wall,
                    ' ' => {}
                    '.' => {
                        *tile = Tile::Goal;
                        goals.push(pos);
                    }
                    '$' | '*' => {
                        if boxes.len() == MAX_BOXES {
                            return Err(Error::MalformedMap(format!(
                                "More than {} boxes on board",
                                MAX_BOXES
                            )));
                        }
                        if ch == '*' {
                            *tile = Tile::Goal;
                            goals.push(pos);
                        }
                        boxes.push(pos);
                    }
                    '@' | '+' => {
                        if player.is_some() {
                            return Err(Error::MalformedMap("Multiple players found".to_string()));
                        }
                        if ch == '+' {
                            *tile = Tile::Goal;
                            goals.push(pos);
                        }
                        player = Some(pos);
                    }
                    _ => {
                        return Err(Error::MalformedMap(format!(
                            "Invalid character '{}' at position ({}, {})",
                            ch, x, y
                        )));
                    }
                }
            }
        }

        let player =
            player.ok_or_else(|| Error::MalformedMap("No player found on board".to_string()))?;

        let game = Game {
            tiles,
            goals,
            width: width as u8,
            height: height as u8,
        };
        Ok((game, State::new(player, boxes)))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    /// Cells outside the board read as walls.
    pub fn get_tile(&self, pos: Position) -> Tile {
        if pos.0 >= self.width || pos.1 >= self.height {
            return Tile::Wall;
        }
        self.tiles[pos.1 as usize * self.width as usize + pos.0 as usize]
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        self.get_tile(pos) == Tile::Goal
    }

    /// Move from `pos` in the given direction.
    /// Returns `None` if the new position would leave the board.
    pub fn move_position(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let new_x = pos.0 as i32 + dx as i32;
        let new_y = pos.1 as i32 + dy as i32;

        if new_x >= 0 && new_y >= 0 && new_x < self.width as i32 && new_y < self.height as i32 {
            Some(Position(new_x as u8, new_y as u8))
        } else {
            None
        }
    }

    fn is_free(&self, state: &State, pos: Position) -> bool {
        self.get_tile(pos) != Tile::Wall && !state.has_box_at(pos)
    }

    /// Move the player one step, pushing a box if there is one in the way.
    /// Returns the resulting state, or `None` if the move is illegal: the
    /// target is a wall, or the box beyond it would hit a wall or another box.
    pub fn apply(&self, state: &State, dir: Direction) -> Option<State> {
        let target = self.move_position(state.player, dir)?;
        if self.get_tile(target) == Tile::Wall {
            return None;
        }

        if !state.has_box_at(target) {
            return Some(state.stepped(target));
        }

        let beyond = self.move_position(target, dir)?;
        if !self.is_free(state, beyond) {
            return None;
        }
        Some(state.pushed(target, beyond))
    }

    /// All legal moves from `state`, in `ALL_DIRECTIONS` order.
    pub fn successors<'a>(
        &'a self,
        state: &'a State,
    ) -> impl Iterator<Item = (Direction, State)> + 'a {
        ALL_DIRECTIONS
            .into_iter()
            .filter_map(move |dir| self.apply(state, dir).map(|next| (dir, next)))
    }

    /// Check if all boxes are on goals (win condition)
    pub fn is_solved(&self, state: &State) -> bool {
        state.boxes.iter().all(|&pos| self.is_goal(pos))
    }

    /// Apply `path` move by move. Returns `None` at the first illegal move.
    pub fn replay(&self, state: &State, path: &[Direction]) -> Option<State> {
        path.iter()
            .try_fold(state.clone(), |current, &dir| self.apply(&current, dir))
    }

    /// Render `state` on this board using the same characters `from_text`
    /// accepts.
    pub fn display<'a>(&'a self, state: &'a State) -> Board<'a> {
        Board { game: self, state }
    }
}

pub struct Board<'a> {
    game: &'a Game,
    state: &'a State,
}

impl fmt::Display for Board<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.game.height {
            let mut line = String::new();
            for x in 0..self.game.width {
                let pos = Position(x, y);
                let tile = self.game.get_tile(pos);

                let ch = if pos == self.state.player {
                    match tile {
                        Tile::Goal => '+',
                        _ => '@',
                    }
                } else if self.state.has_box_at(pos) {
                    match tile {
                        Tile::Goal => '*',
                        _ => '$',
                    }
                } else {
                    match tile {
                        Tile::Wall => '#',
                        Tile::Floor => ' ',
                        Tile::Goal => '.',
                    }
                };
                line.push(ch);
            }
            // Trailing spaces were never in the input
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_board() {
        let input = "####\n\
                     # .#\n\
                     #  ###\n\
                     #*@  #\n\
                     #  $ #\n\
                     #  ###\n\
                     ####";
        let (game, state) = Game::from_text(input).unwrap();

        assert_eq!(game.width(), 6);
        assert_eq!(game.height(), 7);
        assert_eq!(state.player(), Position(2, 3));
        assert_eq!(state.boxes(), &[Position(1, 3), Position(3, 4)]);
        assert_eq!(game.goals(), &[Position(2, 1), Position(1, 3)]);
    }

    #[test]
    fn test_ragged_rows_are_floor() {
        let rows = ["#####", "#@$.", "####"];
        let (game, state) = Game::from_rows(&rows).unwrap();
        assert_eq!(game.width(), 5);
        assert_eq!(game.get_tile(Position(4, 1)), Tile::Floor);
        assert_eq!(state.box_count(), 1);
    }

    #[test]
    fn test_no_player() {
        let input = "####\n\
                     #  #\n\
                     ####";
        assert!(matches!(
            Game::from_text(input),
            Err(Error::MalformedMap(_))
        ));
    }

    #[test]
    fn test_multiple_players() {
        let input = "####\n\
                     #@@#\n\
                     ####";
        assert!(matches!(
            Game::from_text(input),
            Err(Error::MalformedMap(_))
        ));
    }

    #[test]
    fn test_invalid_character() {
        let input = "####\n\
                     #@x#\n\
                     ####";
        assert!(matches!(
            Game::from_text(input),
            Err(Error::MalformedMap(_))
        ));
    }

    #[test]
    fn test_empty_board() {
        let rows: [&str; 0] = [];
        assert!(Game::from_rows(&rows).is_err());
    }

    #[test]
    fn test_player_on_goal() {
        let input = "####\n\
                     #$+ #\n\
                     #$. #\n\
                     ####";
        let (game, state) = Game::from_text(input).unwrap();
        assert_eq!(state.player(), Position(2, 1));
        assert_eq!(game.get_tile(Position(2, 1)), Tile::Goal);
    }

    #[test]
    fn test_display() {
        let input = "####\n\
                     # .#\n\
                     #  ###\n\
                     #*@  #\n\
                     #  $ #\n\
                     #  ###\n\
                     ####";
        let (game, state) = Game::from_text(input).unwrap();
        let output = game.display(&state).to_string();
        assert_eq!(output.trim(), input);
    }

    #[test]
    fn test_is_solved() {
        let solved = "####\n\
                      #*@#\n\
                      ####";
        let (game, state) = Game::from_text(solved).unwrap();
        assert!(game.is_solved(&state));

        let unsolved = "####\n\
                        #$.#\n\
                        # @#\n\
                        ####";
        let (game, state) = Game::from_text(unsolved).unwrap();
        assert!(!game.is_solved(&state));
    }

    #[test]
    fn test_solved_ignores_empty_goals() {
        // One box on a goal, one spare goal: every box is placed.
        let input = "#####\n\
                     #*@.#\n\
                     #####";
        let (game, state) = Game::from_text(input).unwrap();
        assert!(game.is_solved(&state));
    }

    #[test]
    fn test_step_into_floor() {
        let input = "#####\n\
                     #@  #\n\
                     #####";
        let (game, state) = Game::from_text(input).unwrap();
        let next = game.apply(&state, Direction::Right).unwrap();
        assert_eq!(next.player(), Position(2, 1));
        assert_eq!(state.player(), Position(1, 1));
        assert!(game.apply(&state, Direction::Left).is_none());
        assert!(game.apply(&state, Direction::Up).is_none());
    }

    #[test]
    fn test_push_all_directions() {
        let tests = [
            (Direction::Right, "####\n#@$ #\n# . #\n####", Position(3, 1)),
            (Direction::Down, "#####\n# @ #\n# $ #\n# . #\n#####", Position(2, 3)),
            (Direction::Left, "####\n# $@#\n# . #\n####", Position(1, 1)),
            (Direction::Up, "#####\n# . #\n# $ #\n# @ #\n#####", Position(2, 1)),
        ];

        for (direction, input, expected_box) in tests {
            let (game, state) = Game::from_text(input).unwrap();
            let box_pos = state.boxes()[0];
            let next = game.apply(&state, direction).unwrap();
            assert_eq!(next.player(), box_pos, "Failed for {:?}", direction);
            assert_eq!(next.boxes(), &[expected_box], "Failed for {:?}", direction);
        }
    }

    #[test]
    fn test_push_blocked_by_wall() {
        let input = "#####\n\
                     #@$##\n\
                     # . #\n\
                     #####";
        let (game, state) = Game::from_text(input).unwrap();
        assert!(game.apply(&state, Direction::Right).is_none());
    }

    #[test]
    fn test_push_blocked_by_box() {
        let input = "#######\n\
                     #@$$  #\n\
                     # ..  #\n\
                     #######";
        let (game, state) = Game::from_text(input).unwrap();
        assert!(game.apply(&state, Direction::Right).is_none());
    }

    #[test]
    fn test_board_edge_acts_as_wall() {
        let rows = ["@$", "."];
        let (game, state) = Game::from_rows(&rows).unwrap();
        assert!(game.apply(&state, Direction::Right).is_none());
        assert!(game.apply(&state, Direction::Up).is_none());
        assert!(game.apply(&state, Direction::Left).is_none());
        assert!(game.apply(&state, Direction::Down).is_some());
    }

    #[test]
    fn test_successors_order() {
        let input = "#####\n\
                     #   #\n\
                     # @ #\n\
                     #   #\n\
                     #####";
        let (game, state) = Game::from_text(input).unwrap();
        let dirs: Vec<Direction> = game.successors(&state).map(|(dir, _)| dir).collect();
        assert_eq!(dirs, ALL_DIRECTIONS.to_vec());
    }

    #[test]
    fn test_state_equality_is_structural() {
        let a = State::new(Position(1, 1), [Position(3, 2), Position(2, 2)]);
        let b = State::new(Position(1, 1), [Position(2, 2), Position(3, 2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_replay() {
        let input = "######\n\
                     #@$ .#\n\
                     ######";
        let (game, state) = Game::from_text(input).unwrap();
        let end = game.replay(&state, &[Direction::Right, Direction::Right]).unwrap();
        assert!(game.is_solved(&end));
        assert!(game.replay(&state, &[Direction::Left]).is_none());
    }

    #[test]
    fn test_direction_codes() {
        for dir in ALL_DIRECTIONS {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code('x'), None);
    }
}
