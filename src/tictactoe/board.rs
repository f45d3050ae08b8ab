//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '-' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    pub fn to_char(self) -> char {
        self.to_cell().to_char()
    }
}

/// Complete board state including cells and whose turn it is
///
/// This type implements `Copy` since it's only 10 bytes, and `Hash` so it
/// can index value and Q tables directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
    pub to_move: Player,
}

/// Count of each piece type on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PieceCount {
    x: usize,
    o: usize,
}

impl BoardState {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        Self::new_with_player(Player::X)
    }

    /// Create a new empty board with a specified player to move first.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttt_mdp::tictactoe::{BoardState, Player};
    ///
    /// let o_first = BoardState::new_with_player(Player::O);
    /// assert_eq!(o_first.to_move, Player::O);
    ///
    /// let after_move = o_first.make_move(4).unwrap();
    /// assert_eq!(after_move.to_move, Player::X);
    /// ```
    pub fn new_with_player(first_player: Player) -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
            to_move: first_player,
        }
    }

    fn count_pieces(cells: &[Cell; 9]) -> PieceCount {
        let mut count = PieceCount { x: 0, o: 0 };
        for cell in cells {
            match cell {
                Cell::X => count.x += 1,
                Cell::O => count.o += 1,
                Cell::Empty => {}
            }
        }
        count
    }

    /// Create a board from a string representation.
    ///
    /// The string holds 9 cells (`.`/`-` empty, `X`, `O`; whitespace is
    /// ignored) and may end with `_X` or `_O` to set the player to move.
    /// Without the suffix the turn is inferred from the piece counts, and a
    /// balanced board is taken to be X's turn.
    ///
    /// # Errors
    ///
    /// Returns error if the board is short, contains an unknown character,
    /// has impossible piece counts, or the suffix contradicts the counts.
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (board_part, suffix) = match cleaned.split_once('_') {
            Some((board, suffix)) => (board, Some(suffix)),
            None => (cleaned.as_str(), None),
        };

        let chars: Vec<char> = board_part.chars().collect();
        if chars.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: s.to_string(),
            })?;
        }

        let count = Self::count_pieces(&cells);
        let invalid_counts = || crate::Error::InvalidPieceCounts {
            x_count: count.x,
            o_count: count.o,
        };

        let to_move = match suffix {
            Some("X") | Some("x") => Player::X,
            Some("O") | Some("o") => Player::O,
            Some(other) => {
                return Err(crate::Error::InvalidPlayerString {
                    player: other.to_string(),
                    label: s.to_string(),
                });
            }
            None if count.x == count.o || count.o == count.x + 1 => Player::X,
            None if count.x == count.o + 1 => Player::O,
            None => return Err(invalid_counts()),
        };

        let consistent = match to_move {
            Player::X => count.x == count.o || count.o == count.x + 1,
            Player::O => count.x == count.o || count.x == count.o + 1,
        };
        if !consistent {
            return Err(invalid_counts());
        }

        Ok(BoardState { cells, to_move })
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        let count = Self::count_pieces(&self.cells);
        count.x + count.o
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Make a move and return a new board state
    #[must_use = "make_move returns a new board state; the original is unchanged"]
    pub fn make_move(&self, pos: usize) -> Result<BoardState, crate::Error> {
        if self.is_terminal() {
            return Err(crate::Error::GameOver);
        }
        if pos >= 9 || !self.is_empty(pos) {
            return Err(crate::Error::InvalidMove { position: pos });
        }

        let mut new_state = *self;
        new_state.cells[pos] = self.to_move.to_cell();
        new_state.to_move = self.to_move.opponent();
        Ok(new_state)
    }

    /// Get legal moves in this position (empty cells when game not terminal)
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_positions()
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// Check if the game is over (win or draw)
    pub fn is_terminal(&self) -> bool {
        self.has_won(Player::X) || self.has_won(Player::O) || !self.cells.contains(&Cell::Empty)
    }

    /// Check if the position is a draw (all cells filled, no winner)
    pub fn is_draw(&self) -> bool {
        !self.cells.contains(&Cell::Empty) && self.winner().is_none()
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        if self.has_won(Player::X) {
            Some(Player::X)
        } else if self.has_won(Player::O) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// Get a string representation for use as a key
    pub fn encode(&self) -> String {
        format!(
            "{}_{}",
            self.cells.iter().map(|&c| c.to_char()).collect::<String>(),
            self.to_move.to_char()
        )
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1) % 3 == 0 && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = BoardState::new();
        assert_eq!(board.to_move, Player::X);
        for i in 0..9 {
            assert_eq!(board.cells[i], Cell::Empty);
        }
    }

    #[test]
    fn test_make_move() {
        let board = BoardState::new();

        let new_board = board.make_move(4).unwrap();
        assert_eq!(new_board.cells[4], Cell::X);
        assert_eq!(new_board.to_move, Player::O);

        // Move on occupied cell
        let result = new_board.make_move(4);
        assert!(result.unwrap_err().to_string().contains("occupied"));
        assert!(new_board.make_move(9).is_err());
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let board = BoardState::from_string("XXX OO. ...").unwrap();
        assert!(board.is_terminal());
        assert!(board.legal_moves().is_empty());
        assert!(matches!(board.make_move(8), Err(crate::Error::GameOver)));
    }

    #[test]
    fn test_legal_moves() {
        let mut board = BoardState::new();
        assert_eq!(board.legal_moves().len(), 9);

        board = board.make_move(0).unwrap();
        assert_eq!(board.legal_moves().len(), 8);
        assert!(!board.legal_moves().contains(&0));

        board = board.make_move(4).unwrap();
        assert_eq!(board.legal_moves().len(), 7);
        assert!(!board.legal_moves().contains(&4));
    }

    #[test]
    fn test_win_detection_horizontal() {
        let mut board = BoardState::new();
        board = board.make_move(0).unwrap(); // X
        board = board.make_move(3).unwrap(); // O
        board = board.make_move(1).unwrap(); // X
        board = board.make_move(4).unwrap(); // O
        board = board.make_move(2).unwrap(); // X

        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Player::X));
    }

    #[test]
    fn test_draw_detection() {
        // XOX
        // XOO
        // OXX
        let board = BoardState::from_string("XOXXOOOXX").unwrap();
        assert!(board.is_terminal());
        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_from_string_infers_turn() {
        let board = BoardState::from_string("X.. .O. ...").unwrap();
        assert_eq!(board.to_move, Player::X);
        let board = BoardState::from_string("X.. ... ...").unwrap();
        assert_eq!(board.to_move, Player::O);
        let board = BoardState::from_string("O.. ... ...").unwrap();
        assert_eq!(board.to_move, Player::X);
    }

    #[test]
    fn test_from_string_with_turn_suffix() {
        let board = BoardState::from_string(".........").unwrap();
        assert_eq!(board.to_move, Player::X);
        let board = BoardState::from_string("........._O").unwrap();
        assert_eq!(board.to_move, Player::O);
    }

    #[test]
    fn test_from_string_rejects_bad_input() {
        assert!(matches!(
            BoardState::from_string("XX."),
            Err(crate::Error::InvalidBoardLength { .. })
        ));
        assert!(matches!(
            BoardState::from_string("XX?......"),
            Err(crate::Error::InvalidCellCharacter { position: 2, .. })
        ));
        assert!(matches!(
            BoardState::from_string("XXX......"),
            Err(crate::Error::InvalidPieceCounts { .. })
        ));
        assert!(BoardState::from_string("X........_X").is_err());
        assert!(BoardState::from_string("........._Z").is_err());
    }

    #[test]
    fn test_encode() {
        let board = BoardState::new().make_move(4).unwrap();
        assert_eq!(board.encode(), "....X...._O");
    }

    #[test]
    fn test_display() {
        let board = BoardState::from_string("X.O.X...O").unwrap();
        assert_eq!(board.to_string(), "X.O\n.X.\n..O");
    }

    #[test]
    fn test_empty_positions() {
        let board = BoardState::new().make_move(0).unwrap().make_move(8).unwrap();
        assert_eq!(board.empty_positions(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(board.occupied_count(), 2);
    }
}
