// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Squares, pieces and piece placement.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Placement of the standard starting position.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// A board square. `file` and `rank` are zero-based: `a1` is `(0, 0)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// All 64 squares, `a1` first.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Self { rank, file }))
    }

    /// The square at `file`, `rank`, if both are on the board.
    #[must_use]
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { rank, file })
    }

    /// Zero-based file.
    #[must_use]
    pub fn file(self) -> u8 {
        self.file
    }

    /// Zero-based rank.
    #[must_use]
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// `rank * 8 + file`.
    #[must_use]
    pub fn index(self) -> u8 {
        self.rank * 8 + self.file
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file), self.rank + 1)
    }
}

/// Failure to read algebraic notation or a placement string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a square like `e4`.
    #[error("`{0}` is not a square")]
    Square(String),
    /// A placement needs eight ranks separated by `/`.
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    /// A rank described more or fewer than eight squares.
    #[error("rank {0} does not describe 8 squares")]
    RankWidth(u8),
    /// Not one of `KQRBNPkqrbnp`.
    #[error("unknown piece `{0}`")]
    Piece(char),
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::Square(s.to_owned());
        let &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] = s.as_bytes() else {
            return Err(invalid());
        };
        Self::new(file - b'a', rank - b'1').ok_or_else(invalid)
    }
}

/// Side to which a piece belongs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Uppercase letters.
    White,
    /// Lowercase letters.
    Black,
}

/// Kind of a piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// `K`
    King,
    /// `Q`
    Queen,
    /// `R`
    Rook,
    /// `B`
    Bishop,
    /// `N`
    Knight,
    /// `P`
    Pawn,
}

/// A colored piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Owner.
    pub color: Color,
    /// Kind.
    pub kind: PieceKind,
}

impl Piece {
    /// Reads a placement letter.
    pub fn from_symbol(symbol: char) -> Result<Self, ParseError> {
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => return Err(ParseError::Piece(symbol)),
        };
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self { color, kind })
    }

    /// The placement letter.
    #[must_use]
    pub fn symbol(self) -> char {
        let lower = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.color {
            Color::White => lower.to_ascii_uppercase(),
            Color::Black => lower,
        }
    }
}

/// Which piece stands on which square. Moves are not checked against the
/// rules of chess.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pieces: BTreeMap<Square, Piece>,
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn start() -> Self {
        match Self::from_placement(START_PLACEMENT) {
            Ok(position) => position,
            Err(_) => unreachable!("the starting placement is valid"),
        }
    }

    /// Reads the placement field of a FEN record, rank 8 first.
    pub fn from_placement(placement: &str) -> Result<Self, ParseError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ParseError::RankCount(ranks.len()));
        }
        let mut pieces = BTreeMap::new();
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0_u8;
            for symbol in text.chars() {
                if let Some(skip) = symbol.to_digit(10) {
                    file = file.saturating_add(skip as u8);
                    continue;
                }
                let piece = Piece::from_symbol(symbol)?;
                let square = Square::new(file, rank).ok_or(ParseError::RankWidth(rank + 1))?;
                pieces.insert(square, piece);
                file += 1;
            }
            if file != 8 {
                return Err(ParseError::RankWidth(rank + 1));
            }
        }
        Ok(Self { pieces })
    }

    /// The piece on `square`.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces.get(&square).copied()
    }

    /// Occupied squares and their pieces, `a1` first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces.iter().map(|(square, piece)| (*square, *piece))
    }

    /// Moves the piece on `from` to `to` and returns the piece it replaced.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.pieces.remove(&from)?;
        self.pieces.insert(to, piece)
    }

    /// The placement field of a FEN record.
    #[must_use]
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match Square::new(file, rank).and_then(|sq| self.piece_at(sq)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl fmt::Display for Position {
    /// A text diagram, rank 8 on top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let symbol = Square::new(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', Piece::symbol);
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
