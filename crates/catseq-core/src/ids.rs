//! Board and channel identifiers.
//!
//! A [`Channel`] packs into a single 32-bit word for fast hashing and
//! grouping: `board_id:16 | kind:2 | local_id:14`. Board identifiers are a
//! small, fixed set known at plan-construction time (one master named
//! `main`, N slaves named `rwgK`); [`BoardTable`] interns them to dense
//! `u16` indices so that [`Channel`] equality and hashing never touch a
//! string.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// A board's dense identifier. Equality and hashing are on the interned
/// index, not the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardId(u16);

impl BoardId {
    /// The reserved master board, always interned first (index 0).
    pub fn main() -> BoardId {
        intern("main")
    }

    /// Intern (or look up) a board name, e.g. `"rwg0"`.
    pub fn named(name: &str) -> BoardId {
        intern(name)
    }

    /// The board's human-readable name.
    pub fn name(self) -> String {
        table().lock().unwrap().name_of(self)
    }

    /// Dense index, stable for the lifetime of the process.
    pub fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

struct BoardTable {
    by_name: HashMap<String, u16>,
    names: Vec<String>,
}

impl BoardTable {
    fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            names: Vec::new(),
        }
    }

    fn intern(&mut self, name: &str) -> BoardId {
        if let Some(&idx) = self.by_name.get(name) {
            return BoardId(idx);
        }
        let idx = self.names.len() as u16;
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), idx);
        BoardId(idx)
    }

    fn name_of(&self, id: BoardId) -> String {
        self.names[id.0 as usize].clone()
    }
}

fn table() -> &'static Mutex<BoardTable> {
    static TABLE: OnceLock<Mutex<BoardTable>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(BoardTable::new()))
}

fn intern(name: &str) -> BoardId {
    table().lock().unwrap().intern(name)
}

/// The physical kind of a channel's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelKind {
    Digital = 0,
    Waveform = 1,
}

impl ChannelKind {
    fn bits(self) -> u32 {
        self as u32
    }
}

/// An addressable output on a board: a digital line or a waveform
/// synthesiser channel.
///
/// Equality and hashing are structural over `(board, kind, local_id)`.
/// [`Channel::pack`] encodes the same triple into the wire-stable 32-bit
/// word from the hardware ABI: `board:16 | kind:2 | local_id:14`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel {
    pub board: BoardId,
    pub kind: ChannelKind,
    pub local_id: u16,
}

impl Channel {
    pub fn new(board: BoardId, kind: ChannelKind, local_id: u16) -> Channel {
        assert!(local_id < (1 << 14), "local_id {local_id} exceeds 14 bits");
        Channel { board, kind, local_id }
    }

    /// Pack into the wire-stable 32-bit word.
    pub fn pack(self) -> u32 {
        ((self.board.0 as u32) << 16) | (self.kind.bits() << 14) | (self.local_id as u32)
    }

    /// Unpack a 32-bit word into its `(board_index, kind, local_id)` parts.
    /// The board index must already be interned; this does not round-trip
    /// through board names.
    pub fn unpack_parts(word: u32) -> (u16, ChannelKind, u16) {
        let board = (word >> 16) as u16;
        let kind_bits = (word >> 14) & 0b11;
        let local_id = (word & 0x3FFF) as u16;
        let kind = if kind_bits == 0 {
            ChannelKind::Digital
        } else {
            ChannelKind::Waveform
        };
        (board, kind, local_id)
    }

    pub fn global_id(&self) -> String {
        format!("{}:{:?}:{}", self.board, self.kind, self.local_id)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.global_id())
    }
}
