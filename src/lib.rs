//! Crate root module declarations for the Quince Chess engine.
//!
//! Exposes the position model, attack tables, move generation, search,
//! driver, UCI protocol handling, and text-format helpers so the binary,
//! tests, and benches can import stable module paths.

pub mod position {
    pub mod chess_rules;
    pub mod piece_types;
    pub mod position;
    pub mod undo_record;
}

pub mod attacks {
    pub mod leaper_tables;
    pub mod magic_tables;
}

pub mod movegen {
    pub mod attack_checks;
    pub mod make_unmake;
    pub mod move_encoding;
    pub mod move_generation;
    pub mod perft;
}

pub mod search {
    pub mod evaluation;
    pub mod move_ordering;
    pub mod search_engine;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod driver {
    pub mod engine_trait;
    pub mod iterative_engine;
    pub mod time_management;
}

pub mod uci {
    pub mod uci_top;
}

pub mod utils {
    pub mod algebraic;
    pub mod board_display;
    pub mod fen_parser;
    pub mod fen_writer;
    pub mod long_algebraic;
}
