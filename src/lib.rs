//! # endgame_tables
//!
//! Construction and probing of exhaustive chess **endgame tablebases** for a
//! small fixed piece set: the two kings plus up to three other pieces. For
//! every position of the set the table stores the exact game-theoretic value
//! under optimal play (mate in *n* for either side, forced material draw, or
//! unforceable).
//!
//! ## Architecture
//!
//! The codebase is structured as layered components:
//!
//! - [`board`]: the 64 board squares and the `DEAD` captured-piece sentinel.
//! - [`pieces`]: colours, piece kinds, and validated slot layouts
//!   ([`pieces::PieceSet`]).
//! - [`codec`]: the bijective mixed-radix encoding between positions and
//!   dense table indices ([`codec::IndexCodec`]).
//! - [`rules`]: attack predicates and the legal-move generator, shared by the
//!   build pipeline and by ad-hoc queries.
//! - [`table`]: the engine proper: status classification, the CSR move
//!   cache, the retrograde fixed-point solver, the pawn-promotion bridge and
//!   raw binary persistence.
//! - [`query`]: the read-only probing surface consumed by front ends.
//!
//! ## Quick start
//!
//! ```no_run
//! use endgame_tables::pieces::{Color, Piece, PieceKind, PieceSet};
//! use endgame_tables::table::{BuildLimits, Tablebase};
//!
//! let set = PieceSet::with_others(&[Piece::new(Color::White, PieceKind::Queen)])?;
//! let dir = std::path::Path::new("tables");
//! let table = Tablebase::build(set, dir, &BuildLimits::default())?;
//! # Ok::<(), endgame_tables::table::TableError>(())
//! ```
//!
//! Tables with a pawn need the post-promotion companion table (the same set
//! with the pawn replaced by a queen) already on disk; build in dependency
//! order, or let the `make_tables` binary resolve the order with
//! `--recursive`.

pub mod board;
pub mod codec;
pub mod pieces;
pub mod query;
pub mod rules;
pub mod table;
