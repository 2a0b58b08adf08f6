use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use endgame_tables::codec::Position;
use endgame_tables::pieces::{Piece, PieceSet};
use endgame_tables::table::{Tablebase, ILLEGAL, UNFORCEABLE};

/// Probe a built tablebase for one position.
#[derive(Parser, Debug)]
#[command(name = "probe")]
#[command(about = "Query a built endgame tablebase")]
struct Cli {
    /// Non-king piece codes in slot order, e.g. `WQ` or `WB WN`.
    pieces: Vec<String>,

    /// Directory holding the table files.
    #[arg(long, default_value = "tables")]
    dir: PathBuf,

    /// The position as comma-separated integers: turn (0 = White,
    /// 1 = Black), then one square per slot (64 = captured).
    #[arg(long)]
    position: String,

    /// Also load the status array and print the status bits.
    #[arg(long)]
    with_status: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut others = Vec::with_capacity(cli.pieces.len());
    for code in &cli.pieces {
        let Some(piece) = Piece::from_code(code) else {
            bail!("invalid piece code {code:?}; expected e.g. WQ, BR, WN");
        };
        others.push(piece);
    }
    let set = PieceSet::with_others(&others)?;

    let raw: Vec<u8> = cli
        .position
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("parsing position {:?}", cli.position))?;
    let Some(pos) = Position::from_raw(&raw) else {
        bail!(
            "invalid position {:?}: expected turn plus {} squares",
            cli.position,
            set.slot_count()
        );
    };

    let table = Tablebase::load(set, &cli.dir, cli.with_status)
        .with_context(|| format!("loading from {}", cli.dir.display()))?;

    println!("position: {pos}");
    let value = table.value(&pos);
    match value {
        ILLEGAL => println!("value:    illegal"),
        UNFORCEABLE => println!("value:    drawn (unforceable)"),
        0 => println!("value:    0 (side to move is mated or stalemated)"),
        v => println!("value:    {v}"),
    }
    match table.expected_winner(&pos) {
        Some(winner) => println!("winner:   {winner}"),
        None => println!("winner:   none"),
    }
    if let Some(status) = table.position_status(&pos) {
        println!("status:   {status}");
    }

    let moves = table.annotated_moves(&pos);
    if moves.is_empty() {
        println!("moves:    none");
    } else {
        println!("moves:");
        for annotated in moves {
            let winner = annotated
                .winner
                .map(|w| w.to_string())
                .unwrap_or_else(|| "none".to_string());
            let value = match annotated.value {
                ILLEGAL => "illegal".to_string(),
                UNFORCEABLE => "drawn".to_string(),
                v => v.to_string(),
            };
            println!(
                "  {:6} value {:>7}  winner {winner}",
                annotated.mv.to_string(),
                value
            );
        }
    }

    Ok(())
}
