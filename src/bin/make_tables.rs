use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use endgame_tables::pieces::{Color, Piece, PieceSet};
use endgame_tables::table::{store, BuildLimits, Tablebase};

/// Build endgame tablebases and write them to disk.
#[derive(Parser, Debug)]
#[command(name = "make_tables")]
#[command(about = "Build endgame tablebases for a fixed piece set")]
struct Cli {
    /// Non-king piece codes in slot order, e.g. `WQ` or `WB WN`.
    /// The two kings are implied.
    pieces: Vec<String>,

    /// Directory holding the table files.
    #[arg(long, default_value = "tables")]
    dir: PathBuf,

    /// Build missing promotion companion tables first.
    #[arg(long)]
    recursive: bool,

    /// Rebuild even if the table files already exist.
    #[arg(long)]
    force: bool,

    /// Print the evaluation statistics after building.
    #[arg(long)]
    stats: bool,

    /// Successor arena entries per position.
    #[arg(long, default_value_t = 15)]
    moves_per_position: u64,

    /// Skip the codec round-trip self-check.
    #[arg(long)]
    skip_codec_check: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut others = Vec::with_capacity(cli.pieces.len());
    for code in &cli.pieces {
        let Some(piece) = Piece::from_code(code) else {
            bail!("invalid piece code {code:?}; expected e.g. WQ, BR, WN");
        };
        others.push(piece);
    }
    let set = PieceSet::with_others(&others)?;

    let limits = BuildLimits {
        moves_per_position: cli.moves_per_position,
        verify_codec: !cli.skip_codec_check,
    };

    let plan = if cli.recursive {
        build_plan(&set, &cli.dir)
    } else {
        vec![set]
    };

    for set in plan {
        if !cli.force && store::table_exists(&cli.dir, &set) {
            println!("table {} already built, skipping", set.id());
            continue;
        }
        println!("building table {}...", set.id());
        let table = Tablebase::build(set, &cli.dir, &limits)
            .with_context(|| format!("building under {}", cli.dir.display()))?;
        println!(
            "wrote {}",
            store::table_path(&cli.dir, table.set()).display()
        );

        if cli.stats {
            let evaluation = table
                .evaluation()
                .expect("a freshly built table has status bits");
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
    }

    Ok(())
}

/// Dependency-first build order: every missing promotion companion comes
/// before the set that promotes into it.
fn build_plan(set: &PieceSet, dir: &std::path::Path) -> Vec<PieceSet> {
    let mut plan = Vec::new();
    push_with_companions(set.clone(), dir, &mut plan);
    plan
}

fn push_with_companions(set: PieceSet, dir: &std::path::Path, plan: &mut Vec<PieceSet>) {
    if plan.contains(&set) {
        return;
    }
    for color in [Color::White, Color::Black] {
        if let Some(companion) = set.promotion_companion(color) {
            if !store::table_exists(dir, &companion) {
                push_with_companions(companion, dir, plan);
            }
        }
    }
    plan.push(set);
}
