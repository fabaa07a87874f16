//! Command line front end for quick checks without the web server

use std::env;
use std::fs;
use std::process;

use chess_commentary_core::notation::render_board;
use chess_commentary_core::{Analyzer, AppConfig};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let config = AppConfig::from_env();
    let analyzer = Analyzer::with_engine(config.engine.clone());

    match args[1].as_str() {
        "eval" => {
            let Some(fen) = args.get(2) else {
                println!("Error: Please provide a FEN string");
                println!("Usage: {} eval \"<fen>\" [depth] [multipv]", args[0]);
                process::exit(1);
            };
            let depth = number_arg(&args, 3).unwrap_or(config.engine.default_depth);
            let multipv = number_arg(&args, 4).unwrap_or(config.engine.default_multipv);
            eval_position(&analyzer, fen, depth, multipv);
        }
        "sweep" => {
            let Some(path) = args.get(2) else {
                println!("Error: Please provide a PGN file");
                println!("Usage: {} sweep <pgn_file> [depth]", args[0]);
                process::exit(1);
            };
            let depth = number_arg(&args, 3).unwrap_or(config.engine.default_depth);
            sweep_game(&analyzer, path, depth);
        }
        "test-engine" => {
            println!("Testing engine at {}...", config.engine.path.display());
            eval_position(&analyzer, START_FEN, 12, 1);
        }
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn number_arg<T: std::str::FromStr>(args: &[String], index: usize) -> Option<T> {
    args.get(index).and_then(|a| a.parse().ok())
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [arguments]", program);
    println!();
    println!("Commands:");
    println!("  eval \"<fen>\" [depth] [multipv]   Show the engine's top lines");
    println!("  sweep <pgn_file> [depth]         List mistakes and blunders in a game");
    println!("  test-engine                      Check the engine can be started");
    println!();
    println!("The engine is taken from STOCKFISH_PATH (default /usr/games/stockfish).");
}

fn eval_position(analyzer: &Analyzer, fen: &str, depth: u8, multipv: u32) {
    match render_board(fen) {
        Ok(board) => println!("{}\n", board),
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    }

    match analyzer.analyze_position(fen, depth, multipv) {
        Ok(report) => {
            println!("Depth {}, {} line(s):", report.depth, report.multipv);
            println!("{}", report.engine_lines);
        }
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    }
}

fn sweep_game(analyzer: &Analyzer, path: &str, depth: u8) {
    let pgn = match fs::read_to_string(path) {
        Ok(p) => p,
        Err(e) => {
            println!("[ERROR] Could not read {}: {}", path, e);
            process::exit(1);
        }
    };

    let report = match analyzer.analyze_sweep(&pgn, depth) {
        Ok(r) => r,
        Err(e) => {
            println!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    println!("{}", report.game_summary);
    println!("----------------------------------------");
    if report.critical_moments.is_empty() {
        println!("No major mistakes or blunders found!");
    }
    for moment in &report.critical_moments {
        println!(
            "{:<8} {}{} {}  (loss {:.2}, best {} at {:+.2})",
            moment.classification.as_str(),
            moment.move_number,
            if moment.side == chess_commentary_core::sweep::Side::White { "." } else { "..." },
            moment.played,
            moment.delta_eval,
            moment.best_move,
            moment.best_eval,
        );
    }
}
