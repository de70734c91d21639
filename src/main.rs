use chrono::Local;
use flexi_logger::{FileSpec, Logger};
use geodiff::display;
use geodiff::groups::{self, infer_groups};
use geodiff::matrix::ExpressionMatrix;
use geodiff::param::{self, Param};
use geodiff::session::{Command, Outcome, Session};
use geodiff::stats;
use log::{debug, error, info, warn};
use std::env;
use std::io::{BufRead, Lines, StdinLock, Write};
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    let args: Vec<String> = env::args().collect();
    let param_path = args.get(1).cloned().unwrap_or_else(|| "param.yaml".to_string());
    let param: Param = match param::get(param_path.clone()) {
        Ok(param) => param,
        Err(e) => {
            eprintln!("[!] Could not read parameter file '{}': {}", param_path, e);
            exit(1);
        }
    };

    let mut logger = match Logger::try_with_env_or_str(&param.general.log_level) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("[!] Could not set up logging: {}", e);
            exit(1);
        }
    };
    if !param.general.log_base.is_empty() {
        logger = logger.log_to_file(
            FileSpec::default()
                .basename(param.general.log_base.clone())
                .suffix(param.general.log_suffix.clone()),
        );
    }
    let _logger_handle = match logger.start() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("[!] Could not start logger: {}", e);
            exit(1);
        }
    };

    let version = match option_env!("GEODIFF_GIT_SHA") {
        Some(sha) => format!("{}#{}", env!("CARGO_PKG_VERSION"), sha),
        None => env!("CARGO_PKG_VERSION").to_string(),
    };
    info!(
        "geodiff {} session started at {}",
        version,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted)) {
        warn!("Could not install the interrupt handler: {}", e);
    }

    let matrix = match ExpressionMatrix::load(&param.input.path, &param.input) {
        Ok(matrix) => matrix,
        Err(e) => {
            error!("{}", e);
            eprintln!("[!] Error: {}", e);
            exit(1);
        }
    };
    debug!("{}", matrix);

    let mapping = infer_groups(&param.input.path);
    let session = Session::new(&matrix, &mapping, param.general.n_search_results);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    while !interrupted.load(Ordering::Relaxed) {
        println!();
        println!("***** GENE EXPRESSION COMPARISON TOOL *****");
        println!("Available organs/tissues: {}", mapping.sorted_labels().join(" | "));
        println!("1. Search for a gene/probe id");
        println!("2. Compare two organs");
        println!("3. Exit");

        let choice = match prompt(&mut lines, "Action (1-3): ") {
            Some(choice) => choice,
            None => break,
        };
        let command = match choice.as_str() {
            "1" => {
                match prompt(&mut lines, "Search term: ") {
                    Some(term) => Command::Search(term),
                    None => break,
                }
            }
            "2" => {
                let (Some(probe), Some(group1), Some(group2)) = (
                    prompt(&mut lines, "Enter probe id: "),
                    prompt(&mut lines, "Enter group 1 name: "),
                    prompt(&mut lines, "Enter group 2 name: "),
                ) else {
                    break;
                };
                Command::Compare {
                    probe,
                    group1: groups::capitalize(&group1),
                    group2: groups::capitalize(&group2),
                }
            }
            "3" => Command::Quit,
            other => {
                println!("[!] Unknown choice '{}'.", other);
                continue;
            }
        };

        match session.dispatch(command) {
            Outcome::Matches(matches) => {
                println!("Top matches:");
                for probe in &matches {
                    println!(" - {}", probe);
                }
                if matches.is_empty() {
                    println!(" (none)");
                }
            }
            Outcome::Comparison(result) => {
                println!("\n{}", display::format_result(&result));
                print_boxplot(&session, &result, param.general.display_colorful);
            }
            Outcome::Failed(e) => println!("[!] Error: {}", e),
            Outcome::Bye => {
                println!("Thank you for using the gene expression comparison tool!");
                break;
            }
        }
    }

    info!("Session closed.");
}

fn print_boxplot(session: &Session, result: &geodiff::ComparisonResult, colorful: bool) {
    // The compare that produced `result` already validated both groups
    let values1 = stats::group_values(session.matrix, session.mapping, &result.probe_id, &result.group1);
    let values2 = stats::group_values(session.matrix, session.mapping, &result.probe_id, &result.group2);
    if let (Ok(values1), Ok(values2)) = (values1, values2) {
        println!("\n{}", display::render_boxplot(result, &values1, &values2, colorful));
    }
}

/// Prompt on stdout, read one trimmed line. None on EOF or read failure
/// (e.g. an interrupted read), which ends the session.
fn prompt(lines: &mut Lines<StdinLock>, text: &str) -> Option<String> {
    print!("{}", text);
    let _ = std::io::stdout().flush();
    match lines.next() {
        Some(Ok(line)) => Some(line.trim().to_string()),
        _ => None,
    }
}
