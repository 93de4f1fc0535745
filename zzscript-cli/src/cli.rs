//! Application definition.

extern crate simplelog;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{Error, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;
use zzscript::machine::script::Grammar;
use zzscript::{Board, EngineConfig, EntityId, Script, Snapshot};

use crate::util;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &'static str = env!("CARGO_PKG_AUTHORS");

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("zzscript")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .version(VERSION)
        .author(AUTHORS)
        .about("Check, inspect and run zzscript scripts from the command line.")
        .arg(Arg::with_name("verbosity")
            .long("verbosity")
            .short("v")
            .takes_value(true)
            .default_value("warn")
            .value_name("verb")
            .global(true)
            .help("Set the verbosity of the log output \
                   [possible values: none, error, warn, info, debug, trace]"))
        .arg(Arg::with_name("config")
            .long("config")
            .short("c")
            .takes_value(true)
            .value_name("path")
            .global(true)
            .help("Path to engine config file (toml or yaml)"))

        // check subcommand
        .subcommand(SubCommand::with_name("check")
            .display_order(10)
            .about("Compile scripts and report errors")
            .arg(Arg::with_name("path")
                .value_name("path")
                .required(true)
                .multiple(true)
                .help("Script files or directories containing them")))

        // dump subcommand
        .subcommand(SubCommand::with_name("dump")
            .display_order(11)
            .about("Print the compiled command list and label table of a script")
            .arg(Arg::with_name("path")
                .value_name("path")
                .required(true)
                .help("Path to the script file")))

        // run subcommand
        .subcommand(SubCommand::with_name("run")
            .display_order(20)
            .about("Run scripts on a board, one entity per script")
            .arg(Arg::with_name("path")
                .value_name("path")
                .required(true)
                .multiple(true)
                .help("Script files or directories containing them"))
            .arg(Arg::with_name("ticks")
                .long("ticks")
                .short("t")
                .takes_value(true)
                .value_name("n")
                .help("Number of steps to run, runs until interrupted if not given"))
            .arg(Arg::with_name("delay")
                .long("delay")
                .short("d")
                .takes_value(true)
                .value_name("ms")
                .default_value("0")
                .help("Pause between steps in milliseconds"))
            .arg(Arg::with_name("send")
                .long("send")
                .short("s")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .value_name("label")
                .help("Broadcast a message to all entities before the first step"))
            .arg(Arg::with_name("load")
                .long("load")
                .takes_value(true)
                .value_name("snapshot-path")
                .help("Restore board state from a snapshot before running"))
            .arg(Arg::with_name("save")
                .long("save")
                .takes_value(true)
                .value_name("snapshot-path")
                .help("Save board state to a snapshot after running")))
}

pub fn app_matches() -> ArgMatches<'static> {
    app().get_matches()
}

pub fn start(matches: ArgMatches) -> Result<()> {
    setup_log_verbosity(&matches);
    match matches.subcommand() {
        ("check", Some(m)) => start_check(m),
        ("dump", Some(m)) => start_dump(m),
        ("run", Some(m)) => start_run(m),
        _ => Ok(()),
    }
}

fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    match matches.value_of("config") {
        Some(path) => Ok(EngineConfig::from_path(&util::resolve_path(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn script_paths(matches: &ArgMatches) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    if let Some(values) = matches.values_of("path") {
        for value in values {
            paths.push(util::resolve_path(value)?);
        }
    }
    util::collect_script_paths(&paths)
}

/// Compiles a script file, rendering compile errors against the source.
fn compile_file(path: &Path, grammar: &Grammar) -> Result<Script> {
    match Script::from_file(path, grammar) {
        Ok(script) => Ok(script),
        Err(zzscript::Error::MachineError(e)) => {
            let source = fs::read_to_string(path)?;
            Err(render_error(e, &source))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(feature = "pretty_errors")]
fn render_error(e: zzscript::machine::Error, source: &str) -> Error {
    Error::msg(format!("\n{}", e.render(source)))
}

#[cfg(not(feature = "pretty_errors"))]
fn render_error(e: zzscript::machine::Error, _source: &str) -> Error {
    Error::msg(format!("\n{}", e))
}

fn start_check(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let grammar = Grammar::new(config.case_sensitive_keywords);
    let paths = script_paths(matches)?;
    let mut failed = 0;
    for path in &paths {
        match compile_file(path, &grammar) {
            Ok(script) => println!(
                "{} {} ({} commands, {} labels)",
                "ok".green(),
                script.name,
                script.commands.len(),
                script.label_indices.len()
            ),
            Err(e) => {
                failed += 1;
                println!("{} {}{}", "failed".red(), path.display(), e);
            }
        }
    }
    if failed > 0 {
        return Err(Error::msg(format!(
            "{} of {} scripts failed to compile",
            failed,
            paths.len()
        )));
    }
    Ok(())
}

fn start_dump(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let grammar = Grammar::new(config.case_sensitive_keywords);
    let path = util::resolve_path(matches.value_of("path").unwrap_or_default())?;
    let script = compile_file(&path, &grammar)?;

    // labels keyed by position, for printing alongside commands
    let mut labels_at: HashMap<usize, Vec<&str>> = HashMap::new();
    for name in script.label_names() {
        if let Some(positions) = script.label_positions(name) {
            for position in positions {
                labels_at.entry(*position).or_insert_with(Vec::new).push(name);
            }
        }
    }

    println!("{} {}", "script".bold(), script.name);
    for index in 0..=script.commands.len() {
        if let Some(names) = labels_at.get(&index) {
            for name in names {
                println!("      {}", format!(":{}", name).cyan());
            }
        }
        if let Some(command) = script.commands.get(index) {
            println!("{:>5} {:<8} {:?}", index, command.name(), command);
        }
    }
    println!("\n{}", "labels".bold());
    for name in script.label_names() {
        println!("   {} -> {:?}", name, script.label_positions(name).unwrap_or(&[]));
    }
    Ok(())
}

fn start_run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let grammar = Grammar::new(config.case_sensitive_keywords);
    let paths = script_paths(matches)?;
    info!("running scripts:{}", util::format_elements_list(&paths));

    let mut scripts = Vec::new();
    for path in &paths {
        scripts.push(Arc::new(compile_file(path, &grammar)?));
    }

    let mut board = match matches.value_of("load") {
        Some(snapshot_path) => {
            let bytes = fs::read(util::resolve_path(snapshot_path)?)?;
            let snapshot = Snapshot::from_bytes(&bytes)?;
            println!(
                "restored snapshot created at {}",
                snapshot.metadata.created.to_rfc2822()
            );
            Board::from_snapshot(snapshot, &scripts)?
        }
        None => {
            let mut board = Board::new(config.clone());
            for script in &scripts {
                board.spawn(&script.name, Some(script.clone()))?;
            }
            board
        }
    };

    if let Some(labels) = matches.values_of("send") {
        for label in labels {
            board.broadcast(label);
        }
    }

    let ticks = match matches.value_of("ticks") {
        Some(t) => Some(t.parse::<usize>()?),
        None => None,
    };
    let delay = Duration::from_millis(matches.value_of("delay").unwrap_or("0").parse()?);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut printed: HashMap<EntityId, usize> = HashMap::new();
    let mut steps = 0;
    while running.load(Ordering::SeqCst) {
        if let Some(t) = ticks {
            if steps >= t {
                break;
            }
        }
        board.step()?;
        steps += 1;
        print_new_output(&board, &mut printed);
        if !board.entities().any(|e| e.is_running() || has_messages(e)) {
            info!("all scripts stopped");
            break;
        }
        if delay.as_millis() > 0 {
            sleep(delay);
        }
    }
    println!("finished after {} steps, clock at {}", steps, board.clock());

    if let Some(snapshot_path) = matches.value_of("save") {
        let path = util::resolve_path(snapshot_path)?;
        fs::write(&path, board.to_bytes()?)?;
        println!("saved snapshot to {}", path.display());
    }
    Ok(())
}

fn has_messages(entity: &zzscript::Entity) -> bool {
    entity
        .context
        .as_ref()
        .map_or(false, |c| !c.messages().is_empty())
}

fn print_new_output(board: &Board, printed: &mut HashMap<EntityId, usize>) {
    for entity in board.entities() {
        let seen = printed.entry(entity.id).or_insert(0);
        for line in entity.output.iter().skip(*seen) {
            println!("[{}] {}: {}", board.clock(), entity.name.yellow(), line);
        }
        *seen = entity.output.len();
    }
}

fn setup_log_verbosity(matches: &ArgMatches) {
    use self::simplelog::{LevelFilter, TermLogger};
    let level_filter = match matches.value_of("verbosity") {
        Some(s) => match s {
            "0" | "none" => LevelFilter::Off,
            "1" | "err" | "error" | "min" => LevelFilter::Error,
            "2" | "warn" | "warning" | "default" => LevelFilter::Warn,
            "3" | "info" => LevelFilter::Info,
            "4" | "debug" => LevelFilter::Debug,
            "5" | "trace" | "max" | "all" => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        },
        _ => LevelFilter::Warn,
    };
    let mut config_builder = simplelog::ConfigBuilder::new();
    let logger_conf = config_builder
        .set_time_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Error)
        .set_time_format_str("%H:%M:%S%.6f")
        .build();
    let _ = TermLogger::init(level_filter, logger_conf, simplelog::TerminalMode::Mixed);
}
