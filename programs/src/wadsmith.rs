use std::fs;
use std::io::Write;
use std::process;

extern crate env_logger;
#[macro_use]
extern crate log;
extern crate termcolor;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
#[macro_use]
extern crate clap;

extern crate wadsmith;
use wadsmith::errors::{Error, ErrorKind, Result};
use wadsmith::{BuildInfo, FileBuilder, QUAKE1};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => {}
        Err(err) => {
            drop(write_err(err));
            process::exit(1);
        }
    }
}

fn write_err(err: Error) -> Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(&mut stderr, "error: ")?;
    stderr.set_color(&ColorSpec::new())?;
    writeln!(&mut stderr, "{}", err)?;
    if let Some(backtrace) = err.backtrace() {
        writeln!(&mut stderr, "{:?}", backtrace)?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = clap_app!(wadsmith =>
        (about: "Assembles level containers out of raw lumps")
        (@subcommand build =>
            (about: "Write a container, filling slots from files")
            (@arg output: -o --output +takes_value +required "Output file; an existing one is backed up first")
            (@arg lump: -l --lump +takes_value +multiple "Fill a slot from a file, as SLOT=FILE; SLOT is an id or lump name")
            (@arg game: -g --game +takes_value +multiple "Game setting to record, as KEY=VALUE")
            (@arg level: -a --level +takes_value +multiple "Level architecture setting to record, as KEY=VALUE")
            (@arg style: -s --style +takes_value +multiple "Playing style setting to record, as KEY=VALUE")
        )
        (@subcommand slots =>
            (about: "List the lump slots of the container layout")
        )
    ).get_matches();

    // Dispatch!
    match args.subcommand() {
        ("build", Some(subargs)) => { do_build(&subargs)? },
        ("slots", Some(_subargs)) => { do_slots() },
        _ => {
            println!("{}", args.usage());
        },
    }

    Ok(())
}

fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    let mut parts = arg.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(format!("expected KEY=VALUE, got {:?}", arg).into()),
    }
}

fn do_build(subargs: &clap::ArgMatches) -> Result<()> {
    let output = subargs.value_of("output").unwrap_or_default();

    let mut info = BuildInfo::default();
    for &(arg, section) in [("game", "Game Settings"), ("level", "Level Architecture"), ("style", "Playing Style")].iter() {
        for setting in subargs.values_of(arg).into_iter().flat_map(|v| v) {
            let (key, value) = split_assignment(setting)?;
            info.set(section, key, value);
        }
    }

    // Read everything up front, so a missing input doesn't leave a half-built file behind
    let mut payloads: Vec<(usize, Vec<u8>)> = Vec::new();
    for spec in subargs.values_of("lump").into_iter().flat_map(|v| v) {
        let (slot, path) = split_assignment(spec)?;
        let slot = QUAKE1.parse_slot(slot)?;
        if slot == QUAKE1.info_slot() {
            return Err(format!("slot {} is reserved for build information", QUAKE1.info_lump_name).into());
        }
        if payloads.iter().any(|&(s, _)| s == slot) {
            return Err(format!("slot {} given more than once", slot).into());
        }
        let data = fs::read(path)?;
        payloads.push((slot, data));
    }

    let mut builder = FileBuilder::new(&QUAKE1, info);
    builder.start_build(output)?;
    for &(slot, ref data) in payloads.iter() {
        builder.new_lump(slot).append(data);
    }

    match builder.finish_build() {
        Ok(()) => {
            if let Some(summary) = builder.summary() {
                println!("wrote {}: {} lumps, directory at offset {}",
                    output, summary.header.entry_count, summary.header.directory_start);
            }
            Ok(())
        }
        Err(err) => {
            if let ErrorKind::ExportFailed(..) = *err.kind() {
                warn!("partially written file left at {}", output);
            }
            Err(err)
        }
    }
}

fn do_slots() {
    println!("{} layout:", QUAKE1.name);
    for slot in 0..QUAKE1.slot_count() {
        let name = QUAKE1.slot_name(slot).unwrap_or("?");
        if slot == QUAKE1.info_slot() {
            println!("{:4}  {:8}  (reserved: build information)", slot, name);
        }
        else {
            println!("{:4}  {}", slot, name);
        }
    }
}
