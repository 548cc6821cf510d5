use actix_web::{web, App, HttpServer};
use clap::{value_parser, Arg, Command};
use log::{error, info};
use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;

mod errors;
mod handlers;
mod models;
mod services;
mod utils;

use models::AppState;
use services::narrator::Narrator;
use services::pacing::Pacing;
use services::sheet_loader::load_catalog;
use services::speech::{TtsFactory, VoiceSettings};

const DEFAULT_CLOSING_PHRASE: &str = "Sophia, the dictation is over now.";

fn init_logging(log_file: Option<&String>) -> io::Result<()> {
    if let Some(file) = log_file {
        let log_output = OpenOptions::new().create(true).append(true).open(file)?;

        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(log_output)))
            .init();
    } else {
        env_logger::init();
    }
    Ok(())
}

fn parse_fraction(value: &str) -> Result<f32, String> {
    let parsed: f32 = value.parse().map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("{} is outside 0.0..=1.0", parsed))
    }
}

fn parse_rate(value: &str) -> Result<f32, String> {
    let parsed: f32 = value.parse().map_err(|_| format!("'{}' is not a number", value))?;
    if parsed > 0.0 {
        Ok(parsed)
    } else {
        Err("rate must be positive".to_string())
    }
}

fn cli() -> Command {
    Command::new("dictationd")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Ron Straight <straightre@gmail.com>")
        .about("Reads vocabulary words aloud for dictation practice")
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .num_args(1)
                .default_value("./words.xlsx")
                .help("Spreadsheet with grade, semester, model, unit, category and English columns"),
        )
        .arg(
            Arg::new("sheet")
                .long("sheet")
                .num_args(1)
                .help("Worksheet to read (defaults to the first one)"),
        )
        .arg(
            Arg::new("listen-host")
                .long("listen-host")
                .num_args(1)
                .default_value("127.0.0.1:5000")
                .help("Specify the listen address (e.g., 0.0.0.0:5000)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .num_args(1)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .arg(
            Arg::new("voice-index")
                .long("voice-index")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Index of the installed voice to use"),
        )
        .arg(
            Arg::new("rate")
                .long("rate")
                .num_args(1)
                .default_value("0.5")
                .value_parser(parse_rate)
                .help("Speech rate relative to the engine's normal rate"),
        )
        .arg(
            Arg::new("volume")
                .long("volume")
                .num_args(1)
                .default_value("1.0")
                .value_parser(parse_fraction)
                .help("Speech volume from 0.0 to 1.0"),
        )
        .arg(
            Arg::new("closing-phrase")
                .long("closing-phrase")
                .num_args(1)
                .default_value(DEFAULT_CLOSING_PHRASE)
                .help("Sentence read after the last word"),
        )
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let matches = cli().get_matches();

    // Every argument below except sheet/log-file carries a default
    let arg = |name: &str| matches.get_one::<String>(name).cloned().unwrap_or_default();
    let data_file = arg("data-file");
    let listen_host = arg("listen-host");
    let closing_phrase = arg("closing-phrase");
    let sheet = matches.get_one::<String>("sheet");
    let log_file = matches.get_one::<String>("log-file");
    let settings = VoiceSettings {
        voice_index: matches.get_one::<usize>("voice-index").copied().unwrap_or(1),
        rate: matches.get_one::<f32>("rate").copied().unwrap_or(0.5),
        volume: matches.get_one::<f32>("volume").copied().unwrap_or(1.0),
    };

    init_logging(log_file)?;

    info!("Loading word data from {}", data_file);
    let catalog = load_catalog(&data_file, sheet.map(String::as_str)).map_err(|e| {
        error!("{}", e);
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;

    let narrator = Narrator::new(Arc::new(TtsFactory::new(settings)), Pacing::default(), closing_phrase);
    let state = AppState::new(catalog, narrator);

    info!("Grades: {:?}", state.options.grades);
    info!("Semesters: {:?}", state.options.semesters);
    info!("Models: {:?}", state.options.models);
    info!("Units: {:?}", state.options.units);
    info!("Categories: {:?}", state.options.categories);
    info!("Serving {} words on {}", state.catalog.len(), listen_host);

    let shared_state = web::Data::new(state);
    let server_state = shared_state.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .app_data(handlers::json_config())
            .configure(handlers::configure)
    })
    .bind(&listen_host)?
    .run()
    .await?;

    if shared_state.narrator.stop().is_ok() && !shared_state.narrator.wait_idle(Duration::from_secs(5)) {
        error!("Narration did not stop within 5 seconds of shutdown");
    }
    Ok(())
}
