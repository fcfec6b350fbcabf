// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Upload email messages from a directory using IMAP APPEND.
//!
//! Usage:
//!   imap-upload <INPUT_DIR>                  # log to stderr
//!   imap-upload <INPUT_DIR> --log upload.log # log to a file
//!   imap-upload <INPUT_DIR> --json           # also print results as JSON lines
//!
//! Exit codes:
//!   0 - Run completed (individual messages may still have failed)
//!   1 - Configuration error (e.g. IMAP_HOSTNAME or IMAP_USERNAME not set)
//!   2 - Could not connect or log in
//!   3 - Input directory cannot be read

use clap::Parser;
use env_logger::{Env, Target};
use log::error;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::exit;

use imap_upload::app;
use imap_upload::config::Settings;
use imap_upload::imap;

#[derive(Parser)]
#[command(name = "imap-upload", about = "Upload email messages using IMAP append")]
struct Cli {
    /// Read email messages from directory
    input_dir: PathBuf,

    /// Log file (appended to; created if missing)
    #[arg(long)]
    log: Option<PathBuf>,

    /// TOML file with IMAP settings; IMAP_* environment variables take precedence
    #[arg(long, env = "IMAP_UPLOAD_CONFIG")]
    config: Option<String>,

    /// Print each result as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| writeln!(buf, "{}", record.args()));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log.as_ref()) {
        eprintln!("Cannot open log file: {}", e);
        exit(1);
    }

    let json = cli.json;
    let outcome = app::execute(
        || Settings::load(cli.config.as_deref()),
        &cli.input_dir,
        |settings| async move { imap::establish(&settings).await },
        |result| {
            log::info!("{}", result);
            if json {
                match serde_json::to_string(result) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Could not serialize result for {}: {}", result.filename, e),
                }
            }
        },
    )
    .await;

    if let Err(e) = outcome {
        error!("{}", e);
        exit(e.exit_code());
    }
}
