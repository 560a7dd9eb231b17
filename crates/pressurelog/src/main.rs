//! `bplog` - CLI for pressurelog
//!
//! This binary provides the command-line interface for adding, listing and
//! deleting blood pressure readings, the theme toggle, and the interactive form.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;

use pressurelog::cli::{
    interactive, AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand,
    OutputFormat, ThemeCommand,
};
use pressurelog::form::SUCCESS_MESSAGE;
use pressurelog::render::Card;
use pressurelog::session::DELETE_CONFIRM_PROMPT;
use pressurelog::{init_logging, Config, DeleteOutcome, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Config commands must work even when the database cannot be opened.
    if let Command::Config(config_cmd) = cli.command {
        return handle_config(&config, config_cmd);
    }

    let mut session = Session::open(&config)
        .with_context(|| format!("opening storage at {}", config.database_path().display()))?;

    match cli.command {
        Command::Add(add_cmd) => handle_add(&mut session, &add_cmd),
        Command::List(list_cmd) => handle_list(&session, &list_cmd),
        Command::Delete(delete_cmd) => handle_delete(&mut session, &delete_cmd),
        Command::Theme { action } => handle_theme(&mut session, action.unwrap_or_default()),
        Command::Form => Ok(interactive::run(&mut session)?),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_add(session: &mut Session, cmd: &AddCommand) -> anyhow::Result<()> {
    let record = session.add(cmd.to_fields())?;
    println!("{SUCCESS_MESSAGE}");
    println!();
    print!("{}", session.render_text(Some(0)));
    tracing::debug!("New record id {}", record.id);
    Ok(())
}

fn handle_list(session: &Session, cmd: &ListCommand) -> anyhow::Result<()> {
    match cmd.format {
        OutputFormat::Plain => print!("{}", session.render_text(None)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session.view())?),
    }
    Ok(())
}

fn handle_delete(session: &mut Session, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let outcome = session.delete(cmd.id, |record| {
        if cmd.yes {
            return Ok(true);
        }
        let card = Card::from_record(record);
        println!(
            "📅 {}  {}  {}",
            card.datetime, card.blood_pressure, card.level_label
        );
        print!("{DELETE_CONFIRM_PROMPT} [y/N] ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
    })?;

    match outcome {
        DeleteOutcome::Deleted => println!("Deleted record {}.", cmd.id),
        DeleteOutcome::Declined => println!("Kept record {}.", cmd.id),
        DeleteOutcome::NotFound => println!("No record with id {}.", cmd.id),
    }
    Ok(())
}

fn handle_theme(session: &mut Session, cmd: ThemeCommand) -> anyhow::Result<()> {
    let theme = match cmd {
        ThemeCommand::Show => session.theme().current(),
        ThemeCommand::Toggle => session.toggle_theme()?,
    };
    println!("{} {}", theme.icon(), theme);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Display]");
                println!(
                    "  Locale:         {} ({})",
                    config.display.locale,
                    config.date_locale()
                );
                println!("  Color:          {}", config.display.color);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
