// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_alchemy::config::{
    apply_assignments, filter_from_args, ClientConfig, Command, CommandLineInput,
};
use notion_alchemy::{DatabaseId, ModelSchema, NotionClient, PageId, Record};
use serde_json::Value;
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_alchemy.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // stdout carries the JSON output, so log lines go to stderr
    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn load_schema(path: &std::path::Path) -> anyhow::Result<ModelSchema> {
    ModelSchema::load(path).with_context(|| format!("loading model schema {}", path.display()))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs one subcommand and prints its result as JSON.
async fn execute(client: &NotionClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Page { page, schema } => {
            let id = PageId::parse(&page)?;
            match schema {
                Some(path) => {
                    let record = client.get_record(load_schema(&path)?, &id).await?;
                    print_json(&record.to_display_json())
                }
                None => print_json(&serde_json::to_value(client.get_page(&id).await?)?),
            }
        }
        Command::Schema { database } => {
            let schema = client.infer_schema(&DatabaseId::parse(&database)?).await?;
            println!("{}", schema.to_json_pretty()?);
            Ok(())
        }
        Command::Query {
            schema,
            conditions,
            sort,
        } => {
            let schema = load_schema(&schema)?;
            let filter = filter_from_args(&schema, &conditions, &sort)?;
            let records = client.query_database(schema, &filter).await?;
            log::info!("Query returned {} record(s)", records.len());
            print_json(&Value::Array(
                records.iter().map(Record::to_display_json).collect(),
            ))
        }
        Command::Create {
            schema,
            assignments,
        } => {
            let mut record = Record::new(load_schema(&schema)?);
            apply_assignments(&mut record, &assignments)?;
            let created = client.create_page(&record).await?;
            print_json(&created.to_display_json())
        }
        Command::Update {
            schema,
            page,
            assignments,
        } => {
            let mut record =
                Record::new(load_schema(&schema)?).with_id(PageId::parse(&page)?);
            apply_assignments(&mut record, &assignments)?;
            let updated = client.update_page(&record).await?;
            print_json(&updated.to_display_json())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("logging setup failed: {}", e))?;

    let config = ClientConfig::resolve(&cli)?;
    let client = NotionClient::from_config(&config)?;

    execute(&client, cli.command).await
}
