#[macro_use]
extern crate log;

use clap::{value_parser, Arg, ArgMatches, Command};
use log::LevelFilter;
use molar::{build_info, Builder, Clinic, MemoryStore, Scope, SearchQuery};
use std::time::{Duration, Instant};

mod generator;
mod statistics;

use generator::Generator;
use statistics::Statistics;

#[tokio::main]
async fn main() {
    println!("{:_^41}", "MOLAR_BENCHMARK");
    println!("{}", build_info::build_info());
    env_logger::Builder::new()
        .filter_module("benchmark", LevelFilter::Debug)
        .filter_module("molar", LevelFilter::Info)
        .init();
    if let Err(e) = start_app().await {
        error!("benchmark failed: {}", e);
        std::process::exit(1);
    }
}

async fn start_app() -> molar::Result<()> {
    info!("Prepare app matches");
    let matches = prepare_matches();
    let dentists = arg(&matches, "dentists");
    let patients = arg(&matches, "patients");
    let appointments = arg(&matches, "appointments");
    let days = arg(&matches, "days");
    let queries = arg(&matches, "queries");

    info!("Generate records");
    let mut generator = Generator::new(dentists, patients, days);
    let users = generator.users();
    let records = generator.appointments(appointments);
    info!("{} users, {} appointments generated", users.len(), records.len());

    let clinic = Builder::new()
        .store(MemoryStore::with_records(users, records))
        .search_timeout(Duration::from_secs(30))
        .build()?;
    let mut statistics = Statistics::new();
    let now = Instant::now();
    clinic.init().await?;
    statistics.add("init", now.elapsed());

    info!("Start query cycle");
    for _ in 0..queries {
        run_queries(&clinic, &mut generator, &mut statistics).await?;
    }
    statistics.display();
    Ok(())
}

async fn run_queries(
    clinic: &Clinic,
    generator: &mut Generator,
    statistics: &mut Statistics,
) -> molar::Result<()> {
    let username = generator.patient();
    let now = Instant::now();
    clinic.user(&username).await?;
    statistics.add("find by username", now.elapsed());

    let date = generator.date();
    let now = Instant::now();
    clinic.by_date(&date, &Scope::All).await?;
    statistics.add("get by date", now.elapsed());

    let now = Instant::now();
    clinic.appointments(&Scope::Patient(username)).await?;
    statistics.add("range scan", now.elapsed());

    let query = SearchQuery::new()
        .dentist(generator.dentist())
        .date(date)
        .session(generator.session());
    let now = Instant::now();
    clinic.search(&query).await?;
    statistics.add("conjunctive search", now.elapsed());
    Ok(())
}

fn arg(matches: &ArgMatches, name: &str) -> usize {
    matches.get_one::<usize>(name).copied().unwrap_or_default()
}

fn prepare_matches() -> ArgMatches {
    Command::new("benchmark")
        .arg(
            Arg::new("dentists")
                .short('d')
                .default_value("20")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("patients")
                .short('p')
                .default_value("2000")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("appointments")
                .short('a')
                .default_value("20000")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("days")
                .long("days")
                .default_value("365")
                .help("spread of appointment dates")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("queries")
                .short('q')
                .default_value("100")
                .value_parser(value_parser!(usize)),
        )
        .get_matches()
}
