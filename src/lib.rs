pub mod cli;
pub mod db;
pub mod error;
pub mod pairing;
pub mod report;
pub mod schedule;
pub mod settings;
mod utils;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use cli::{Cli, Commands, Strategy};
use db::{Database, StudentSchedule};
use pairing::{
    hill_climb_random_start, matching_exhaustive, matching_greedy, matching_two_greedy, Matching,
    ScoreTable, MAX_EXHAUSTIVE_ROSTER,
};
use schedule::{OverlapResult, SlotSetCodec, WeeklyAvailability, WeeklyPayload};
use settings::SettingsStore;

pub use error::ScheduleError;

const ENABLE_LOGS: bool = true;

struct AppState {
    db: Database,
    codec: SlotSetCodec,
}

impl AppState {
    /// Stored payloads pass through the codec before use so that bits
    /// outside the grid are dropped (or rejected under the strict policy).
    fn decode(&self, schedule: &StudentSchedule) -> Result<WeeklyAvailability> {
        WeeklyAvailability::from_payload(&self.codec, &schedule.availability)
            .with_context(|| format!("stored schedule for {} is unusable", schedule.email))
    }

    fn normalize(&self, schedule: &StudentSchedule) -> Result<WeeklyPayload> {
        Ok(self.decode(schedule)?.to_payload(&self.codec))
    }

    async fn roster(&self, course: &str) -> Result<(Vec<String>, Vec<WeeklyPayload>)> {
        let students = self.db.list_students(course).await?;
        if students.is_empty() {
            bail!("no schedules saved for course {course}");
        }
        let names = students.iter().map(|s| s.name.clone()).collect();
        let payloads = students
            .iter()
            .map(|s| self.normalize(s))
            .collect::<Result<Vec<_>>>()?;
        Ok((names, payloads))
    }

    async fn student(&self, course: &str, email: &str) -> Result<StudentSchedule> {
        self.db
            .get_schedule(course, email)
            .await?
            .with_context(|| format!("no schedule for {email} in {course}"))
    }
}

fn pair_up(table: &ScoreTable, strategy: Strategy, seed: u64) -> Result<Matching> {
    let matching = match strategy {
        Strategy::Greedy => matching_greedy(table),
        Strategy::TwoGreedy => matching_two_greedy(table),
        Strategy::HillClimb => {
            let mut rng = StdRng::seed_from_u64(seed);
            hill_climb_random_start(table, &mut rng)
        }
        Strategy::Exhaustive => matching_exhaustive(table)?,
    };
    Ok(matching)
}

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let settings = SettingsStore::new(cli.settings.clone())?;
    let codec = settings
        .grid()
        .codec()
        .context("grid settings do not describe a usable day")?;

    let result = match cli.command {
        Commands::Demo { students, seed } => demo(&codec, students, seed),
        command => {
            let state = AppState {
                db: Database::new(cli.db.clone())?,
                codec,
            };
            dispatch(&state, command).await
        }
    };
    if let Err(err) = &result {
        log_error!("Command failed: {err:#}");
    }
    result
}

async fn dispatch(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Courses => {
            for course in state.db.list_courses().await? {
                let count = state.db.count_students(&course).await?;
                println!("{course} ({count})");
            }
        }
        Commands::Save {
            course,
            email,
            name,
            payload,
        } => {
            let map: HashMap<String, u64> =
                serde_json::from_str(&payload).context("payload is not a day-to-integer map")?;
            let availability = WeeklyAvailability::from_payload_map(&state.codec, &map)?;
            let record = StudentSchedule::new(
                course,
                email,
                name,
                availability.to_payload(&state.codec),
            );
            state.db.upsert_schedule(&record).await?;
            log_info!(
                "Saved {} free slots for {} in {}",
                availability.total_free_slots(),
                record.email,
                record.course
            );
        }
        Commands::Show { course, email } => {
            let schedule = state.student(&course, &email).await?;
            let availability = state.decode(&schedule)?;
            println!("{} <{}>", schedule.name, schedule.email);
            print!("{}", report::week_grid(&availability));
        }
        Commands::Table { course } => {
            let (names, payloads) = state.roster(&course).await?;
            let table = ScoreTable::build(&payloads);
            print!("{}", report::overlap_table(&names, &table));
        }
        Commands::Pair {
            course,
            strategy,
            seed,
        } => {
            let (names, payloads) = state.roster(&course).await?;
            let table = ScoreTable::build(&payloads);
            let matching = pair_up(&table, strategy, seed)?;
            print!("{}", report::matching_summary(&names, &matching, &table));
        }
        Commands::Overlap { course, a, b } => {
            let first = state.student(&course, &a).await?;
            let second = state.student(&course, &b).await?;
            let result = OverlapResult::between(&state.decode(&first)?, &state.decode(&second)?);

            println!("a = {}, b = {}", first.name, second.name);
            print!("{}", report::overlap_grid(state.codec.catalog(), &result));
            for (day, labels) in result.shared_labels(&state.codec)? {
                if !labels.is_empty() {
                    println!("{day}: {}", labels.join(" "));
                }
            }
            println!("score: {}", result.score());
        }
        Commands::Demo { students, seed } => demo(&state.codec, students, seed)?,
    }
    Ok(())
}

fn demo(codec: &SlotSetCodec, students: usize, seed: u64) -> Result<()> {
    if students < 2 {
        bail!("a demo roster needs at least two students");
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let catalog = codec.shared_catalog();

    let weeks: Vec<WeeklyAvailability> = (0..students)
        .map(|_| WeeklyAvailability::random(Arc::clone(&catalog), &mut rng))
        .collect();
    let names: Vec<String> = (0..students).map(|i| format!("student{i}")).collect();
    let payloads: Vec<WeeklyPayload> = weeks.iter().map(|w| w.to_payload(codec)).collect();
    let table = ScoreTable::build(&payloads);

    println!("{}:", names[0]);
    print!("{}", report::week_grid(&weeks[0]));
    println!();
    print!("{}", report::overlap_table(&names, &table));

    println!("\ngreedy:");
    print!("{}", report::matching_summary(&names, &matching_greedy(&table), &table));

    println!("\ntwo-greedy:");
    print!("{}", report::matching_summary(&names, &matching_two_greedy(&table), &table));

    let climbed = hill_climb_random_start(&table, &mut rng);
    println!("\nhill climb:");
    print!("{}", report::matching_summary(&names, &climbed, &table));

    if students <= MAX_EXHAUSTIVE_ROSTER {
        println!("\nexhaustive:");
        print!("{}", report::matching_summary(&names, &matching_exhaustive(&table)?, &table));
    }
    Ok(())
}
