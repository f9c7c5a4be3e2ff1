use clap::Parser;
use dotenv::dotenv;
use log::{debug, error, info, LevelFilter};

use bookstore::seed::sample_books;
use bookstore::QueryFacade;
use config::{Config, ConfigError};

use crate::tasks::Task;

mod tasks;

#[derive(Parser, Debug)]
struct Args {
    /// Task group to run
    #[arg(short, long, value_enum, default_value_t = Task::All)]
    task: Task,

    /// Insert the sample books when the collection is empty
    #[arg(short, long)]
    seed: bool,

    /// Config file path; environment variables are used when omitted
    #[arg(short, long)]
    config: Option<String>,
}

fn load_config(args: &Args) -> Result<Config, ConfigError> {
    match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("Failed to initialise logger: {}", e);
    }

    let args = Args::parse();
    debug!("Args: {:?}", args);

    // Load configuration from a yaml file or the environment
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("DB_NAME: {}, COLLECTION_NAME: {}", config.db_name, config.collection_name);

    info!("Starting MongoDB queries");
    let facade = match QueryFacade::connect(&config).await {
        Ok(facade) => facade,
        Err(e) => {
            error!("Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    if args.seed {
        if let Err(e) = facade.seed_if_empty(&sample_books()).await {
            error!("Failed to insert sample books: {}", e);
        }
    }

    let failed = tasks::run(&facade, args.task).await;

    if let Err(e) = facade.close().await {
        error!("Failed to close MongoDB connection: {}", e);
    }

    if failed == 0 {
        info!("All MongoDB queries completed successfully");
    } else {
        error!("{} task group(s) failed", failed);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use crate::tasks::Task;

    #[test]
    fn test_args_default_to_all_tasks_from_env() {
        let args = Args::try_parse_from(["bookstore-queries"]).unwrap();
        assert_eq!(args.task, Task::All);
        assert!(!args.seed);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_select_a_single_task() {
        let args =
            Args::try_parse_from(["bookstore-queries", "--task", "indexing", "--seed"]).unwrap();
        assert_eq!(args.task, Task::Indexing);
        assert!(args.seed);
    }
}
