use anyhow::Result;
use clap::{Parser, Subcommand};
use gridplan::{
    plan::{plan, PlanConfig},
    probe::probe,
    random::{eval_random, record_random},
};
use gridplan_core::record::{BufferedRecorder, RecordValue};
use gridplan_tensorboard::TensorboardRecorder;
use gridplan_toy_text::ToyTextEnvConfig;
use log::info;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reset an environment, step it with a hand-built record and time deep copies
    Probe {
        /// Environment name (CliffWalking-v0, FrozenLake-v1, FrozenLake8x8-v1)
        #[arg(long, default_value = "CliffWalking-v0")]
        env: String,

        /// Random seed
        #[arg(long, default_value_t = 0)]
        seed: i64,

        /// Action taken in the step
        #[arg(long, default_value_t = 0)]
        action: usize,

        /// Number of deep copies to time
        #[arg(long, default_value_t = 1000)]
        copies: usize,
    },

    /// Plan episodes with MCTS
    Run {
        /// YAML file of the configuration
        #[arg(long)]
        config: Option<String>,

        /// Number of episodes, overrides the configuration
        #[arg(long)]
        episodes: Option<usize>,

        /// Directory of TensorBoard logs
        #[arg(long)]
        logdir: Option<String>,
    },

    /// Evaluate the random policy
    EvalRandom {
        /// Environment name
        #[arg(long, default_value = "CliffWalking-v0")]
        env: String,

        /// Number of episodes
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Random seed
        #[arg(long, default_value_t = 0)]
        seed: i64,

        /// Episodes are truncated after this number of steps
        #[arg(long)]
        max_steps: Option<usize>,

        /// Also replay the episodes and keep a record of every step
        #[arg(long, default_value_t = false)]
        per_step: bool,
    },
}

fn run(config: Option<String>, episodes: Option<usize>, logdir: Option<String>) -> Result<()> {
    let mut config = match config {
        Some(path) => PlanConfig::load(path)?,
        None => PlanConfig::default(),
    };
    if let Some(episodes) = episodes {
        config = config.episodes(episodes);
    }
    info!("{:?}", config);

    let records = match logdir {
        Some(logdir) => plan(&config, &mut TensorboardRecorder::new(logdir))?,
        None => plan(&config, &mut BufferedRecorder::new())?,
    };

    let n = records.len().max(1) as f32;
    let mean_return = records
        .iter()
        .filter_map(|r| match r.get("episode_return") {
            Some(RecordValue::Scalar(v)) => Some(*v),
            _ => None,
        })
        .sum::<f32>()
        / n;
    info!("Mean return over {} episodes: {}", records.len(), mean_return);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Probe {
            env,
            seed,
            action,
            copies,
        } => {
            probe(&env, seed, action, copies)?;
        }
        Command::Run {
            config,
            episodes,
            logdir,
        } => run(config, episodes, logdir)?,
        Command::EvalRandom {
            env,
            episodes,
            seed,
            max_steps,
            per_step,
        } => {
            let mut config = ToyTextEnvConfig::registered(&env)?;
            if max_steps.is_some() {
                config = config.max_episode_steps(max_steps);
            }
            let record = eval_random(&config, seed, episodes)?;
            info!(
                "Random policy: mean return = {}, mean length = {}",
                record.get_scalar("episode_return")?,
                record.get_scalar("episode_length")?
            );
            if per_step {
                let mut recorder = BufferedRecorder::new();
                let returns = record_random(&config, seed, episodes, &mut recorder)?;
                info!("Returns {:?} over {} steps", returns, recorder.len());
            }
        }
    }

    Ok(())
}
