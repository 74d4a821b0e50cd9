//! Command-line interface
//!
//! rlconf validate <PATH>...  - Validate experiment documents
//! rlconf show <FILE>         - Parse and re-serialize one document
//! rlconf list <DIR>          - Summarize a directory of experiments
//! rlconf template <NAME>     - Print a minimal experiment skeleton

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

use crate::document::Document;
use crate::experiment::HyperValue;
use crate::loader;
use crate::registry::SelectorRegistry;
use crate::validate::{has_errors, EnvDims, Validator};

#[derive(Parser, Debug)]
#[command(name = "rlconf", about = "RL experiment configuration toolkit", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate experiment documents
    Validate {
        /// Files or directories to validate
        paths: Vec<PathBuf>,

        /// Treat unknown selector names as errors
        #[arg(long)]
        strict: bool,

        /// Observation size for backbone shape checks
        #[arg(long, requires = "act")]
        obs: Option<u64>,

        /// Action size for backbone shape checks
        #[arg(long, requires = "obs")]
        act: Option<u64>,
    },

    /// Parse one document and print it back out
    Show {
        /// Experiment file
        file: PathBuf,

        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Summarize a directory of experiment documents
    List {
        /// Directory to scan (defaults to the configured experiments dir)
        dir: Option<PathBuf>,
    },

    /// Print a minimal valid experiment skeleton
    Template {
        /// Experiment name to embed
        name: String,
    },
}

/// Run `validate` over files and directories; returns whether every
/// document came back clean of errors.
pub fn run_validate(
    paths: &[PathBuf],
    strict: bool,
    env_dims: Option<EnvDims>,
) -> Result<bool> {
    let registry = SelectorRegistry::builtin();
    let mut validator = Validator::new(&registry).strict(strict);
    if let Some(dims) = env_dims {
        validator = validator.with_env_dims(dims);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            for (file, _) in loader::load_dir(path)? {
                files.push(file);
            }
        } else {
            files.push(path.clone());
        }
    }

    let mut clean = true;
    for file in &files {
        match Document::from_path(file) {
            Ok(document) => {
                let mut issues = validator.check_document(&document);
                // surface typed-model failures alongside schema issues
                if let Err(err) = document.typed() {
                    clean = false;
                    println!("{}: error: {}", file.display(), err);
                }
                issues.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.path.cmp(&b.path)));
                if issues.is_empty() {
                    println!("{}: ok", file.display());
                } else {
                    if has_errors(&issues) {
                        clean = false;
                    }
                    for issue in &issues {
                        println!("{}: {}", file.display(), issue);
                    }
                }
            }
            Err(err) => {
                clean = false;
                println!("{}: error: {}", file.display(), err);
            }
        }
    }

    info!(files = files.len(), clean, "validation finished");
    Ok(clean)
}

/// Run `show`: parse and re-serialize one document
pub fn run_show(file: &Path, json: bool) -> Result<()> {
    let document =
        Document::from_path(file).with_context(|| format!("reading {}", file.display()))?;
    let rendered = if json {
        document.to_json()?
    } else {
        document.to_yaml()?
    };
    print!("{rendered}");
    if json {
        println!();
    }
    Ok(())
}

#[derive(Tabled)]
struct ExperimentRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Env")]
    env: String,
    #[tabled(rename = "Algo")]
    algo: String,
    #[tabled(rename = "Optimizer")]
    optimizer: String,
    #[tabled(rename = "LR")]
    lr: String,
}

/// Run `list`: one table row per experiment document in the directory
pub fn run_list(dir: &Path) -> Result<()> {
    let results = loader::load_dir(dir).with_context(|| format!("scanning {}", dir.display()))?;

    let mut rows = Vec::new();
    for (path, result) in results {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match result {
            Ok(loaded) => {
                let experiment = &loaded.experiment;
                let algo = experiment
                    .reinforcer()
                    .algo()
                    .map(|a| a.short_name().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let lr = match experiment.optimizer().learning_rate() {
                    Some(HyperValue::Scalar(lr)) => format!("{lr}"),
                    Some(HyperValue::PerGroup(groups)) => format!("{groups:?}"),
                    None => "-".to_string(),
                };
                rows.push(ExperimentRow {
                    file,
                    name: experiment.name.clone(),
                    env: experiment
                        .env
                        .str_param("game")
                        .unwrap_or(experiment.env.short_name())
                        .to_string(),
                    algo,
                    optimizer: experiment.optimizer.name.clone(),
                    lr,
                });
            }
            Err(err) => rows.push(ExperimentRow {
                file,
                name: format!("(error: {err})"),
                env: "-".to_string(),
                algo: "-".to_string(),
                optimizer: "-".to_string(),
                lr: "-".to_string(),
            }),
        }
    }

    if rows.is_empty() {
        println!("No experiment documents in {}", dir.display());
        return Ok(());
    }

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
    Ok(())
}

/// Run `template`: print a minimal valid skeleton
pub fn run_template(name: &str) -> Result<()> {
    // verify the skeleton stays valid as the registry evolves
    let text = template_text(name);
    let document = Document::parse_str(&text)?;
    let registry = SelectorRegistry::builtin();
    let issues = Validator::new(&registry).check_document(&document);
    debug_assert!(issues.is_empty(), "template drifted: {issues:?}");

    print!("{text}");
    Ok(())
}

pub(crate) fn template_text(name: &str) -> String {
    format!(
        r#"name: '{name}'

env:
  name: vel.rl.env.classic_atari
  game: 'BreakoutNoFrameskip-v4'

vec_env:
  name: vel.rl.vecenv.subproc
  frame_history: 4

model:
  name: vel.rl.models.stochastic_policy_model
  backbone:
    name: vel.rl.models.backbone.nature_cnn
    input_width: 84
    input_height: 84
    input_channels: 4

reinforcer:
  name: vel.rl.reinforcers.on_policy_iteration_reinforcer
  algo:
    name: vel.rl.algo.policy_gradient.a2c
    entropy_coefficient: 0.01
    value_coefficient: 0.5
    discount_factor: 0.99
  env_roller:
    name: vel.rl.env_roller.vec.step_env_roller
    gae_lambda: 1.0
  parallel_envs: 16
  number_of_steps: 5

optimizer:
  name: rmsprop
  lr: 7.0e-4
  alpha: 0.99
  epsilon: 1.0e-3

commands:
  train:
    name: vel.rl.commands.rl_train_command
    total_frames: 1.1e7
    batches_per_epoch: 100

  record:
    name: vel.rl.commands.record_movie_command
    takes: 10
    videoname: '{name}_vid_{{:04}}.avi'
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid() {
        let text = template_text("smoke_test");
        let document = Document::parse_str(&text).unwrap();
        let registry = SelectorRegistry::builtin();
        let issues = Validator::new(&registry).strict(true).check_document(&document);
        assert!(issues.is_empty(), "template has issues: {issues:?}");
        // and it types cleanly
        let experiment = document.typed().unwrap();
        assert_eq!(experiment.name, "smoke_test");
        let record = experiment.record_command().unwrap();
        let template = record.video_template().unwrap().unwrap();
        assert_eq!(template.render(1), "smoke_test_vid_0001.avi");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "rlconf", "validate", "configs", "--strict", "--obs", "17", "--act", "6",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate { strict, obs, act, .. } => {
                assert!(strict);
                assert_eq!(obs, Some(17));
                assert_eq!(act, Some(6));
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
