//! Loading experiment documents from disk

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{Result, RlconfError};
use crate::experiment::ExperimentConfig;

/// One successfully loaded experiment: the lossless tree plus the typed
/// model derived from it
#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Document,
    pub experiment: ExperimentConfig,
}

/// Load and type one experiment file
pub fn load_path(path: impl AsRef<Path>) -> Result<Loaded> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading experiment document");
    let document = Document::from_path(path)?;
    let experiment = document.typed().map_err(|e| match e {
        RlconfError::Yaml(err) => {
            RlconfError::NotADocument(format!("{}: {}", path.display(), err))
        }
        other => other,
    })?;
    Ok(Loaded {
        document,
        experiment,
    })
}

/// Load an experiment from in-memory text
pub fn load_str(text: &str) -> Result<Loaded> {
    let document = Document::parse_str(text)?;
    let experiment = document.typed()?;
    Ok(Loaded {
        document,
        experiment,
    })
}

/// Scan a directory for experiment documents (`*.yaml` / `*.yml`),
/// non-recursively, in filename order. Each file yields its own result
/// so one broken document does not hide the rest.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, Result<Loaded>)>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        warn!(dir = %dir.display(), "no experiment documents found");
    }

    Ok(paths
        .into_iter()
        .map(|path| {
            let loaded = load_path(&path);
            (path, loaded)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
name: 'trpo_pong'
env: {name: vel.rl.env.classic_atari, game: 'PongNoFrameskip-v4'}
model:
  name: vel.rl.models.stochastic_policy_model
  backbone:
    name: vel.rl.models.backbone.nature_cnn
    input_width: 84
    input_height: 84
    input_channels: 4
reinforcer:
  name: vel.rl.reinforcers.on_policy_iteration_reinforcer
  algo: {name: vel.rl.algo.policy_gradient.trpo, max_kl: 0.01, cg_iters: 10}
  env_roller: {name: vel.rl.env_roller.vec.step_env_roller}
  parallel_envs: 8
  number_of_steps: 128
optimizer: {name: adam, lr: 1.0e-3}
commands:
  train: {name: vel.rl.commands.rl_train_command, total_frames: 1.1e7, batches_per_epoch: 100}
"#;

    #[test]
    fn test_load_str() {
        let loaded = load_str(DOC).unwrap();
        assert_eq!(loaded.experiment.name, "trpo_pong");
        assert_eq!(loaded.document.experiment_name(), Some("trpo_pong"));
    }

    #[test]
    fn test_load_dir_isolates_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.yaml"), DOC).unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: only\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a config").unwrap();

        let results = load_dir(dir.path()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].0.ends_with("broken.yaml"));
        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn test_load_missing_path() {
        assert!(matches!(
            load_path("/does/not/exist.yaml"),
            Err(RlconfError::Io(_))
        ));
    }
}
