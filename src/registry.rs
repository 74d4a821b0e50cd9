//! Selector registry
//!
//! Experiment documents are plugin-registry configuration: each selector
//! block's dotted `name` identifies an implementation in the training
//! framework, and the sibling keys are that implementation's constructor
//! parameters. The framework itself is out of scope here, but its
//! configuration surface is not: the registry records, per known name,
//! which parameters the block must and may carry, so the validator can
//! catch typos and missing arguments before a run is ever scheduled.

use std::collections::BTreeMap;

/// What role a selector plays in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Env,
    VecEnv,
    Model,
    Backbone,
    Reinforcer,
    Algo,
    EnvRoller,
    Optimizer,
    Scheduler,
    Command,
}

impl SelectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Env => "env",
            SelectorKind::VecEnv => "vec_env",
            SelectorKind::Model => "model",
            SelectorKind::Backbone => "backbone",
            SelectorKind::Reinforcer => "reinforcer",
            SelectorKind::Algo => "algo",
            SelectorKind::EnvRoller => "env_roller",
            SelectorKind::Optimizer => "optimizer",
            SelectorKind::Scheduler => "scheduler",
            SelectorKind::Command => "command",
        }
    }
}

/// Parameter contract for one known selector name
#[derive(Debug, Clone)]
pub struct SelectorSpec {
    pub kind: SelectorKind,
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl SelectorSpec {
    pub fn new(kind: SelectorKind, required: &[&str], optional: &[&str]) -> Self {
        Self {
            kind,
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Registry of known selector names
#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
    entries: BTreeMap<String, SelectorSpec>,
}

impl SelectorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry covering the selector names evidenced by the experiment
    /// corpus: Atari and Mujoco environments, CNN/MLP backbones, the
    /// policy-gradient and replay-buffered training loops, and the
    /// train/record commands.
    pub fn builtin() -> Self {
        use SelectorKind::*;

        let mut registry = Self::empty();
        let mut add = |name: &str, spec: SelectorSpec| {
            registry.register(name, spec);
        };

        // Environments
        add(
            "vel.rl.env.classic_atari",
            SelectorSpec::new(Env, &["game"], &["settings", "frame_history"]),
        );
        add(
            "vel.rl.env.mujoco",
            SelectorSpec::new(Env, &["game"], &["normalize_observations"]),
        );
        add(
            "vel.rl.env.classic_control",
            SelectorSpec::new(Env, &["game"], &[]),
        );

        // Vectorized execution
        add(
            "vel.rl.vecenv.subproc",
            SelectorSpec::new(VecEnv, &[], &["frame_history"]),
        );
        add(
            "vel.rl.vecenv.dummy",
            SelectorSpec::new(VecEnv, &[], &["frame_history"]),
        );

        // Models
        add(
            "vel.rl.models.stochastic_policy_model",
            SelectorSpec::new(Model, &["backbone"], &["input_block"]),
        );
        add(
            "vel.rl.models.q_model",
            SelectorSpec::new(Model, &["backbone"], &["input_block"]),
        );
        add(
            "vel.rl.models.deterministic_policy_model",
            SelectorSpec::new(Model, &["policy_backbone", "value_backbone"], &["input_block"]),
        );

        // Backbones
        add(
            "vel.rl.models.backbone.nature_cnn",
            SelectorSpec::new(
                Backbone,
                &["input_width", "input_height", "input_channels"],
                &[],
            ),
        );
        add(
            "vel.rl.models.backbone.mlp",
            SelectorSpec::new(
                Backbone,
                &["input_length"],
                &["hidden_layers", "activation", "normalization"],
            ),
        );

        // Training loops
        add(
            "vel.rl.reinforcers.on_policy_iteration_reinforcer",
            SelectorSpec::new(
                Reinforcer,
                &["algo", "env_roller", "parallel_envs", "number_of_steps"],
                &["batch_size", "experience_replay", "shuffle_transitions", "discount_factor"],
            ),
        );
        add(
            "vel.rl.reinforcers.buffered_off_policy_iteration_reinforcer",
            SelectorSpec::new(
                Reinforcer,
                &["algo", "env_roller"],
                &["rollout_steps", "training_steps", "parallel_envs"],
            ),
        );

        // Algorithms
        add(
            "vel.rl.algo.policy_gradient.a2c",
            SelectorSpec::new(
                Algo,
                &[],
                &[
                    "entropy_coefficient",
                    "value_coefficient",
                    "max_grad_norm",
                    "discount_factor",
                    "gae_lambda",
                ],
            ),
        );
        add(
            "vel.rl.algo.policy_gradient.ppo",
            SelectorSpec::new(
                Algo,
                &["cliprange"],
                &[
                    "entropy_coefficient",
                    "value_coefficient",
                    "max_grad_norm",
                    "discount_factor",
                    "gae_lambda",
                    "normalize_advantage",
                ],
            ),
        );
        add(
            "vel.rl.algo.policy_gradient.trpo",
            SelectorSpec::new(
                Algo,
                &["max_kl", "cg_iters"],
                &[
                    "line_search_iters",
                    "cg_damping",
                    "entropy_coef",
                    "vf_iters",
                    "discount_factor",
                    "gae_lambda",
                ],
            ),
        );
        add(
            "vel.rl.algo.ddpg",
            SelectorSpec::new(Algo, &["discount_factor"], &["tau", "max_grad_norm"]),
        );
        add(
            "vel.rl.algo.dqn",
            SelectorSpec::new(
                Algo,
                &["discount_factor"],
                &["target_update_frequency", "double_dqn", "max_grad_norm"],
            ),
        );

        // Experience collection
        add(
            "vel.rl.env_roller.vec.step_env_roller",
            SelectorSpec::new(EnvRoller, &[], &["gae_lambda", "number_of_steps"]),
        );
        add(
            "vel.rl.env_roller.single.deque_replay_roller_ou_noise",
            SelectorSpec::new(
                EnvRoller,
                &["buffer_capacity", "buffer_initial_size"],
                &["noise_std_dev", "normalize_observations"],
            ),
        );
        add(
            "vel.rl.env_roller.single.deque_replay_roller_epsgreedy",
            SelectorSpec::new(
                EnvRoller,
                &["buffer_capacity", "buffer_initial_size"],
                &["epsilon_schedule", "frame_stack"],
            ),
        );

        // Optimizers
        add(
            "adam",
            SelectorSpec::new(Optimizer, &["lr"], &["epsilon", "weight_decay", "betas"]),
        );
        add(
            "rmsprop",
            SelectorSpec::new(
                Optimizer,
                &["lr"],
                &["alpha", "epsilon", "weight_decay", "momentum"],
            ),
        );
        add(
            "sgd",
            SelectorSpec::new(
                Optimizer,
                &["lr"],
                &["momentum", "dampening", "weight_decay", "nesterov"],
            ),
        );

        // Schedulers
        add(
            "vel.scheduler.linear_batch_scaler",
            SelectorSpec::new(Scheduler, &[], &[]),
        );

        // Commands
        add(
            "vel.rl.commands.rl_train_command",
            SelectorSpec::new(
                Command,
                &["total_frames", "batches_per_epoch"],
                &["openai_logging"],
            ),
        );
        add(
            "vel.rl.commands.record_movie_command",
            SelectorSpec::new(
                Command,
                &["takes", "videoname"],
                &["fps", "sample_args"],
            ),
        );

        registry
    }

    pub fn register(&mut self, name: impl Into<String>, spec: SelectorSpec) {
        self.entries.insert(name.into(), spec);
    }

    /// Merge another registry in, overriding on name collision
    pub fn merge(&mut self, other: SelectorRegistry) {
        self.entries.extend(other.entries);
    }

    pub fn lookup(&self, name: &str) -> Option<&SelectorSpec> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
