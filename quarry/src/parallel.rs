//! Independent parameter sessions on scoped worker threads.
//!
//! Every session gets its own [`RandomSource`], forked in parameter order
//! from the session configuration's root seed, so results do not depend on
//! the thread count or on scheduling.

use tracing::debug;

use crate::config::SessionConfig;
use crate::context::{GenerationContext, Parameter};
use crate::error::Result;
use crate::random::RandomSource;
use crate::repository::GeneratorRepository;

/// Configuration for parallel execution
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get().max(1),
        }
    }
}

impl ParallelConfig {
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
        }
    }
}

/// Result of one parameter's session
#[derive(Debug)]
pub struct SessionOutcome<T> {
    pub parameter: String,
    /// Seed of the session's random source, for replaying it alone
    pub seed: u64,
    pub outcome: Result<T>,
}

/// Run `session` once per parameter, spread over worker threads.
///
/// Outcomes come back in parameter order. A panic inside a session is
/// propagated to the caller once all workers have stopped.
pub fn run_sessions<T, F>(
    repository: &GeneratorRepository,
    parameters: Vec<Parameter>,
    config: &SessionConfig,
    parallel: &ParallelConfig,
    session: F,
) -> Result<Vec<SessionOutcome<T>>>
where
    T: Send,
    F: Fn(&mut GenerationContext) -> Result<T> + Sync,
{
    config.validate()?;

    let mut root = config.random_source();
    let jobs: Vec<(Parameter, u64)> = parameters
        .into_iter()
        .map(|parameter| (parameter, root.fork().seed()))
        .collect();
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    let threads = parallel.num_threads.clamp(1, jobs.len());
    let per_thread = jobs.len().div_ceil(threads);
    debug!(
        sessions = jobs.len(),
        threads,
        root_seed = root.seed(),
        "running parameter sessions"
    );

    let session = &session;
    let scoped = crossbeam::scope(|scope| {
        let handles: Vec<_> = jobs
            .chunks(per_thread)
            .map(|chunk| {
                scope.spawn(move |_| {
                    chunk
                        .iter()
                        .map(|(parameter, seed)| run_one(repository, parameter, *seed, config, session))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    });

    let joined = match scoped {
        Ok(joined) => joined,
        Err(payload) => std::panic::resume_unwind(payload),
    };

    let mut outcomes = Vec::with_capacity(jobs.len());
    for batch in joined {
        match batch {
            Ok(batch) => outcomes.extend(batch),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
    Ok(outcomes)
}

fn run_one<T, F>(
    repository: &GeneratorRepository,
    parameter: &Parameter,
    seed: u64,
    config: &SessionConfig,
    session: &F,
) -> SessionOutcome<T>
where
    F: Fn(&mut GenerationContext) -> Result<T>,
{
    let outcome = GenerationContext::resolve(
        repository,
        parameter.clone(),
        RandomSource::new(seed),
        config,
    )
    .and_then(|mut context| session(&mut context));

    SessionOutcome {
        parameter: parameter.name().to_string(),
        seed,
        outcome,
    }
}
