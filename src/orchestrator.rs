// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runs resolve, validate, bundle and publish for a whole configuration.

use crate::bundler::{ArtifactBundler, BundlerInstructions, BundlerRequest, JarBundler};
use crate::config::SiteConfig;
use crate::error::{P2SiteError, Result};
use crate::models::ArtifactRequest;
use crate::publisher::{
    BundlePublisher, CancellationToken, CategoryPublisher, PublisherLauncher, interrupt_token,
};
use crate::repository::index::PLUGINS_DIRECTORY;
use crate::resolver::{
    ArtifactResolver, LocalRepository, ResolutionRequest, ResolutionResult, ResolvedArtifact,
    TransitiveResolver,
};
use crate::validator;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub bundles: usize,
    pub source_warnings: usize,
    pub destination: PathBuf,
}

/// One output bundle and the artifact it is built from.
struct BundleJob<'a> {
    request: &'a ArtifactRequest,
    artifact: &'a ResolvedArtifact,
    bundle: BundlerRequest,
    instructions: BundlerInstructions,
}

pub struct Orchestrator {
    config: SiteConfig,
    resolver: Box<dyn ArtifactResolver>,
    bundler: Box<dyn ArtifactBundler>,
    launcher: PublisherLauncher,
}

impl Orchestrator {
    /// Wires the default components. Fails early if no repository root exists or
    /// the publisher program cannot be found.
    pub fn new(config: SiteConfig) -> Result<Self> {
        let repository = LocalRepository::new(config.repository_roots());
        let resolver = TransitiveResolver::new(repository)?;
        let bundler = JarBundler::new(config.pedantic);
        let program = PublisherLauncher::discover(config.publisher_program.as_deref())?;
        let launcher = PublisherLauncher::new(program, config.timeout_secs, interrupt_token());
        debug!("Using publisher {}", launcher.program().display());

        Ok(Self::with_components(
            config,
            Box::new(resolver),
            Box::new(bundler),
            launcher,
        ))
    }

    pub fn with_components(
        config: SiteConfig,
        resolver: Box<dyn ArtifactResolver>,
        bundler: Box<dyn ArtifactBundler>,
        launcher: PublisherLauncher,
    ) -> Self {
        Self {
            config,
            resolver,
            bundler,
            launcher,
        }
    }

    /// Staging is cleared before the run and removed after it, whatever the outcome.
    pub fn run(&self) -> Result<RunSummary> {
        let staging = self.config.staging_directory();
        clean_directory(&staging)?;

        let result = self.run_pipeline(&staging);

        if let Err(e) = clean_directory(&staging) {
            warn!("Failed to clean up {}: {e}", staging.display());
        }
        result
    }

    fn run_pipeline(&self, staging: &Path) -> Result<RunSummary> {
        let resolutions = self.resolve_all()?;
        let source_warnings = resolutions.iter().map(|r| r.warnings.len()).sum();

        let plugins = staging.join(PLUGINS_DIRECTORY);
        let jobs = self.plan_bundles(&resolutions, &plugins)?;

        fs::create_dir_all(&plugins)?;
        let bundles = self.bundle_all(&jobs)?;
        info!("Bundled {} artifact(s) into {}", bundles.len(), plugins.display());

        let destination = self.config.destination_directory();
        self.publish(staging, &destination)?;

        Ok(RunSummary {
            bundles: bundles.len(),
            source_warnings,
            destination,
        })
    }

    fn resolve_all(&self) -> Result<Vec<ResolutionResult>> {
        let requests: Vec<ResolutionRequest> =
            self.config.artifacts.iter().map(ResolutionRequest::from).collect();

        let results = run_bounded(&requests, self.config.workers, self.launcher.token(), |request| {
            info!("Resolving {}", request.root());
            self.resolver.resolve(request)
        })?;

        for result in &results {
            for artifact in &result.artifacts {
                info!("\t[JAR] {}", artifact.coordinate());
                if let Some(source) = &artifact.source {
                    info!("\t[SRC] {}", source.coordinate);
                }
            }
        }
        Ok(results)
    }

    /// Validates every artifact and plans one job per output file. Artifacts that
    /// land on the same file are merged into a single job.
    fn plan_bundles<'a>(
        &'a self,
        resolutions: &'a [ResolutionResult],
        plugins: &Path,
    ) -> Result<Vec<BundleJob<'a>>> {
        let mut jobs: Vec<BundleJob<'a>> = Vec::new();
        let mut planned: HashMap<String, usize> = HashMap::new();

        for (request, resolution) in self.config.artifacts.iter().zip(resolutions) {
            for artifact in &resolution.artifacts {
                validator::validate(request, artifact)?;
                let job = BundleJob {
                    request,
                    artifact,
                    bundle: BundlerRequest::new(artifact, plugins),
                    instructions: BundlerInstructions::for_artifact(request, artifact)?,
                };
                let output = self.bundler.output_name(&job.bundle, &job.instructions)?;

                match planned.get(&output).copied() {
                    Some(index) => {
                        debug!("{} already planned as {output}, merging", artifact.coordinate());
                        let merged = &mut jobs[index];
                        merge_job(merged, job, &output)?;
                        if self.bundler.output_name(&merged.bundle, &merged.instructions)? != output {
                            return Err(P2SiteError::Validation(format!(
                                "Requests for {output} cannot be combined into one bundle"
                            )));
                        }
                    }
                    None => {
                        planned.insert(output, jobs.len());
                        jobs.push(job);
                    }
                }
            }
        }
        Ok(jobs)
    }

    fn bundle_all(&self, jobs: &[BundleJob<'_>]) -> Result<Vec<PathBuf>> {
        run_bounded(jobs, self.config.workers, self.launcher.token(), |job| {
            debug!(
                "Bundling {} (requested as {})",
                job.artifact.coordinate(),
                job.request.id
            );
            self.bundler.execute(&job.bundle, &job.instructions)
        })
    }

    fn publish(&self, staging: &Path, destination: &Path) -> Result<()> {
        prepare_destination(destination)?;

        info!("Publishing bundles to {}", destination.display());
        BundlePublisher::new(
            &self.launcher,
            staging.to_path_buf(),
            destination.to_path_buf(),
            self.config.compress_site,
            self.config.additional_args(),
        )
        .execute()?;

        info!("Publishing categories");
        CategoryPublisher::new(
            &self.launcher,
            destination.to_path_buf(),
            self.config.category_file.clone(),
            self.config.additional_args(),
        )
        .execute()
    }
}

/// Folds `job` into `planned`, which writes the same `output`. A source jar is
/// kept if either side has one, and user overrides win over computed values.
/// Two different sets of either are rejected.
fn merge_job<'a>(planned: &mut BundleJob<'a>, job: BundleJob<'a>, output: &str) -> Result<()> {
    let conflict = |what: &str| {
        P2SiteError::Validation(format!(
            "{} and {} both produce {output} with different {what}",
            planned.request.id, job.request.id
        ))
    };
    let source_flags = |job: &BundleJob<'_>| (job.instructions.embed_source, job.instructions.source_bundle);

    let mut merged_source = (planned.bundle.source.clone(), source_flags(&*planned));
    if job.bundle.source.is_some() {
        if planned.bundle.source.is_none() {
            merged_source = (job.bundle.source.clone(), source_flags(&job));
        } else if source_flags(&*planned) != source_flags(&job) {
            return Err(conflict("source settings"));
        }
    }

    let mut instructions = planned.instructions.clone();
    if job.instructions.overridden {
        if !planned.instructions.overridden {
            instructions = job.instructions.clone();
        } else if !same_overrides(&planned.instructions, &job.instructions) {
            return Err(conflict("instructions"));
        }
    }

    let (source, (embed_source, source_bundle)) = merged_source;
    instructions.embed_source = embed_source;
    instructions.source_bundle = source_bundle;
    planned.bundle.source = source;
    planned.instructions = instructions;
    Ok(())
}

/// Equal apart from where sources go.
fn same_overrides(a: &BundlerInstructions, b: &BundlerInstructions) -> bool {
    BundlerInstructions {
        embed_source: b.embed_source,
        source_bundle: b.source_bundle,
        ..a.clone()
    } == *b
}

fn clean_directory(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("Removing {}", path.display());
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

fn prepare_destination(destination: &Path) -> Result<()> {
    let publishing = |action: &str, e: std::io::Error| {
        P2SiteError::Publishing(format!("Cannot {action} {}: {e}", destination.display()))
    };
    if destination.exists() {
        fs::remove_dir_all(destination).map_err(|e| publishing("remove", e))?;
    }
    fs::create_dir_all(destination).map_err(|e| publishing("create", e))
}

/// Applies `task` to every item on at most `workers` scoped threads. Results keep
/// the order of `items`. After the first failure no new items are started; the
/// error of the lowest failing index is returned. Once `token` is cancelled no new
/// items are started either and the run reports an interruption.
fn run_bounded<T, R, F>(items: &[T], workers: usize, token: &CancellationToken, task: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync,
{
    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let workers = workers.clamp(1, items.len().max(1));

    let partials = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    while !failed.load(Ordering::SeqCst) && !token.is_cancelled() {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        let result = task(item);
                        if result.is_err() {
                            failed.store(true, Ordering::SeqCst);
                        }
                        done.push((index, result));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| P2SiteError::ThreadPanic("pipeline worker".to_string()))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    if token.is_cancelled() {
        return Err(P2SiteError::Interrupted(
            "Run interrupted before all work finished".to_string(),
        ));
    }

    let mut indexed: Vec<(usize, Result<R>)> = partials.into_iter().flatten().collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}
