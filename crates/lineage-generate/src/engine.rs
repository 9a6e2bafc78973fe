use std::any::Any;
use std::path::PathBuf;
use std::time::Instant;

use lineage_core::{FamilyTreeDocument, Sex, validate_tree};
use tracing::{info, warn};

use crate::context::GenerationContext;
use crate::errors::GenerationError;
use crate::expand::expand;
use crate::family::spawn_children;
use crate::ids::{IdAllocator, SequentialIds};
use crate::marriage::marry;
use crate::model::{GenerateOptions, GenerationReport};
use crate::names::NamePools;
use crate::output::json::{build_meta, write_document};
use crate::person::{PersonSpec, create_person};
use crate::random::{RandomSource, SeededSource};
use crate::reference::ReferenceIndex;

/// In-memory output of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedTree {
    pub document: FamilyTreeDocument,
    pub report: GenerationReport,
}

/// Result of a generation run written to disk.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub run_dir: PathBuf,
    pub document_path: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for generating family trees.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate a tree with the bundled name pools and a source seeded from
    /// the configuration.
    pub fn generate(&self, reference: &ReferenceIndex) -> Result<GeneratedTree, GenerationError> {
        let names = NamePools::load()?;
        let rng = SeededSource::from_seed(self.options.config.seed);
        self.generate_with(reference, &names, rng, SequentialIds::new())
    }

    /// Generate a tree with explicit collaborators.
    ///
    /// Two seed parents are created and married first. Their children form
    /// the root cluster, which the expander then grows; the root cluster's
    /// parent links go to the parents the expander creates.
    pub fn generate_with<R: RandomSource, I: IdAllocator>(
        &self,
        reference: &ReferenceIndex,
        names: &NamePools,
        rng: R,
        ids: I,
    ) -> Result<GeneratedTree, GenerationError> {
        let config = &self.options.config;
        config.validate()?;

        let start = Instant::now();
        let report = GenerationReport::new(String::new(), config.seed);
        let mut ctx = GenerationContext::new(rng, ids, reference, names, config, report);

        let seed_date = config.birth_seed_date;
        let seed_father = create_person(&mut ctx, PersonSpec::new(seed_date, 0, 1).sex(Sex::Male))?;
        let seed_mother =
            create_person(&mut ctx, PersonSpec::new(seed_date, 0, 1).sex(Sex::Female))?;
        marry(&mut ctx, seed_father, seed_mother)?;

        let root = spawn_children(&mut ctx, seed_mother, seed_father, true)?;
        ctx.report.root_cluster_size = root.len() as u64;
        info!(
            seed = config.seed,
            root_cluster_size = root.len(),
            ftdl = config.tree_depth_limit,
            spdl = config.sibling_partner_depth_limit,
            "expanding family tree"
        );

        expand(&mut ctx, &root, 0, 0)?;
        validate_tree(&ctx.tree)?;

        let GenerationContext { tree, mut report, .. } = ctx;
        report.total_people = tree.people.len() as u64;
        report.total_marriages = tree.marriages.len() as u64;
        report.duration_ms = start.elapsed().as_millis() as u64;

        let meta = build_meta(config, &tree, vec![seed_father, seed_mother], root.members);
        info!(
            total_people = report.total_people,
            total_marriages = report.total_marriages,
            ages_clamped = report.ages_clamped,
            "family tree generated"
        );
        Ok(GeneratedTree {
            document: FamilyTreeDocument::new(meta, tree),
            report,
        })
    }

    /// Generate and write `family_tree.json`, `resolved_config.json` and
    /// `generation_report.json` into a fresh run directory.
    pub fn run(&self, reference: &ReferenceIndex) -> Result<GenerationResult, GenerationError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
        let run_dir = self
            .options
            .out_dir
            .join(format!("{timestamp}__run_{run_id}"));
        self.run_in(reference, run_dir, &run_id)
    }

    /// Like [`run`](Self::run), writing into an existing or caller-chosen
    /// run directory.
    pub fn run_in(
        &self,
        reference: &ReferenceIndex,
        run_dir: PathBuf,
        run_id: &str,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        std::fs::create_dir_all(&run_dir)?;

        let config_path = run_dir.join("resolved_config.json");
        std::fs::write(&config_path, serde_json::to_vec_pretty(&self.options.config)?)?;

        info!(run_id = %run_id, seed = self.options.config.seed, "generation started");

        let report_path = run_dir.join("generation_report.json");
        let write_report = |report: &GenerationReport| -> Result<(), GenerationError> {
            std::fs::write(&report_path, serde_json::to_vec_pretty(report)?)?;
            Ok(())
        };

        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.generate(reference)));
        match outcome {
            Ok(Ok(generated)) => {
                let document_path = run_dir.join("family_tree.json");
                let bytes_written = write_document(&document_path, &generated.document)?;

                let mut report = generated.report;
                report.run_id = run_id.to_string();
                report.bytes_written = bytes_written;
                report.duration_ms = start.elapsed().as_millis() as u64;
                write_report(&report)?;
                info!(
                    run_id = %run_id,
                    total_people = report.total_people,
                    duration_ms = report.duration_ms,
                    bytes_written = report.bytes_written,
                    "generation completed"
                );
                Ok(GenerationResult {
                    run_dir,
                    document_path,
                    report,
                })
            }
            Ok(Err(err)) => {
                let report = failed_report(run_id, self.options.config.seed, err.to_string(), start);
                write_report(&report)?;
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
            Err(panic) => {
                let message = panic_message(panic);
                let report = failed_report(run_id, self.options.config.seed, message.clone(), start);
                write_report(&report)?;
                warn!(run_id = %run_id, "generation panicked");
                Err(GenerationError::Failed(message))
            }
        }
    }
}

fn failed_report(run_id: &str, seed: u64, message: String, start: Instant) -> GenerationReport {
    let mut report = GenerationReport::new(run_id.to_string(), seed);
    report.failure = Some(message);
    report.duration_ms = start.elapsed().as_millis() as u64;
    report
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during generation".to_string()
    }
}
