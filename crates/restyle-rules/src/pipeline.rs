//! Pipeline coordinator.
//!
//! Each file passes through three phases in a fixed order: syntax rules,
//! local semantic rules, then global semantic rules. A global rule may
//! rewrite any file, so files of one program are processed strictly one
//! after another. The whole sequence is swept over the program until a
//! sweep changes nothing or the sweep limit is reached.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use restyle_semantic::{FileId, Program};
use restyle_syntax::{Formatter, LayoutOptions};
use tracing::{debug, info, info_span, warn};

use crate::adapter::{AdapterRegistry, LanguageAdapter};
use crate::braces::BracesAlways;
use crate::error::RuleError;
use crate::naming::{FieldNames, LocalVariables, MethodNames, PropertyNames};
use crate::qualifier::ExplicitThis;
use crate::rule::{
    GlobalSemanticRule, LocalSemanticRule, RenameDiagnostic, RuleCategory, RuleContext,
    RuleDescriptor, RuleOutcome, SyntaxRule,
};

/// Upper bound on repeated applications of one syntax rule to one file.
pub(crate) const MAX_SYNTAX_PASSES: usize = 64;

/// Tunables for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Maximum number of sweeps over the program.
    pub max_sweeps: u32,
    /// Names of rules that must not run, compared case-insensitively.
    pub disabled_rules: Vec<String>,
    /// Layout used when checking rewritten files still parse.
    pub layout: LayoutOptions,
    /// Some files of the program could not be loaded. Renames are limited
    /// to symbols that no other file can reference.
    pub incomplete_program: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_sweeps: 3,
            disabled_rules: Vec::new(),
            layout: LayoutOptions::default(),
            incomplete_program: false,
        }
    }
}

/// Cooperative cancellation, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A file whose processing failed and was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Identifier of the file.
    pub file: FileId,
    /// Path of the file.
    pub path: PathBuf,
    /// What went wrong.
    pub error: RuleError,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Final program version.
    pub program: Program,
    /// Files that failed, in the order they failed.
    pub failures: Vec<FileFailure>,
    /// Rename candidates that were skipped.
    pub diagnostics: Vec<RenameDiagnostic>,
    /// Number of sweeps performed.
    pub sweeps: u32,
    /// Whether the run stopped early because of cancellation.
    pub cancelled: bool,
}

/// Runs the rule phases over every file of a program.
pub struct Coordinator {
    syntax: Vec<Box<dyn SyntaxRule>>,
    local: Vec<Box<dyn LocalSemanticRule>>,
    global: Vec<Box<dyn GlobalSemanticRule>>,
    adapters: AdapterRegistry,
    options: PipelineOptions,
    cancellation: CancellationFlag,
}

impl Coordinator {
    /// Creates a coordinator with no rules.
    #[must_use]
    pub fn new(adapters: AdapterRegistry, options: PipelineOptions) -> Self {
        Self {
            syntax: Vec::new(),
            local: Vec::new(),
            global: Vec::new(),
            adapters,
            options,
            cancellation: CancellationFlag::default(),
        }
    }

    /// Creates a coordinator with every built-in rule and adapter.
    #[must_use]
    pub fn builtin(options: PipelineOptions) -> Self {
        Self::new(AdapterRegistry::builtin(), options)
            .with_syntax_rule(BracesAlways)
            .with_local_rule(ExplicitThis)
            .with_global_rule(FieldNames::default())
            .with_global_rule(PropertyNames::default())
            .with_global_rule(MethodNames::default())
            .with_global_rule(LocalVariables::default())
    }

    /// Adds a syntax rule, keeping the phase sorted by priority.
    #[must_use]
    pub fn with_syntax_rule(mut self, rule: impl SyntaxRule + 'static) -> Self {
        self.syntax.push(Box::new(rule));
        self.syntax.sort_by_key(|rule| rule.descriptor().order);
        self
    }

    /// Adds a local semantic rule, keeping the phase sorted by priority.
    #[must_use]
    pub fn with_local_rule(mut self, rule: impl LocalSemanticRule + 'static) -> Self {
        self.local.push(Box::new(rule));
        self.local.sort_by_key(|rule| rule.descriptor().order);
        self
    }

    /// Adds a global semantic rule, keeping the phase sorted by priority.
    #[must_use]
    pub fn with_global_rule(mut self, rule: impl GlobalSemanticRule + 'static) -> Self {
        self.global.push(Box::new(rule));
        self.global.sort_by_key(|rule| rule.descriptor().order);
        self
    }

    /// Handle that cancels this coordinator's runs.
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// All registered rules in execution order.
    #[must_use]
    pub fn rules(&self) -> Vec<(RuleCategory, RuleDescriptor)> {
        let syntax = self
            .syntax
            .iter()
            .map(|rule| (RuleCategory::Syntax, rule.descriptor()));
        let local = self
            .local
            .iter()
            .map(|rule| (RuleCategory::LocalSemantic, rule.descriptor()));
        let global = self
            .global
            .iter()
            .map(|rule| (RuleCategory::GlobalSemantic, rule.descriptor()));
        syntax.chain(local).chain(global).collect()
    }

    fn enabled(&self, name: &str) -> bool {
        !self
            .options
            .disabled_rules
            .iter()
            .any(|disabled| disabled.eq_ignore_ascii_case(name))
    }

    /// Processes every file of `program`.
    ///
    /// Failures are isolated per file: the program is rolled back to the
    /// version that existed before the failing file was started, and the
    /// run continues with the next file.
    pub fn process(&self, program: Program) -> PipelineReport {
        let mut context = RuleContext::new(self.adapters.clone())
            .with_incomplete_program(self.options.incomplete_program);
        if self.options.incomplete_program {
            warn!("program is incomplete; renaming only symbols private to one file");
        }
        let mut current = program;
        let mut failures = Vec::new();
        let mut failed = BTreeSet::new();
        let mut sweeps = 0;
        let mut cancelled = false;

        'sweeps: while sweeps < self.options.max_sweeps {
            sweeps += 1;
            let sweep_start = current.clone();
            for file in current.file_ids() {
                if self.cancellation.is_cancelled() {
                    cancelled = true;
                    break 'sweeps;
                }
                if failed.contains(&file) {
                    continue;
                }
                let diagnostics = context.diagnostics().len();
                match self.process_file(&mut context, &current, file) {
                    Ok(next) => current = next,
                    Err(error) => {
                        context.truncate_diagnostics(diagnostics);
                        let path = current
                            .file(file)
                            .map(|source| source.path().to_path_buf())
                            .unwrap_or_default();
                        warn!(path = %path.display(), %error, "file rolled back");
                        failed.insert(file);
                        failures.push(FileFailure { file, path, error });
                    }
                }
            }
            let changed = Program::changed_files(&sweep_start, &current);
            info!(sweep = sweeps, changed = changed.len(), "sweep complete");
            if changed.is_empty() {
                break;
            }
        }

        PipelineReport {
            program: current,
            failures,
            diagnostics: context.take_diagnostics(),
            sweeps,
            cancelled,
        }
    }

    fn process_file(
        &self,
        context: &mut RuleContext,
        program: &Program,
        file: FileId,
    ) -> Result<Program, RuleError> {
        let source = program.file(file)?;
        let span = info_span!("file", path = %source.path().display());
        let _entered = span.enter();
        let adapter = context.adapter_for(program, file)?;

        let mut tree = source.tree().clone();
        for rule in self.syntax.iter().filter(|rule| self.enabled(rule.descriptor().name)) {
            let name = rule.descriptor().name;
            let mut settled = false;
            for _ in 0..MAX_SYNTAX_PASSES {
                match rule.apply(&tree)? {
                    RuleOutcome::Unchanged => {
                        settled = true;
                        break;
                    }
                    RuleOutcome::Changed(next) => {
                        info!(rule = name, "rewrote file");
                        tree = next;
                    }
                }
            }
            if !settled {
                warn!(rule = name, passes = MAX_SYNTAX_PASSES, "syntax rule did not settle");
                return Err(RuleError::unsettled(name, source.path(), MAX_SYNTAX_PASSES));
            }
        }
        let mut current = program.with_tree(file, tree)?;

        for rule in self.local.iter().filter(|rule| self.enabled(rule.descriptor().name)) {
            let outcome = rule.apply(context, &current, file)?;
            if outcome.is_changed() {
                info!(rule = rule.descriptor().name, "rewrote file");
            }
            current = outcome.latest(current);
        }
        if !current.file(file)?.tree().ptr_eq(source.tree()) {
            self.check_well_formed(adapter.as_ref(), &current, file)?;
        }

        for rule in self.global.iter().filter(|rule| self.enabled(rule.descriptor().name)) {
            let before = current.clone();
            let outcome = rule.apply(context, &before, file)?;
            if let RuleOutcome::Changed(next) = &outcome {
                let touched = Program::changed_files(&before, next);
                info!(rule = rule.descriptor().name, files = touched.len(), "renamed symbols");
            }
            current = outcome.latest(before);
        }
        debug!(version = current.version(), "file complete");
        Ok(current)
    }

    /// Renders the file and parses the result again.
    fn check_well_formed(
        &self,
        adapter: &dyn LanguageAdapter,
        program: &Program,
        file: FileId,
    ) -> Result<(), RuleError> {
        let source = program.file(file)?;
        let text = Formatter::new(self.options.layout.clone()).apply_layout(source.tree());
        match adapter.parse(&text) {
            Ok(_) => Ok(()),
            Err(RuleError::Syntax(error)) => Err(RuleError::malformed_tree(source.path(), error)),
            Err(other) => Err(other),
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("rules", &self.rules())
            .field("adapters", &self.adapters)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
