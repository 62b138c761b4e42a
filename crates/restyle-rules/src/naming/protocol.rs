//! Marker-driven safe renaming.
//!
//! A naming rule never renames while it walks a tree. It first tags every
//! non-compliant declaration of the file with a marker carrying an ordinal,
//! commits the tagged tree, and then renames one ordinal at a time. Before
//! each step the file is resolved again against the latest program version,
//! so every rename sees the effects of the ones before it.

use restyle_semantic::{FileId, Program, SemanticModel, Symbol, SymbolKind};
use restyle_syntax::{
    Annotation, BatchId, Marker, Modifiers, SyntaxKind, SyntaxTree, is_valid_identifier,
};
use tracing::{debug, warn};

use super::renamers::{
    Declaration, FieldRenamer, LocalVariableRenamer, MethodRenamer, PropertyRenamer, Renamer,
};
use crate::adapter::LanguageAdapter;
use crate::error::RuleError;
use crate::rule::{
    GlobalSemanticRule, RenameDiagnostic, RuleContext, RuleDescriptor, RuleOutcome, SkipReason,
};

/// A global rule enforcing one [`Renamer`]'s convention.
#[derive(Debug, Clone, Default)]
pub struct NamingRule<R> {
    renamer: R,
}

impl<R: Renamer> NamingRule<R> {
    /// Wraps `renamer`.
    pub const fn new(renamer: R) -> Self {
        Self { renamer }
    }
}

/// Rule renaming private fields.
pub type FieldNames = NamingRule<FieldRenamer>;
/// Rule renaming non-public class properties.
pub type PropertyNames = NamingRule<PropertyRenamer>;
/// Rule renaming methods.
pub type MethodNames = NamingRule<MethodRenamer>;
/// Rule renaming locals and parameters.
pub type LocalVariables = NamingRule<LocalVariableRenamer>;

impl<R: Renamer> GlobalSemanticRule for NamingRule<R> {
    fn descriptor(&self) -> RuleDescriptor {
        self.renamer.descriptor()
    }

    fn apply(
        &self,
        context: &mut RuleContext,
        program: &Program,
        file: FileId,
    ) -> Result<RuleOutcome<Program>, RuleError> {
        let adapter = context.adapter_for(program, file)?;
        let batch = context.mint_batch();
        let (tagged, count) = mark_candidates(&self.renamer, program.file(file)?.tree(), batch)?;
        if count == 0 {
            return Ok(RuleOutcome::Unchanged);
        }

        let mut current = program.with_tree(file, tagged)?;
        let mut renamed = 0_u32;
        for ordinal in 0..count {
            let step = RenameStep {
                rule: self.renamer.descriptor().name,
                file,
                marker: Marker::new(batch, ordinal),
            };
            if let Some(next) = self.rename_one(context, adapter.as_ref(), &current, &step)? {
                current = next;
                renamed += 1;
            }
        }

        let source = current.file(file)?;
        let cleared = source.tree().without_annotations(|a| a.is_marker_of(batch));
        if cleared.has_annotation(|a| matches!(a, Annotation::Marker(_))) {
            return Err(RuleError::residual_marker(
                self.renamer.descriptor().name,
                source.path(),
            ));
        }
        if renamed == 0 {
            return Ok(RuleOutcome::Unchanged);
        }
        debug!(%file, candidates = count, renamed, "naming batch complete");
        Ok(RuleOutcome::Changed(current.with_tree(file, cleared)?))
    }
}

struct RenameStep {
    rule: &'static str,
    file: FileId,
    marker: Marker,
}

impl<R: Renamer> NamingRule<R> {
    /// Renames the declaration carrying `step.marker`, or reports why it was
    /// skipped. Returns `None` when nothing was renamed.
    fn rename_one(
        &self,
        context: &mut RuleContext,
        adapter: &dyn LanguageAdapter,
        program: &Program,
        step: &RenameStep,
    ) -> Result<Option<Program>, RuleError> {
        let model = adapter.resolve(program, step.file)?;
        let wanted = Annotation::Marker(step.marker);
        let symbol = model
            .tree()
            .find_annotated(|a| *a == wanted)
            .first()
            .and_then(|path| model.declared_symbol(path));
        let Some(symbol) = symbol else {
            warn!(
                rule = step.rule,
                ordinal = step.marker.ordinal(),
                "marked declaration no longer resolves"
            );
            context.report(step.diagnostic(None, "", "", SkipReason::ResolutionFailure));
            return Ok(None);
        };

        let proposed = self.renamer.derive_new_name(&Declaration::of_symbol(symbol));
        if proposed == symbol.name() {
            return Ok(None);
        }
        if !is_valid_identifier(&proposed) {
            warn!(
                rule = step.rule,
                name = symbol.name(),
                proposed = %proposed,
                "derived name is not an identifier"
            );
            context.report(step.diagnostic(
                Some(symbol),
                symbol.name(),
                &proposed,
                SkipReason::InvalidName,
            ));
            return Ok(None);
        }
        if context.is_incomplete_program() && !is_file_private(&model, symbol) {
            warn!(
                rule = step.rule,
                name = symbol.name(),
                "symbol may be used by files that failed to load"
            );
            context.report(step.diagnostic(
                Some(symbol),
                symbol.name(),
                &proposed,
                SkipReason::IncompleteProgram,
            ));
            return Ok(None);
        }
        if let Some(conflict) = adapter.find_conflict(program, symbol.id(), &proposed)? {
            warn!(rule = step.rule, %conflict, "skipping rename");
            let reason = SkipReason::NameCollision {
                detail: conflict.to_string(),
            };
            context.report(step.diagnostic(Some(symbol), symbol.name(), &proposed, reason));
            return Ok(None);
        }

        debug!(rule = step.rule, from = symbol.name(), to = %proposed, "renaming");
        let renamed = adapter.rename(program, symbol.id(), &proposed)?;
        Ok(Some(strip_bookkeeping(program, renamed)?))
    }
}

impl RenameStep {
    fn diagnostic(
        &self,
        symbol: Option<&Symbol>,
        name: &str,
        proposed: &str,
        reason: SkipReason,
    ) -> RenameDiagnostic {
        RenameDiagnostic {
            rule: self.rule,
            file: self.file,
            ordinal: self.marker.ordinal(),
            symbol: symbol.map(|s| s.id().clone()),
            name: name.to_owned(),
            proposed: proposed.to_owned(),
            reason,
        }
    }
}

/// Whether only the declaring file can reference `symbol`: locals,
/// parameters, and private members of a type that is not `partial`.
fn is_file_private(model: &SemanticModel, symbol: &Symbol) -> bool {
    match symbol.kind() {
        SymbolKind::Local | SymbolKind::Parameter => true,
        _ if symbol.is_member() => {
            symbol.modifiers().accessibility().is_private()
                && symbol.container_kind() != Some(SyntaxKind::InterfaceDeclaration)
                && model
                    .tree()
                    .ancestor_where(symbol.id().path(), SyntaxKind::is_type_declaration)
                    .is_some_and(|(_, owner)| !Modifiers::of(owner).has("partial"))
        }
        _ => false,
    }
}

/// Tags every declaration `renamer` would change with a marker of `batch`,
/// numbering them in document order.
fn mark_candidates<R: Renamer>(
    renamer: &R,
    tree: &SyntaxTree,
    batch: BatchId,
) -> Result<(SyntaxTree, u32), RuleError> {
    let candidates: Vec<_> = tree
        .descendants()
        .into_iter()
        .filter_map(|(path, _)| {
            let declaration = Declaration::at(tree, &path)?;
            (renamer.targets(&declaration) && !renamer.is_compliant(&declaration)).then_some(path)
        })
        .collect();
    let mut tagged = tree.clone();
    let mut count = 0_u32;
    for path in &candidates {
        tagged = tagged.annotate(path, Annotation::Marker(Marker::new(batch, count)))?;
        count += 1;
    }
    Ok((tagged, count))
}

/// Removes the rename primitive's bookkeeping tags from every file that
/// changed between `before` and `after`.
fn strip_bookkeeping(before: &Program, after: Program) -> Result<Program, RuleError> {
    let mut cleaned = after;
    for file in Program::changed_files(before, &cleaned) {
        let tree = cleaned
            .file(file)?
            .tree()
            .without_annotations(|a| matches!(a, Annotation::RenameBookkeeping));
        cleaned = cleaned.with_tree(file, tree)?;
    }
    Ok(cleaned)
}
