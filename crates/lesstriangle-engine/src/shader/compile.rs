use std::collections::BTreeMap;

use super::unit::{StageLocation, TranslationUnit};
use super::{StageKind, StageSource};

/// Upper bound for a single stage (or link) diagnostic, in bytes.
pub const MAX_DIAGNOSTIC_LEN: usize = 1024;

/// Result of compiling one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
    Compiled,
    Failed { log: String },
}

/// One compiled (or failed) unit of shader source bound to a pipeline role.
#[derive(Debug, Clone)]
pub struct ShaderStage {
    source: StageSource,
    outcome: CompileOutcome,
}

impl ShaderStage {
    pub fn kind(&self) -> StageKind {
        self.source.kind
    }

    /// Resource identifier the stage was loaded from.
    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn source_text(&self) -> &str {
        &self.source.text
    }

    pub fn outcome(&self) -> &CompileOutcome {
        &self.outcome
    }

    pub fn compiled(&self) -> bool {
        matches!(self.outcome, CompileOutcome::Compiled)
    }

    /// Compiler diagnostic; empty when the stage compiled.
    pub fn diagnostic_log(&self) -> &str {
        match &self.outcome {
            CompileOutcome::Compiled => "",
            CompileOutcome::Failed { log } => log,
        }
    }
}

/// Compiles every stage of one program.
///
/// Stages share one scope: a declaration in any stage is visible to all the
/// others, the way separately compiled GLSL objects see each other once
/// linked. Errors are attributed to the stage whose text they point into.
/// A failed stage is withdrawn from the scope and the rest are compiled
/// again, so each broken stage receives its own diagnostic. Stages that
/// depended on a withdrawn stage fail with an unresolved-name diagnostic.
///
/// The returned stages are in input order. Failures are reported, never
/// raised; the caller decides whether to continue.
pub fn compile_stages(sources: &[StageSource]) -> Vec<ShaderStage> {
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    let mut failures: Vec<Option<String>> = vec![None; sources.len()];

    loop {
        let unit = TranslationUnit::new(
            sources
                .iter()
                .enumerate()
                .filter(|(i, _)| failures[*i].is_none())
                .map(|(i, s)| (i, s.text.as_str())),
        );

        let Err(err) = naga::front::wgsl::parse_str(unit.text()) else {
            break;
        };

        let blamed = attribute(&unit, &err, &names);
        if blamed.is_empty() {
            // No span to follow; the linker reports it against the whole program.
            log::debug!("compile error without source location: {}", err.message());
            break;
        }

        for (stage, log) in blamed {
            failures[stage] = Some(log);
        }
    }

    sources
        .iter()
        .cloned()
        .zip(failures)
        .map(|(source, failure)| ShaderStage {
            source,
            outcome: match failure {
                None => CompileOutcome::Compiled,
                Some(log) => CompileOutcome::Failed { log },
            },
        })
        .collect()
}

/// Groups the labels of `err` by stage and renders one diagnostic per stage.
///
/// `names[i]` names the stage registered as index `i` in `unit`.
pub(crate) fn attribute(
    unit: &TranslationUnit,
    err: &naga::front::wgsl::ParseError,
    names: &[&str],
) -> BTreeMap<usize, String> {
    let mut by_stage: BTreeMap<usize, Vec<(StageLocation, &str)>> = BTreeMap::new();

    for (span, label) in err.labels() {
        let Some(range) = span.to_range() else { continue };
        let Some(loc) = unit.locate(range.start) else { continue };
        by_stage.entry(loc.stage).or_default().push((loc, label));
    }

    by_stage
        .into_iter()
        .map(|(stage, labels)| {
            let name = names[stage];
            let first = labels[0].0;
            let mut log = format!("{name}:{}:{}: {}", first.line, first.column, err.message());
            for (loc, label) in labels.iter().filter(|(_, l)| !l.is_empty()) {
                log.push_str(&format!("\n  {name}:{}:{}: {label}", loc.line, loc.column));
            }
            (stage, bounded(log))
        })
        .collect()
}

/// Truncates `log` to [`MAX_DIAGNOSTIC_LEN`] on a char boundary.
pub(crate) fn bounded(mut log: String) -> String {
    if log.len() > MAX_DIAGNOSTIC_LEN {
        let mut cut = MAX_DIAGNOSTIC_LEN;
        while !log.is_char_boundary(cut) {
            cut -= 1;
        }
        log.truncate(cut);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPHERE: &str = "fn sd_sphere(p: vec3<f32>, r: f32) -> f32 {\n    return length(p) - r;\n}\n";
    const SCENE: &str = "fn scene(p: vec3<f32>) -> f32 {\n    return sd_sphere(p, 1.0);\n}\n";
    const BROKEN: &str = "fn broken( -> f32 {\n    return 1.0;\n}\n";

    fn frag(name: &str, text: &str) -> StageSource {
        StageSource::new(StageKind::Fragment, name, text)
    }

    // ── success ───────────────────────────────────────────────────────────

    #[test]
    fn single_stage_compiles() {
        let stages = compile_stages(&[frag("sphere.wgsl", SPHERE)]);
        assert_eq!(stages.len(), 1);
        assert!(stages[0].compiled());
        assert_eq!(stages[0].diagnostic_log(), "");
    }

    #[test]
    fn stages_see_each_others_declarations() {
        // `scene` calls into a stage listed after it.
        let stages = compile_stages(&[frag("scene.wgsl", SCENE), frag("sphere.wgsl", SPHERE)]);
        assert!(stages.iter().all(ShaderStage::compiled));
    }

    #[test]
    fn output_preserves_input_order_and_metadata() {
        let stages = compile_stages(&[
            StageSource::new(StageKind::Vertex, "v.wgsl", ""),
            frag("sphere.wgsl", SPHERE),
        ]);
        assert_eq!(stages[0].kind(), StageKind::Vertex);
        assert_eq!(stages[0].name(), "v.wgsl");
        assert_eq!(stages[1].name(), "sphere.wgsl");
        assert_eq!(stages[1].source_text(), SPHERE);
    }

    // ── failure attribution ───────────────────────────────────────────────

    #[test]
    fn failure_names_the_broken_resource() {
        let stages = compile_stages(&[frag("sphere.wgsl", SPHERE), frag("broken.wgsl", BROKEN)]);
        assert!(stages[0].compiled());
        assert!(!stages[1].compiled());
        assert!(stages[1].diagnostic_log().starts_with("broken.wgsl:1:"));
    }

    #[test]
    fn every_broken_stage_gets_a_diagnostic() {
        let stages = compile_stages(&[
            frag("a.wgsl", BROKEN),
            frag("sphere.wgsl", SPHERE),
            frag("b.wgsl", BROKEN),
        ]);
        assert!(!stages[0].compiled());
        assert!(stages[1].compiled());
        assert!(!stages[2].compiled());
        assert!(stages[0].diagnostic_log().starts_with("a.wgsl:"));
        assert!(stages[2].diagnostic_log().starts_with("b.wgsl:"));
    }

    #[test]
    fn dependent_of_a_failed_stage_fails_too() {
        let broken_sphere = "fn sd_sphere(p: vec3<f32> r: f32) -> f32 { return 0.0; }";
        let stages = compile_stages(&[frag("scene.wgsl", SCENE), frag("sphere.wgsl", broken_sphere)]);
        assert!(!stages[1].compiled());
        assert!(!stages[0].compiled());
        assert!(stages[0].diagnostic_log().starts_with("scene.wgsl:2:"));
    }

    #[test]
    fn outcome_is_tagged() {
        let stages = compile_stages(&[frag("broken.wgsl", BROKEN)]);
        match stages[0].outcome() {
            CompileOutcome::Failed { log } => assert!(!log.is_empty()),
            CompileOutcome::Compiled => panic!("expected failure"),
        }
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(compile_stages(&[]).is_empty());
    }

    // ── bounded ───────────────────────────────────────────────────────────

    #[test]
    fn bounded_keeps_short_logs() {
        assert_eq!(bounded("short".to_string()), "short");
    }

    #[test]
    fn bounded_truncates_on_char_boundary() {
        let long = "é".repeat(MAX_DIAGNOSTIC_LEN);
        let out = bounded(long);
        assert!(out.len() <= MAX_DIAGNOSTIC_LEN);
        assert!(out.len() >= MAX_DIAGNOSTIC_LEN - 1);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
