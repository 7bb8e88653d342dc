use super::compile::{attribute, bounded};
use super::reflect::{host_type, reflect_uniforms, UniformScalar, UniformSlot};
use super::unit::TranslationUnit;
use super::{ShaderStage, StageKind};

/// CPU-side result of a successful link: everything the renderer needs to
/// build the GPU pipeline.
#[derive(Debug, Clone)]
pub struct LinkedModule {
    source: String,
    vertex_entry: String,
    fragment_entry: String,
    uniforms: Vec<UniformSlot>,
}

impl LinkedModule {
    /// Linked WGSL source (all stages, attach order).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    /// Uniform slots ordered by (group, binding).
    pub fn uniforms(&self) -> &[UniformSlot] {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.iter().find(|s| s.name == name)
    }
}

/// Result of linking a program.
#[derive(Debug, Clone)]
pub enum LinkOutcome {
    Linked(LinkedModule),
    Failed { log: String },
}

/// One vertex stage and one-or-more fragment stages, attached in order and
/// linked into a single executable pipeline description.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    stages: Vec<ShaderStage>,
    outcome: LinkOutcome,
}

impl ShaderProgram {
    /// Attached stages: the vertex stage first, then fragments in attach order.
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    pub fn vertex_stage(&self) -> &ShaderStage {
        &self.stages[0]
    }

    pub fn fragment_stages(&self) -> &[ShaderStage] {
        &self.stages[1..]
    }

    pub fn outcome(&self) -> &LinkOutcome {
        &self.outcome
    }

    pub fn linked(&self) -> bool {
        matches!(self.outcome, LinkOutcome::Linked(_))
    }

    pub fn linked_module(&self) -> Option<&LinkedModule> {
        match &self.outcome {
            LinkOutcome::Linked(m) => Some(m),
            LinkOutcome::Failed { .. } => None,
        }
    }

    /// Link diagnostic; empty when the program linked.
    pub fn link_log(&self) -> &str {
        match &self.outcome {
            LinkOutcome::Linked(_) => "",
            LinkOutcome::Failed { log } => log,
        }
    }

    /// Stages that failed to compile, in attach order.
    pub fn failed_stages(&self) -> impl Iterator<Item = &ShaderStage> {
        self.stages.iter().filter(|s| !s.compiled())
    }
}

/// Attaches `vertex` and `fragments` to one program and links them.
///
/// Every stage is attached, including stages that failed to compile; the
/// link is attempted regardless and is expected to fail in that case. The
/// link requires a compiled vertex stage, at least one compiled fragment
/// stage, a unit that passes validation, exactly one `@vertex` and one
/// `@fragment` entry point, and uniform-only resource bindings.
pub fn link(vertex: ShaderStage, fragments: Vec<ShaderStage>) -> ShaderProgram {
    let mut stages = Vec::with_capacity(fragments.len() + 1);
    stages.push(vertex);
    stages.extend(fragments);

    let outcome = match link_stages(&stages) {
        Ok(module) => LinkOutcome::Linked(module),
        Err(log) => LinkOutcome::Failed { log: bounded(log) },
    };

    ShaderProgram { stages, outcome }
}

fn link_stages(stages: &[ShaderStage]) -> Result<LinkedModule, String> {
    let vertex = &stages[0];
    let fragments = &stages[1..];

    if vertex.kind() != StageKind::Vertex {
        return Err(format!("`{}` is attached as the vertex stage but is a {} stage", vertex.name(), vertex.kind()));
    }
    if let Some(stage) = fragments.iter().find(|s| s.kind() != StageKind::Fragment) {
        return Err(format!("`{}` is attached as a fragment stage but is a {} stage", stage.name(), stage.kind()));
    }
    if !vertex.compiled() {
        return Err(format!("vertex stage `{}` did not compile", vertex.name()));
    }
    if fragments.is_empty() {
        return Err("no fragment stage attached".to_string());
    }
    if !fragments.iter().any(ShaderStage::compiled) {
        return Err("no fragment stage compiled".to_string());
    }

    let unit = TranslationUnit::new(stages.iter().map(ShaderStage::source_text).enumerate());

    let module = naga::front::wgsl::parse_str(unit.text()).map_err(|err| {
        let names: Vec<&str> = stages.iter().map(ShaderStage::name).collect();
        let located: Vec<String> = attribute(&unit, &err, &names).into_values().collect();
        if located.is_empty() {
            err.message().to_string()
        } else {
            located.join("\n")
        }
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|err| format!("validation failed: {}", error_chain(err.as_inner())))?;

    let vertex_entry = single_entry_point(&module, naga::ShaderStage::Vertex, "@vertex")?;
    let fragment_entry = single_entry_point(&module, naga::ShaderStage::Fragment, "@fragment")?;
    check_interface(&module)?;
    let uniforms = reflect_uniforms(&module)?;

    Ok(LinkedModule {
        source: unit.into_text(),
        vertex_entry,
        fragment_entry,
        uniforms,
    })
}

fn single_entry_point(
    module: &naga::Module,
    stage: naga::ShaderStage,
    attr: &str,
) -> Result<String, String> {
    let mut names = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage)
        .map(|ep| ep.name.clone());

    match (names.next(), names.next()) {
        (Some(name), None) => Ok(name),
        (None, _) => Err(format!("no {attr} entry point")),
        (Some(a), Some(b)) => Err(format!("more than one {attr} entry point (`{a}`, `{b}`)")),
    }
}

/// Checks the entry points against what the host feeds and expects: vertex
/// inputs only at `@location(0)` as floats (the quad position), and a single
/// four-component float color at `@location(0)` out of the fragment stage.
fn check_interface(module: &naga::Module) -> Result<(), String> {
    for ep in &module.entry_points {
        match ep.stage {
            naga::ShaderStage::Vertex => {
                for arg in &ep.function.arguments {
                    for (location, ty) in locations(module, arg.ty, arg.binding.as_ref()) {
                        let is_float = host_type(&module.types[ty].inner)
                            .is_some_and(|t| t.scalar == UniformScalar::Float);
                        if location != 0 || !is_float {
                            return Err(format!(
                                "@vertex `{}` reads @location({location}); only a float position at @location(0) is provided",
                                ep.name
                            ));
                        }
                    }
                }
            }
            naga::ShaderStage::Fragment => {
                let outputs = ep
                    .function
                    .result
                    .as_ref()
                    .map(|r| locations(module, r.ty, r.binding.as_ref()))
                    .unwrap_or_default();

                let color = match outputs.as_slice() {
                    [(0, ty)] => host_type(&module.types[*ty].inner),
                    _ => None,
                };
                let is_color = color.is_some_and(|t| t.scalar == UniformScalar::Float && t.components == 4);
                if !is_color {
                    return Err(format!(
                        "@fragment `{}` must write exactly one vec4<f32> at @location(0)",
                        ep.name
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// User locations carried by a value of type `ty`, flattening struct members.
fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
) -> Vec<(u32, naga::Handle<naga::Type>)> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => vec![(*location, ty)],
        Some(naga::Binding::BuiltIn(_)) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .flat_map(|m| locations(module, m.ty, m.binding.as_ref()))
                .collect(),
            _ => Vec::new(),
        },
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut next = err.source();
    while let Some(e) = next {
        out.push_str(": ");
        out.push_str(&e.to_string());
        next = e.source();
    }
    out
}
