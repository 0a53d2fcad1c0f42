use naga::{AddressSpace, Binding, BuiltIn, ScalarKind, TypeInner};

use super::compile::{compile, CompiledStage};
use super::{ShaderError, ShaderSource, ShaderStage};

/// A vertex shader input, addressed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub location: u32,
    /// Float components the shader declares (1..=4).
    pub components: u8,
}

/// One member of the uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformMember {
    pub name: String,
    /// Byte offset inside the block.
    pub offset: u32,
    /// Byte size of the member.
    pub size: u32,
}

/// The vertex stage's uniform buffer binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    /// Total byte size of the block.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformBlock {
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A linked vertex + fragment pair. Immutable once built.
#[derive(Debug, Clone)]
pub struct Program {
    label: String,
    vertex: CompiledStage,
    fragment: CompiledStage,
    attributes: Vec<Attribute>,
    uniforms: Option<UniformBlock>,
}

impl Program {
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn vertex(&self) -> &CompiledStage {
        &self.vertex
    }

    #[inline]
    pub fn fragment(&self) -> &CompiledStage {
        &self.fragment
    }

    /// Vertex inputs sorted by location.
    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attribute(name).map(|a| a.location)
    }

    #[inline]
    pub fn uniforms(&self) -> Option<&UniformBlock> {
        self.uniforms.as_ref()
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformMember> {
        self.uniforms.as_ref().and_then(|u| u.member(name))
    }
}

/// Compiles both stages and links them.
///
/// Both stages are compiled even when the first fails so every diagnostic
/// gets logged; the first failure is returned.
pub fn load_program(
    label: &str,
    vertex: &ShaderSource,
    fragment: &ShaderSource,
) -> Result<Program, ShaderError> {
    let vs = compile(vertex);
    let fs = compile(fragment);

    for err in [vs.as_ref().err(), fs.as_ref().err()].into_iter().flatten() {
        log::error!("{err}");
    }

    let program = link(label, vs?, fs?).inspect_err(|err| log::error!("{err}"))?;

    log::info!(
        "linked program `{}` ({} attributes, {} uniform bytes)",
        program.label,
        program.attributes.len(),
        program.uniforms.as_ref().map_or(0, |u| u.size)
    );
    Ok(program)
}

/// Links a compiled vertex stage with a compiled fragment stage.
///
/// Checks:
/// - stages are vertex then fragment
/// - the vertex stage writes `@builtin(position)`
/// - every fragment `@location` input is a vertex output of the same type
/// - vertex inputs are 32-bit float scalars or vectors
/// - at most one uniform block, and a block both stages declare agrees in size
pub fn link(
    label: &str,
    vertex: CompiledStage,
    fragment: CompiledStage,
) -> Result<Program, ShaderError> {
    let fail = |diagnostic: String| ShaderError::Link {
        label: label.to_string(),
        diagnostic,
    };

    if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
        return Err(fail(format!(
            "expected a vertex and a fragment stage, got {} and {}",
            vertex.stage(),
            fragment.stage()
        )));
    }

    let outputs = vertex_outputs(&vertex);
    if !outputs.writes_position {
        return Err(fail(format!(
            "vertex shader `{}` does not write @builtin(position)",
            vertex.label()
        )));
    }

    for input in located_inputs(&fragment) {
        match outputs.varyings.iter().find(|v| v.location == input.location) {
            None => {
                return Err(fail(format!(
                    "fragment input `{}` at location {} has no matching vertex output",
                    input.name, input.location
                )));
            }
            Some(output) if output.ty != input.ty => {
                return Err(fail(format!(
                    "fragment input `{}` at location {} has type {:?}, vertex output `{}` has {:?}",
                    input.name, input.location, input.ty, output.name, output.ty
                )));
            }
            Some(_) => {}
        }
    }

    let mut attributes = Vec::new();
    for input in located_inputs(&vertex) {
        let components = float_components(&input.ty).ok_or_else(|| {
            fail(format!(
                "vertex input `{}` must be a 32-bit float scalar or vector",
                input.name
            ))
        })?;
        attributes.push(Attribute {
            name: input.name,
            location: input.location,
            components,
        });
    }
    attributes.sort_by_key(|a| a.location);

    let mut blocks = uniform_blocks(&vertex);
    if blocks.len() > 1 {
        return Err(fail(format!(
            "vertex shader `{}` declares {} uniform blocks; one is supported",
            vertex.label(),
            blocks.len()
        )));
    }
    let uniforms = blocks.pop();

    for theirs in uniform_blocks(&fragment) {
        if let Some(ours) = uniforms
            .as_ref()
            .filter(|u| u.group == theirs.group && u.binding == theirs.binding)
        {
            if ours.size != theirs.size {
                return Err(fail(format!(
                    "uniform @group({}) @binding({}) is {} bytes in the vertex stage but {} in the fragment stage",
                    ours.group, ours.binding, ours.size, theirs.size
                )));
            }
        } else {
            return Err(fail(format!(
                "fragment uniform @group({}) @binding({}) is not declared by the vertex stage",
                theirs.group, theirs.binding
            )));
        }
    }

    Ok(Program {
        label: label.to_string(),
        vertex,
        fragment,
        attributes,
        uniforms,
    })
}

// ── reflection ────────────────────────────────────────────────────────────

/// A `@location` input or output with its resolved type.
struct Located {
    name: String,
    location: u32,
    ty: TypeInner,
}

struct VertexOutputs {
    writes_position: bool,
    varyings: Vec<Located>,
}

/// `@location` arguments of the entry point, including struct members.
fn located_inputs(stage: &CompiledStage) -> Vec<Located> {
    let module = stage.module();
    let mut out = Vec::new();

    for arg in &stage.entry_point().function.arguments {
        match &arg.binding {
            Some(binding) => {
                push_located(&mut out, module, arg.name.as_deref(), arg.ty, binding);
            }
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let Some(binding) = &member.binding {
                            push_located(&mut out, module, member.name.as_deref(), member.ty, binding);
                        }
                    }
                }
            }
        }
    }
    out
}

fn vertex_outputs(stage: &CompiledStage) -> VertexOutputs {
    let module = stage.module();
    let mut outputs = VertexOutputs {
        writes_position: false,
        varyings: Vec::new(),
    };

    let Some(result) = &stage.entry_point().function.result else {
        return outputs;
    };

    let mut visit = |name: Option<&str>, ty, binding: &Binding| {
        if matches!(binding, Binding::BuiltIn(BuiltIn::Position { .. })) {
            outputs.writes_position = true;
        }
        push_located(&mut outputs.varyings, module, name, ty, binding);
    };

    match &result.binding {
        Some(binding) => visit(None, result.ty, binding),
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[result.ty].inner {
                for member in members {
                    if let Some(binding) = &member.binding {
                        visit(member.name.as_deref(), member.ty, binding);
                    }
                }
            }
        }
    }
    outputs
}

fn push_located(
    out: &mut Vec<Located>,
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: &Binding,
) {
    if let Binding::Location { location, .. } = binding {
        out.push(Located {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            ty: module.types[ty].inner.clone(),
        });
    }
}

fn uniform_blocks(stage: &CompiledStage) -> Vec<UniformBlock> {
    let module = stage.module();
    let mut blocks = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        let Some(binding) = &var.binding else { continue };

        let inner = &module.types[var.ty].inner;
        let size = inner.size(module.to_ctx());

        let members = match inner {
            TypeInner::Struct { members, .. } => members
                .iter()
                .map(|m| UniformMember {
                    name: m.name.clone().unwrap_or_default(),
                    offset: m.offset,
                    size: module.types[m.ty].inner.size(module.to_ctx()),
                })
                .collect(),
            _ => vec![UniformMember {
                name: var.name.clone().unwrap_or_default(),
                offset: 0,
                size,
            }],
        };

        blocks.push(UniformBlock {
            group: binding.group,
            binding: binding.binding,
            size,
            members,
        });
    }
    blocks
}

fn float_components(ty: &TypeInner) -> Option<u8> {
    match *ty {
        TypeInner::Scalar(s) if s.kind == ScalarKind::Float && s.width == 4 => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
            Some(size as u8)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
        struct Transforms {
            modelMatrix: mat4x4<f32>,
            viewMatrix: mat4x4<f32>,
            projectionMatrix: mat4x4<f32>,
        };

        struct VertexOutput {
            @builtin(position) clip_position: vec4<f32>,
            @location(0) color: vec4<f32>,
        };

        @group(0) @binding(0)
        var<uniform> transforms: Transforms;

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
            var out: VertexOutput;
            out.clip_position = transforms.projectionMatrix * transforms.viewMatrix
                * transforms.modelMatrix * vec4<f32>(position, 1.0);
            out.color = color;
            return out;
        }
    "#;

    const FRAGMENT: &str = r#"
        @fragment
        fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
            return color;
        }
    "#;

    fn stage(src: &str, stage: ShaderStage) -> CompiledStage {
        compile(&ShaderSource::new("test", stage, src.to_string())).unwrap()
    }

    fn linked() -> Program {
        link("test", stage(VERTEX, ShaderStage::Vertex), stage(FRAGMENT, ShaderStage::Fragment))
            .unwrap()
    }

    // ── attributes ────────────────────────────────────────────────────────

    #[test]
    fn resolves_attribute_locations_by_name() {
        let p = linked();
        assert_eq!(p.attribute_location("position"), Some(0));
        assert_eq!(p.attribute_location("color"), Some(1));
        assert_eq!(p.attribute_location("normal"), None);
    }

    #[test]
    fn attribute_component_counts_come_from_types() {
        let p = linked();
        assert_eq!(p.attribute("position").unwrap().components, 3);
        assert_eq!(p.attribute("color").unwrap().components, 4);
    }

    #[test]
    fn struct_inputs_are_reflected_by_member_name() {
        let vs = r#"
            struct In {
                @location(2) position: vec2<f32>,
            };
            @vertex
            fn vs_main(input: In) -> @builtin(position) vec4<f32> {
                return vec4<f32>(input.position, 0.0, 1.0);
            }
        "#;
        let fs = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
        "#;
        let p = link("s", stage(vs, ShaderStage::Vertex), stage(fs, ShaderStage::Fragment)).unwrap();
        assert_eq!(p.attributes(), [Attribute { name: "position".into(), location: 2, components: 2 }]);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn reflects_uniform_block_layout() {
        let p = linked();
        let block = p.uniforms().unwrap();
        assert_eq!((block.group, block.binding, block.size), (0, 0, 192));
        assert_eq!(p.uniform("modelMatrix").unwrap().offset, 0);
        assert_eq!(p.uniform("viewMatrix").unwrap().offset, 64);
        assert_eq!(p.uniform("projectionMatrix").unwrap().offset, 128);
        assert_eq!(p.uniform("projectionMatrix").unwrap().size, 64);
    }

    #[test]
    fn program_without_uniforms_has_no_block() {
        let vs = r#"
            struct VertexOutput {
                @builtin(position) clip_position: vec4<f32>,
                @location(0) color: vec4<f32>,
            };
            @vertex
            fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
                var out: VertexOutput;
                out.clip_position = vec4<f32>(position, 1.0);
                out.color = color;
                return out;
            }
        "#;
        let p = link("flat", stage(vs, ShaderStage::Vertex), stage(FRAGMENT, ShaderStage::Fragment))
            .unwrap();
        assert!(p.uniforms().is_none());
        assert!(p.uniform("modelMatrix").is_none());
    }

    // ── link failures ─────────────────────────────────────────────────────

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let fs = r#"
            @fragment
            fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let err = link("t", stage(VERTEX, ShaderStage::Vertex), stage(fs, ShaderStage::Fragment))
            .unwrap_err();
        assert!(err.is_link());
        assert!(err.diagnostic().contains("tint"));
    }

    #[test]
    fn mismatched_varying_type_fails_to_link() {
        let fs = r#"
            @fragment
            fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(color, 1.0);
            }
        "#;
        let err = link("t", stage(VERTEX, ShaderStage::Vertex), stage(fs, ShaderStage::Fragment))
            .unwrap_err();
        assert!(err.is_link());
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        let err = link("t", stage(FRAGMENT, ShaderStage::Fragment), stage(VERTEX, ShaderStage::Vertex))
            .unwrap_err();
        assert!(err.is_link());
    }

    #[test]
    fn fragment_only_uniform_fails_to_link() {
        let fs = r#"
            @group(0) @binding(1)
            var<uniform> tint: vec4<f32>;

            @fragment
            fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
                return color * tint;
            }
        "#;
        let err = link("t", stage(VERTEX, ShaderStage::Vertex), stage(fs, ShaderStage::Fragment))
            .unwrap_err();
        assert!(err.diagnostic().contains("binding(1)"));
    }

    #[test]
    fn integer_vertex_input_fails_to_link() {
        let vs = r#"
            @vertex
            fn vs_main(@location(0) index: u32) -> @builtin(position) vec4<f32> {
                return vec4<f32>(f32(index), 0.0, 0.0, 1.0);
            }
        "#;
        let fs = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
        "#;
        let err = link("t", stage(vs, ShaderStage::Vertex), stage(fs, ShaderStage::Fragment))
            .unwrap_err();
        assert!(err.diagnostic().contains("index"));
    }

    // ── load_program ──────────────────────────────────────────────────────

    #[test]
    fn load_program_compiles_and_links() {
        let p = load_program(
            "cube",
            &ShaderSource::vertex("cube.vert", VERTEX),
            &ShaderSource::fragment("cube.frag", FRAGMENT),
        )
        .unwrap();
        assert_eq!(p.label(), "cube");
        assert_eq!(p.vertex().label(), "cube.vert");
        assert_eq!(p.fragment().entry_point_name(), "fs_main");
    }

    #[test]
    fn load_program_reports_compile_failure_of_either_stage() {
        let err = load_program(
            "cube",
            &ShaderSource::vertex("cube.vert", VERTEX),
            &ShaderSource::fragment("cube.frag", "@fragment fn fs_main( {"),
        )
        .unwrap_err();
        match err {
            ShaderError::Compile { stage, label, .. } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(label, "cube.frag");
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }
}
