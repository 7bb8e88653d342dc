use std::fmt;

/// Scalar component of a uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformScalar {
    Float,
    Int,
    Uint,
}

/// Host-visible type of a uniform: a 32-bit scalar or a 2-4 component vector.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformType {
    pub scalar: UniformScalar,
    pub components: u8,
}

impl UniformType {
    pub const FLOAT: Self = Self { scalar: UniformScalar::Float, components: 1 };
    pub const INT: Self = Self { scalar: UniformScalar::Int, components: 1 };
    pub const IVEC2: Self = Self { scalar: UniformScalar::Int, components: 2 };

    /// Size in bytes of the value as laid out in a uniform buffer.
    pub fn size(self) -> u64 {
        4 * self.components as u64
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.scalar {
            UniformScalar::Float => "f32",
            UniformScalar::Int => "i32",
            UniformScalar::Uint => "u32",
        };
        match self.components {
            1 => f.write_str(scalar),
            n => write!(f, "vec{n}<{scalar}>"),
        }
    }
}

/// Bind groups a program may use (wgpu's default `max_bind_groups`).
pub(crate) const MAX_BIND_GROUPS: u32 = 4;

/// A named uniform of a linked program and where it is bound.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub ty: UniformType,
}

/// Collects the `var<uniform>` globals of `module`, ordered by (group, binding).
///
/// Fails when the module binds anything other than plain uniforms (textures,
/// samplers, storage buffers), when a uniform has a type outside
/// [`UniformType`], when a group exceeds [`MAX_BIND_GROUPS`], or when two
/// resources share a binding.
pub(crate) fn reflect_uniforms(module: &naga::Module) -> Result<Vec<UniformSlot>, String> {
    let mut slots = Vec::new();

    for (_, var) in module.global_variables.iter() {
        let label = var.name.as_deref().unwrap_or("<unnamed>");

        let rb = match (var.space, &var.binding) {
            (naga::AddressSpace::Uniform, Some(rb)) => rb,
            (_, Some(rb)) => {
                return Err(format!(
                    "resource `{label}` at @group({}) @binding({}) is not a uniform; only uniform bindings are supported",
                    rb.group, rb.binding
                ));
            }
            _ => continue,
        };

        if rb.group >= MAX_BIND_GROUPS {
            return Err(format!(
                "uniform `{label}` uses @group({}); at most {MAX_BIND_GROUPS} bind groups are available",
                rb.group
            ));
        }

        let Some(ty) = host_type(&module.types[var.ty].inner) else {
            return Err(format!(
                "uniform `{label}` has an unsupported type; expected a 32-bit scalar or vector"
            ));
        };

        let Some(name) = var.name.clone() else {
            log::debug!("skipping unnamed uniform at @group({}) @binding({})", rb.group, rb.binding);
            continue;
        };

        slots.push(UniformSlot {
            name,
            group: rb.group,
            binding: rb.binding,
            ty,
        });
    }

    slots.sort_by_key(|s| (s.group, s.binding));

    if let Some(pair) = slots
        .windows(2)
        .find(|w| (w[0].group, w[0].binding) == (w[1].group, w[1].binding))
    {
        return Err(format!(
            "uniforms `{}` and `{}` share @group({}) @binding({})",
            pair[0].name, pair[1].name, pair[0].group, pair[0].binding
        ));
    }

    Ok(slots)
}

/// Maps a naga type to a host-shareable 32-bit scalar or vector type.
pub(crate) fn host_type(inner: &naga::TypeInner) -> Option<UniformType> {
    let (scalar, components) = match *inner {
        naga::TypeInner::Scalar(scalar) => (scalar, 1),
        naga::TypeInner::Vector { size, scalar } => {
            let n = match size {
                naga::VectorSize::Bi => 2,
                naga::VectorSize::Tri => 3,
                naga::VectorSize::Quad => 4,
            };
            (scalar, n)
        }
        _ => return None,
    };

    if scalar.width != 4 {
        return None;
    }

    let scalar = match scalar.kind {
        naga::ScalarKind::Float => UniformScalar::Float,
        naga::ScalarKind::Sint => UniformScalar::Int,
        naga::ScalarKind::Uint => UniformScalar::Uint,
        _ => return None,
    };

    Some(UniformType { scalar, components })
}
