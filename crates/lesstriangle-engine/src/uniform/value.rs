use crate::shader::UniformType;

/// A value that can be written into a uniform slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    IVec2([i32; 2]),
}

impl UniformValue {
    /// Shader-side type this value binds to.
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::FLOAT,
            UniformValue::Int(_) => UniformType::INT,
            UniformValue::IVec2(_) => UniformType::IVEC2,
        }
    }

    /// Native-endian bytes as laid out in a uniform buffer.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::IVec2(v) => bytemuck::cast_slice(v),
        }
    }
}
