use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Position-only vertex (`@location(0) vec3<f32>`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    /// Tightly packed, one attribute at location 0.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two triangles covering NDC `[-1, 1]²`.
pub const FULLSCREEN_QUAD: [QuadVertex; 6] = [
    QuadVertex::new(1.0, 1.0, 0.0),   // top right
    QuadVertex::new(1.0, -1.0, 0.0),  // bottom right
    QuadVertex::new(-1.0, 1.0, 0.0),  // top left
    QuadVertex::new(-1.0, -1.0, 0.0), // bottom left
    QuadVertex::new(-1.0, 1.0, 0.0),  // top left
    QuadVertex::new(1.0, -1.0, 0.0),  // bottom right
];

pub const QUAD_VERTEX_COUNT: u32 = FULLSCREEN_QUAD.len() as u32;

/// Holder for the uploaded quad.
///
/// The upload happens on first use; later calls return the same buffer and
/// never upload again.
#[derive(Debug)]
pub struct GeometryBuffer<B = wgpu::Buffer> {
    buffer: Option<B>,
}

impl<B> Default for GeometryBuffer<B> {
    fn default() -> Self {
        Self { buffer: None }
    }
}

impl<B> GeometryBuffer<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_uploaded(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn get(&self) -> Option<&B> {
        self.buffer.as_ref()
    }

    /// Returns the buffer, calling `upload` with the quad bytes if this is the
    /// first request.
    pub fn get_or_upload(&mut self, upload: impl FnOnce(&[u8]) -> B) -> &B {
        self.buffer
            .get_or_insert_with(|| upload(bytemuck::cast_slice(&FULLSCREEN_QUAD)))
    }
}

impl GeometryBuffer<wgpu::Buffer> {
    pub fn ensure_uploaded(&mut self, device: &wgpu::Device) -> &wgpu::Buffer {
        self.get_or_upload(|contents| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("lesstriangle quad vbo"),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── quad ──────────────────────────────────────────────────────────────

    #[test]
    fn quad_corners_in_order() {
        let corners: Vec<(f32, f32)> = FULLSCREEN_QUAD
            .iter()
            .map(|v| (v.position[0], v.position[1]))
            .collect();
        assert_eq!(
            corners,
            [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0)]
        );
        assert!(FULLSCREEN_QUAD.iter().all(|v| v.position[2] == 0.0));
        assert_eq!(QUAD_VERTEX_COUNT, 6);
    }

    #[test]
    fn layout_is_tightly_packed_vec3_at_location_0() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }

    // ── upload ────────────────────────────────────────────────────────────

    #[test]
    fn upload_happens_once() {
        let mut geometry = GeometryBuffer::<usize>::new();
        let mut uploads = 0;

        for _ in 0..3 {
            let len = *geometry.get_or_upload(|bytes| {
                uploads += 1;
                bytes.len()
            });
            assert_eq!(len, 6 * 3 * 4);
        }

        assert_eq!(uploads, 1);
        assert!(geometry.is_uploaded());
    }

    #[test]
    fn nothing_uploaded_before_first_use() {
        let geometry = GeometryBuffer::<Vec<u8>>::new();
        assert!(!geometry.is_uploaded());
        assert!(geometry.get().is_none());
    }
}
