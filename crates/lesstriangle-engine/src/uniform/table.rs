use crate::shader::{LinkedModule, UniformSlot};

use super::binder::UniformTarget;
use super::UniformValue;

/// What happened to a `set` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SetOutcome {
    /// Value stored in the slot at this index of [`UniformTable::slots`].
    Applied(usize),
    /// The program declares no uniform with that name.
    Missing,
    /// The program declares the name with a different type; nothing stored.
    TypeMismatch,
}

#[derive(Debug, Clone)]
struct Entry {
    slot: UniformSlot,
    value: Option<UniformValue>,
    warned: bool,
    dirty: bool,
}

/// Current uniform values of one linked program, keyed by the program's
/// reflected slots.
///
/// This is the CPU mirror of the program's uniform state: the renderer copies
/// applied values into the matching GPU buffers, and reads go through here.
#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    entries: Vec<Entry>,
}

impl UniformTable {
    pub fn new(slots: impl IntoIterator<Item = UniformSlot>) -> Self {
        Self {
            entries: slots
                .into_iter()
                .map(|slot| Entry { slot, value: None, warned: false, dirty: false })
                .collect(),
        }
    }

    pub fn for_module(module: &LinkedModule) -> Self {
        Self::new(module.uniforms().iter().cloned())
    }

    pub fn slots(&self) -> impl Iterator<Item = &UniformSlot> {
        self.entries.iter().map(|e| &e.slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `value` under `name`.
    ///
    /// A type mismatch is logged once per uniform and otherwise ignored.
    pub fn set(&mut self, name: &str, value: UniformValue) -> SetOutcome {
        let Some((index, entry)) = self
            .entries
            .iter_mut()
            .enumerate()
            .find(|(_, e)| e.slot.name == name)
        else {
            return SetOutcome::Missing;
        };

        if entry.slot.ty != value.ty() {
            if !entry.warned {
                log::warn!(
                    "uniform `{name}` is declared as {} but was set with a {} value; ignored",
                    entry.slot.ty,
                    value.ty()
                );
                entry.warned = true;
            }
            return SetOutcome::TypeMismatch;
        }

        entry.dirty |= entry.value != Some(value);
        entry.value = Some(value);
        SetOutcome::Applied(index)
    }

    /// Last value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries
            .iter()
            .find(|e| e.slot.name == name)
            .and_then(|e| e.value)
    }

    /// Indices of entries whose value changed since the last call, clearing
    /// the flag. The renderer uploads exactly these.
    pub fn take_dirty(&mut self) -> Vec<usize> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| std::mem::take(&mut e.dirty).then_some(i))
            .collect()
    }

    /// Marks every entry holding a value as changed, e.g. after the GPU
    /// buffers were recreated.
    pub fn mark_all_dirty(&mut self) {
        for e in &mut self.entries {
            e.dirty = e.value.is_some();
        }
    }

    /// Slot and value at `index` (as returned by [`SetOutcome::Applied`]).
    pub fn entry(&self, index: usize) -> Option<(&UniformSlot, Option<UniformValue>)> {
        self.entries.get(index).map(|e| (&e.slot, e.value))
    }
}

impl UniformTarget for UniformTable {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{compile_stages, link, StageKind, StageSource, UniformType};

    fn slot(name: &str, binding: u32, ty: UniformType) -> UniformSlot {
        UniformSlot { name: name.to_string(), group: 0, binding, ty }
    }

    fn table() -> UniformTable {
        UniformTable::new([
            slot("resolution", 0, UniformType::IVEC2),
            slot("u_time", 1, UniformType::FLOAT),
        ])
    }

    // ── set / get ─────────────────────────────────────────────────────────

    #[test]
    fn set_then_get_round_trips() {
        let mut t = table();
        assert_eq!(t.set("u_time", UniformValue::Float(2.5)), SetOutcome::Applied(1));
        assert_eq!(t.get("u_time"), Some(UniformValue::Float(2.5)));
    }

    #[test]
    fn unset_uniform_reads_none() {
        assert_eq!(table().get("resolution"), None);
    }

    #[test]
    fn missing_name_is_a_no_op() {
        let mut t = table();
        assert_eq!(t.set("day_time", UniformValue::Int(1)), SetOutcome::Missing);
        assert_eq!(t.get("day_time"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn type_mismatch_keeps_previous_value() {
        let mut t = table();
        t.set("u_time", UniformValue::Float(1.0));
        assert_eq!(t.set("u_time", UniformValue::Int(7)), SetOutcome::TypeMismatch);
        assert_eq!(t.set("u_time", UniformValue::Int(8)), SetOutcome::TypeMismatch);
        assert_eq!(t.get("u_time"), Some(UniformValue::Float(1.0)));
    }

    #[test]
    fn entry_exposes_slot_and_value() {
        let mut t = table();
        let SetOutcome::Applied(i) = t.set("resolution", UniformValue::IVec2([4, 3])) else {
            panic!("expected Applied");
        };
        let (s, v) = t.entry(i).unwrap();
        assert_eq!(s.name, "resolution");
        assert_eq!(v, Some(UniformValue::IVec2([4, 3])));
        assert!(t.entry(99).is_none());
    }

    // ── change tracking ───────────────────────────────────────────────────

    #[test]
    fn only_changed_values_are_dirty() {
        let mut t = table();
        t.set("u_time", UniformValue::Float(1.0));
        assert_eq!(t.take_dirty(), [1]);
        assert!(t.take_dirty().is_empty());

        t.set("u_time", UniformValue::Float(1.0));
        assert!(t.take_dirty().is_empty());

        t.set("resolution", UniformValue::IVec2([8, 6]));
        t.set("u_time", UniformValue::Float(2.0));
        assert_eq!(t.take_dirty(), [0, 1]);
    }

    #[test]
    fn rejected_writes_are_not_dirty() {
        let mut t = table();
        t.set("u_time", UniformValue::Int(3));
        t.set("day_time", UniformValue::Int(1));
        assert!(t.take_dirty().is_empty());
    }

    #[test]
    fn mark_all_dirty_skips_unset_entries() {
        let mut t = table();
        t.set("u_time", UniformValue::Float(0.5));
        t.take_dirty();
        t.mark_all_dirty();
        assert_eq!(t.take_dirty(), [1]);
    }

    // ── linked program ────────────────────────────────────────────────────

    #[test]
    fn resolution_reads_back_from_linked_program() {
        let sources = [
            StageSource::new(
                StageKind::Vertex,
                "main_vert.wgsl",
                "@vertex\nfn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {\n    return vec4<f32>(p, 1.0);\n}\n",
            ),
            StageSource::new(
                StageKind::Fragment,
                "main_frag.wgsl",
                "@group(0) @binding(0) var<uniform> resolution: vec2<i32>;\n\
                 @fragment\nfn fs_main(@builtin(position) f: vec4<f32>) -> @location(0) vec4<f32> {\n    \
                 return vec4<f32>(f.xy / vec2<f32>(resolution), 0.0, 1.0);\n}\n",
            ),
        ];
        let mut stages = compile_stages(&sources);
        let fragments = stages.split_off(1);
        let program = link(stages.remove(0), fragments);
        let module = program.linked_module().expect("program links");

        let mut t = UniformTable::for_module(module);
        t.set_uniform("resolution", UniformValue::IVec2([1024 / 8, 768 / 8]));
        assert_eq!(t.get("resolution"), Some(UniformValue::IVec2([128, 96])));
    }
}
