//! Renderable objects and draw batching.

use std::ops::Range;

use glam::Mat4;

use crate::assets::{MaterialHandle, MeshHandle};

/// One thing to draw: which mesh, with which material, where.
#[derive(Debug, Clone, Copy)]
pub struct RenderObject {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub transform: Mat4,
}

/// Splits `objects` into maximal runs sharing a material, preserving
/// submission order.
///
/// The draw loop rebinds pipeline state once per run, so sorting objects
/// by material before submission minimizes binds. Unsorted input still
/// renders correctly, just with more runs.
pub fn material_batches(objects: &[RenderObject]) -> Vec<(MaterialHandle, Range<usize>)> {
    let mut batches = Vec::new();
    let mut start = 0;

    for i in 1..=objects.len() {
        let run_ended = i == objects.len() || objects[i].material != objects[start].material;
        if run_ended {
            batches.push((objects[start].material, start..i));
            start = i;
        }
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(material: usize) -> RenderObject {
        RenderObject {
            mesh: MeshHandle(0),
            material: MaterialHandle(material),
            transform: Mat4::IDENTITY,
        }
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(material_batches(&[]).is_empty());
    }

    #[test]
    fn uniform_material_is_one_batch() {
        let objects = vec![obj(0); 5];
        let batches = material_batches(&objects);
        assert_eq!(batches, vec![(MaterialHandle(0), 0..5)]);
    }

    #[test]
    fn interleaved_materials_split_at_boundaries() {
        let objects = vec![obj(0), obj(0), obj(1), obj(0)];
        let batches = material_batches(&objects);
        assert_eq!(
            batches,
            vec![
                (MaterialHandle(0), 0..2),
                (MaterialHandle(1), 2..3),
                (MaterialHandle(0), 3..4),
            ]
        );
    }

    #[test]
    fn batches_cover_every_object_exactly_once() {
        let objects = vec![obj(2), obj(2), obj(2), obj(1), obj(1), obj(0)];
        let batches = material_batches(&objects);
        let covered: usize = batches.iter().map(|(_, r)| r.len()).sum();
        assert_eq!(covered, objects.len());
        assert_eq!(batches[0].1.start, 0);
        for pair in batches.windows(2) {
            assert_eq!(pair[0].1.end, pair[1].1.start);
        }
    }
}
