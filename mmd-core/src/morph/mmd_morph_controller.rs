use super::MaterialMorphTarget;
use bitvec::vec::BitVec;
use log::warn;
use mmd_math::{Quat, Vec3};
use mmd_resource::{
    MmdMorphGroupElement, MmdMorphKind, MmdMorphMaterialOffsetMode, MmdMorphSource,
};
use std::collections::HashMap;

/// One way a group morph reaches a non-group morph, with the ratios along the way multiplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupPath {
    pub group_index: u32,
    pub ratio: f32,
}

/// Accumulated bone morph offset of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneMorphOffset {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for BoneMorphOffset {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MorphApplyReport {
    pub touched_materials: usize,
    pub touched_bones: usize,
    pub applied_morphs: usize,
}

/// Resolves morph weights through the group morph graph of a model.
#[derive(Debug)]
pub struct MmdMorphController {
    names: Vec<String>,
    kinds: Vec<MmdMorphKind>,
    name_index_map: HashMap<String, u32>,
    weights: Vec<f32>,
    group_paths: Vec<Vec<GroupPath>>,
    group_members: Vec<Vec<u32>>,
    material_morphs: Vec<Vec<u32>>,
    bone_morphs: Vec<Vec<u32>>,
    bone_offsets: Vec<BoneMorphOffset>,
    dirties: BitVec,
    touched_materials: BitVec,
    touched_bones: BitVec,
    scratch: Vec<u32>,
}

impl MmdMorphController {
    pub fn new(morphs: &[MmdMorphSource], material_count: usize, bone_count: usize) -> Self {
        let mut names = Vec::with_capacity(morphs.len());
        let mut kinds = Vec::with_capacity(morphs.len());
        let mut name_index_map = HashMap::with_capacity(morphs.len());

        for (index, morph) in morphs.iter().enumerate() {
            names.push(morph.name.clone());
            kinds.push(morph.kind.clone());
            // the first morph wins on duplicated names
            name_index_map.entry(morph.name.clone()).or_insert(index as u32);
        }

        let mut group_paths = vec![Vec::new(); morphs.len()];
        let mut group_members = vec![Vec::new(); morphs.len()];

        for (group_index, kind) in kinds.iter().enumerate() {
            let elements = match kind {
                MmdMorphKind::Group(elements) => elements,
                _ => continue,
            };

            let mut stack = vec![group_index as u32];
            flatten_group(
                &names,
                &kinds,
                elements,
                1.0,
                &mut stack,
                &mut |target, ratio| {
                    group_paths[target as usize].push(GroupPath {
                        group_index: group_index as u32,
                        ratio,
                    });
                    group_members[group_index].push(target);
                },
            );

            group_members[group_index].sort_unstable();
            group_members[group_index].dedup();
        }

        let mut material_morphs = vec![Vec::new(); material_count];
        let mut bone_morphs = vec![Vec::new(); bone_count];

        for (morph_index, kind) in kinds.iter().enumerate() {
            match kind {
                MmdMorphKind::Material(elements) => {
                    for element in elements {
                        match element.material_index {
                            -1 => {
                                for morphs in material_morphs.iter_mut() {
                                    morphs.push(morph_index as u32);
                                }
                            }
                            index if 0 <= index && (index as usize) < material_count => {
                                material_morphs[index as usize].push(morph_index as u32);
                            }
                            index => {
                                warn!(
                                    "material morph `{}` targets material {} out of {}; ignored",
                                    names[morph_index], index, material_count
                                );
                            }
                        }
                    }
                }
                MmdMorphKind::Bone(elements) => {
                    for element in elements {
                        match bone_morphs.get_mut(element.bone_index as usize) {
                            Some(morphs) => morphs.push(morph_index as u32),
                            None => {
                                warn!(
                                    "bone morph `{}` targets bone {} out of {}; ignored",
                                    names[morph_index], element.bone_index, bone_count
                                );
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        for morphs in material_morphs.iter_mut().chain(bone_morphs.iter_mut()) {
            morphs.dedup();
        }

        Self {
            weights: vec![0.0; morphs.len()],
            names,
            kinds,
            name_index_map,
            group_paths,
            group_members,
            material_morphs,
            bone_morphs,
            bone_offsets: vec![BoneMorphOffset::default(); bone_count],
            dirties: BitVec::repeat(false, morphs.len()),
            touched_materials: BitVec::repeat(false, material_count),
            touched_bones: BitVec::repeat(false, bone_count),
            scratch: Vec::with_capacity(morphs.len()),
        }
    }

    pub fn morph_count(&self) -> usize {
        self.names.len()
    }

    pub fn morph_index(&self, name: &str) -> Option<u32> {
        self.name_index_map.get(name).copied()
    }

    pub fn morph_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn morph_kind(&self, index: u32) -> Option<&MmdMorphKind> {
        self.kinds.get(index as usize)
    }

    pub fn group_paths(&self, index: u32) -> &[GroupPath] {
        self.group_paths
            .get(index as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unknown names are ignored.
    pub fn set_weight(&mut self, name: &str, weight: f32) {
        if let Some(index) = self.morph_index(name) {
            self.set_weight_by_index(index, weight);
        }
    }

    /// The weight is not clamped. Out of range indices are ignored.
    pub fn set_weight_by_index(&mut self, index: u32, weight: f32) {
        let slot = match self.weights.get_mut(index as usize) {
            Some(slot) => slot,
            None => return,
        };

        *slot = weight;

        match &self.kinds[index as usize] {
            MmdMorphKind::Group(_) => {
                for member in &self.group_members[index as usize] {
                    self.dirties.set(*member as usize, true);
                }
            }
            _ => self.dirties.set(index as usize, true),
        }
    }

    /// Own weight of a morph, `0` for unknown names.
    pub fn weight(&self, name: &str) -> f32 {
        self.morph_index(name)
            .map_or(0.0, |index| self.weights[index as usize])
    }

    /// Own weight plus the contribution of every group path reaching the morph.
    pub fn effective_weight(&self, index: u32) -> f32 {
        let weight = match self.weights.get(index as usize) {
            Some(weight) => *weight,
            None => return 0.0,
        };

        self.group_paths[index as usize]
            .iter()
            .fold(weight, |weight, path| {
                weight + self.weights[path.group_index as usize] * path.ratio
            })
    }

    pub fn has_pending_changes(&self) -> bool {
        self.dirties.any()
    }

    pub fn bone_offset(&self, bone_index: u32) -> Option<&BoneMorphOffset> {
        self.bone_offsets.get(bone_index as usize)
    }

    /// Pushes every changed material and bone morph to its targets, then clears the change set.
    pub fn apply<T>(&mut self, materials: &mut [T]) -> MorphApplyReport
    where
        T: MaterialMorphTarget,
    {
        self.scratch.clear();
        self.scratch
            .extend(self.dirties.iter_ones().map(|index| index as u32));

        if self.scratch.is_empty() {
            return MorphApplyReport::default();
        }

        self.touched_materials.fill(false);
        self.touched_bones.fill(false);

        for &morph_index in &self.scratch {
            match &self.kinds[morph_index as usize] {
                MmdMorphKind::Material(elements) => {
                    for element in elements {
                        match element.material_index {
                            -1 => self.touched_materials.fill(true),
                            index if 0 <= index && (index as usize) < self.touched_materials.len() => {
                                self.touched_materials.set(index as usize, true);
                            }
                            _ => {}
                        }
                    }
                }
                MmdMorphKind::Bone(elements) => {
                    for element in elements {
                        if (element.bone_index as usize) < self.touched_bones.len() {
                            self.touched_bones.set(element.bone_index as usize, true);
                        }
                    }
                }
                _ => {}
            }
        }

        let mut report = MorphApplyReport {
            applied_morphs: self.scratch.len(),
            ..Default::default()
        };

        for material_index in self.touched_materials.iter_ones() {
            let target = match materials.get_mut(material_index) {
                Some(target) => target,
                None => continue,
            };

            target.reset();

            for &morph_index in &self.material_morphs[material_index] {
                let weight = self.effective_weight(morph_index);

                if weight == 0.0 {
                    continue;
                }

                let elements = match &self.kinds[morph_index as usize] {
                    MmdMorphKind::Material(elements) => elements,
                    _ => continue,
                };

                for element in elements.iter().filter(|element| {
                    element.material_index == -1 || element.material_index as usize == material_index
                }) {
                    match element.offset_mode {
                        MmdMorphMaterialOffsetMode::Multiply => {
                            target.multiply_weight_from_morph_data(element, weight)
                        }
                        MmdMorphMaterialOffsetMode::Additive => {
                            target.add_weight_from_morph_data(element, weight)
                        }
                    }
                }
            }

            target.apply();
            report.touched_materials += 1;
        }

        for bone_index in self.touched_bones.iter_ones() {
            let mut offset = BoneMorphOffset::default();

            for &morph_index in &self.bone_morphs[bone_index] {
                let weight = self.effective_weight(morph_index);

                if weight == 0.0 {
                    continue;
                }

                let elements = match &self.kinds[morph_index as usize] {
                    MmdMorphKind::Bone(elements) => elements,
                    _ => continue,
                };

                for element in elements
                    .iter()
                    .filter(|element| element.bone_index as usize == bone_index)
                {
                    offset.translation += element.translation * weight;
                    offset.rotation =
                        offset.rotation * Quat::slerp(Quat::IDENTITY, element.rotation, weight);
                }
            }

            self.bone_offsets[bone_index] = offset;
            report.touched_bones += 1;
        }

        self.dirties.fill(false);
        self.scratch.clear();

        report
    }
}

fn flatten_group(
    names: &[String],
    kinds: &[MmdMorphKind],
    elements: &[MmdMorphGroupElement],
    ratio: f32,
    stack: &mut Vec<u32>,
    emit: &mut impl FnMut(u32, f32),
) {
    for element in elements {
        let group_name = stack.last().map_or("", |index| names[*index as usize].as_str());

        match kinds.get(element.morph_index as usize) {
            None => {
                warn!(
                    "group morph `{}` references morph {} out of {}; ignored",
                    group_name,
                    element.morph_index,
                    kinds.len()
                );
            }
            Some(_) if stack.contains(&element.morph_index) => {
                warn!(
                    "group morph `{}` forms a cycle through `{}`; ignored",
                    group_name, names[element.morph_index as usize]
                );
            }
            Some(MmdMorphKind::Group(nested)) => {
                stack.push(element.morph_index);
                flatten_group(names, kinds, nested, ratio * element.ratio, stack, emit);
                stack.pop();
            }
            Some(_) => emit(element.morph_index, ratio * element.ratio),
        }
    }
}
