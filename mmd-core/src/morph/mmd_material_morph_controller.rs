use crate::material::{Material, SharedMaterial};
use mmd_math::{lerp_unclamped, Vec3, Vec4};
use mmd_resource::{MaterialPropertyValue, MmdMorphMaterialElement};

/// Receives material morph contributions for one material.
pub trait MaterialMorphTarget {
    /// Restores the weighted values to the unmorphed snapshot.
    fn reset(&mut self);
    fn add_weight_from_morph_data(&mut self, data: &MmdMorphMaterialElement, weight: f32);
    fn multiply_weight_from_morph_data(&mut self, data: &MmdMorphMaterialElement, weight: f32);
    /// Writes the weighted values to the live material.
    fn apply(&mut self);
}

/// Morphable values of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialMorphState {
    pub diffuse: Vec3,
    pub opacity: f32,
    pub specular: Vec3,
    pub shininess: f32,
    pub emissive: Vec3,
    pub edge_color: Vec4,
    pub edge_size: f32,
}

impl MaterialMorphState {
    fn from_material(material: &Material) -> Self {
        Self {
            diffuse: material.get_vec3(Material::DIFFUSE).unwrap_or(Vec3::ONE),
            opacity: material.opacity(),
            specular: material.get_vec3(Material::SPECULAR).unwrap_or_default(),
            shininess: material.get_float(Material::SHININESS).unwrap_or_default(),
            emissive: material.get_vec3(Material::EMISSIVE).unwrap_or_default(),
            edge_color: material.get_vec4(Material::EDGE_COLOR).unwrap_or_default(),
            edge_size: material.get_float(Material::EDGE_SIZE).unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct MmdMaterialMorphController {
    material: SharedMaterial,
    is_exact_mmd_material: bool,
    base: MaterialMorphState,
    weighted: MaterialMorphState,
}

impl MmdMaterialMorphController {
    pub fn new(material: SharedMaterial) -> Self {
        let (is_exact_mmd_material, base) = {
            let material = material.borrow();
            (
                is_exact_mmd_material(&material),
                MaterialMorphState::from_material(&material),
            )
        };

        Self {
            material,
            is_exact_mmd_material,
            base,
            weighted: base,
        }
    }

    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    /// `false` when only opacity is morphed.
    pub fn is_exact_mmd_material(&self) -> bool {
        self.is_exact_mmd_material
    }

    pub fn base(&self) -> &MaterialMorphState {
        &self.base
    }

    pub fn weighted(&self) -> &MaterialMorphState {
        &self.weighted
    }

    /// Swaps the live material, keeping the snapshot taken at construction.
    pub fn rebind(&mut self, material: SharedMaterial) {
        self.material = material;
    }
}

impl MaterialMorphTarget for MmdMaterialMorphController {
    fn reset(&mut self) {
        self.weighted = self.base;
    }

    fn add_weight_from_morph_data(&mut self, data: &MmdMorphMaterialElement, weight: f32) {
        let weighted = &mut self.weighted;
        weighted.opacity += data.diffuse.w * weight;

        if !self.is_exact_mmd_material {
            return;
        }

        weighted.diffuse += data.diffuse.xyz() * weight;
        weighted.specular += data.specular * weight;
        weighted.shininess += data.shininess * weight;
        weighted.emissive += data.ambient * weight;
        weighted.edge_color += data.edge_color * weight;
        weighted.edge_size += data.edge_size * weight;
    }

    fn multiply_weight_from_morph_data(&mut self, data: &MmdMorphMaterialElement, weight: f32) {
        let weighted = &mut self.weighted;
        weighted.opacity = lerp_unclamped(
            weighted.opacity,
            weighted.opacity * data.diffuse.w,
            weight,
        );

        if !self.is_exact_mmd_material {
            return;
        }

        weighted.diffuse = Vec3::lerp_unclamped(
            weighted.diffuse,
            weighted.diffuse * data.diffuse.xyz(),
            weight,
        );
        weighted.specular = Vec3::lerp_unclamped(
            weighted.specular,
            weighted.specular * data.specular,
            weight,
        );
        weighted.shininess = lerp_unclamped(
            weighted.shininess,
            weighted.shininess * data.shininess,
            weight,
        );
        weighted.emissive = Vec3::lerp_unclamped(
            weighted.emissive,
            weighted.emissive * data.ambient,
            weight,
        );
        weighted.edge_color = Vec4::lerp_unclamped(
            weighted.edge_color,
            weighted.edge_color * data.edge_color,
            weight,
        );
        weighted.edge_size = lerp_unclamped(
            weighted.edge_size,
            weighted.edge_size * data.edge_size,
            weight,
        );
    }

    fn apply(&mut self) {
        let weighted = &self.weighted;
        let mut material = self.material.borrow_mut();

        material.set_property(
            Material::OPACITY,
            MaterialPropertyValue::Float(weighted.opacity),
        );
        material.set_transparent(weighted.opacity < 1.0);

        if !self.is_exact_mmd_material {
            return;
        }

        material.set_property(Material::DIFFUSE, MaterialPropertyValue::Vec3(weighted.diffuse));
        material.set_property(
            Material::SPECULAR,
            MaterialPropertyValue::Vec3(weighted.specular),
        );
        material.set_property(
            Material::SHININESS,
            MaterialPropertyValue::Float(weighted.shininess),
        );
        material.set_property(
            Material::EMISSIVE,
            MaterialPropertyValue::Vec3(weighted.emissive),
        );
        material.set_property(
            Material::EDGE_COLOR,
            MaterialPropertyValue::Vec4(weighted.edge_color),
        );
        material.set_property(
            Material::EDGE_SIZE,
            MaterialPropertyValue::Float(weighted.edge_size),
        );
    }
}

fn is_exact_mmd_material(material: &Material) -> bool {
    material.get_vec3(Material::DIFFUSE).is_some()
        && material.get_vec3(Material::SPECULAR).is_some()
        && material.get_float(Material::SHININESS).is_some()
        && material.get_vec3(Material::EMISSIVE).is_some()
        && material.get_vec4(Material::EDGE_COLOR).is_some()
        && material.get_float(Material::EDGE_SIZE).is_some()
}
