use super::{MmdMaterialMorphController, MmdMorphController, MorphApplyReport};
use crate::material::SharedMaterial;
use mmd_resource::MmdMorphSource;

/// Morph state of one model: its morph graph and one material morph controller per material.
#[derive(Debug)]
pub struct MmdParameterController {
    morph_controller: MmdMorphController,
    material_controllers: Vec<MmdMaterialMorphController>,
}

impl MmdParameterController {
    pub fn new(morphs: &[MmdMorphSource], materials: &[SharedMaterial], bone_count: usize) -> Self {
        Self {
            morph_controller: MmdMorphController::new(morphs, materials.len(), bone_count),
            material_controllers: materials
                .iter()
                .cloned()
                .map(MmdMaterialMorphController::new)
                .collect(),
        }
    }

    pub fn morph_controller(&self) -> &MmdMorphController {
        &self.morph_controller
    }

    pub fn material_controllers(&self) -> &[MmdMaterialMorphController] {
        &self.material_controllers
    }

    pub fn set_morph_weight(&mut self, name: &str, weight: f32) {
        self.morph_controller.set_weight(name, weight);
    }

    pub fn morph_weight(&self, name: &str) -> f32 {
        self.morph_controller.weight(name)
    }

    pub fn apply(&mut self) -> MorphApplyReport {
        self.morph_controller.apply(&mut self.material_controllers)
    }

    /// Out of range indices are ignored.
    pub fn rebind_material(&mut self, index: usize, material: SharedMaterial) {
        if let Some(controller) = self.material_controllers.get_mut(index) {
            controller.rebind(material);
        }
    }

    /// Rebinds materials pairwise; extra materials on either side are ignored.
    pub fn rebind_materials(&mut self, materials: &[SharedMaterial]) {
        for (controller, material) in self.material_controllers.iter_mut().zip(materials) {
            controller.rebind(material.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use mmd_math::Vec4;
    use mmd_resource::{
        MaterialPropertyValue, MmdMorphKind, MmdMorphMaterialElement, MmdMorphMaterialOffsetMode,
    };
    use std::rc::Rc;

    fn fade_morph() -> MmdMorphSource {
        let mut element = MmdMorphMaterialElement::identity(-1, MmdMorphMaterialOffsetMode::Multiply);
        element.diffuse = Vec4::new(1.0, 1.0, 1.0, 0.0);

        MmdMorphSource {
            name: "fade".to_owned(),
            kind: MmdMorphKind::Material(vec![element]),
        }
    }

    #[test]
    fn test_parameter_controller_applies_to_live_materials() {
        let materials = vec![
            Material::new("face").into_shared(),
            Material::new("hair").into_shared(),
        ];
        let mut controller = MmdParameterController::new(&[fade_morph()], &materials, 0);

        controller.set_morph_weight("fade", 1.0);
        assert_eq!(controller.morph_weight("fade"), 1.0);

        let report = controller.apply();
        assert_eq!(report.touched_materials, 2);

        for material in &materials {
            assert_eq!(material.borrow().opacity(), 0.0);
            assert!(material.borrow().transparent());
        }
    }

    #[test]
    fn test_parameter_controller_rebind() {
        let materials = vec![Material::new("face").into_shared()];
        let mut controller = MmdParameterController::new(&[fade_morph()], &materials, 0);
        let replacement = Material::new("face").into_shared();
        replacement
            .borrow_mut()
            .set_property(Material::OPACITY, MaterialPropertyValue::Float(0.3));

        controller.rebind_material(5, Material::new("ignored").into_shared());
        controller.rebind_materials(&[replacement.clone()]);
        assert!(Rc::ptr_eq(
            controller.material_controllers()[0].material(),
            &replacement
        ));

        controller.set_morph_weight("fade", 0.5);
        controller.apply();
        assert_eq!(replacement.borrow().opacity(), 0.5);
        assert_eq!(materials[0].borrow().opacity(), 1.0);
    }
}
