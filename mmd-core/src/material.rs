use mmd_resource::{MaterialPropertyValue, MaterialSource};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

/// A live material, shared between a model and the controllers that morph it.
pub type SharedMaterial = Rc<RefCell<Material>>;

#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    properties: Vec<MaterialProperty>,
    property_name_index_map: BTreeMap<String, usize>,
    transparent: bool,
}

impl Material {
    pub const DIFFUSE: &'static str = "diffuse";
    pub const OPACITY: &'static str = "opacity";
    pub const SPECULAR: &'static str = "specular";
    pub const SHININESS: &'static str = "shininess";
    pub const EMISSIVE: &'static str = "emissive";
    pub const EDGE_COLOR: &'static str = "edge_color";
    pub const EDGE_SIZE: &'static str = "edge_size";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            property_name_index_map: BTreeMap::new(),
            transparent: false,
        }
    }

    pub fn load_from_source(source: &MaterialSource) -> Self {
        let mut material = Self::new(source.name.clone());

        for (name, value) in &source.properties {
            material.set_property(name, *value);
        }

        material.transparent = material.opacity() < 1.0;
        material
    }

    pub fn into_shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> impl Iterator<Item = &MaterialProperty> {
        self.properties.iter()
    }

    pub fn get_property(&self, name: &str) -> Option<&MaterialPropertyValue> {
        self.property_name_index_map
            .get(name)
            .map(|index| &self.properties[*index].value)
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get_property(name).and_then(|value| value.as_float())
    }

    pub fn get_vec3(&self, name: &str) -> Option<mmd_math::Vec3> {
        self.get_property(name).and_then(|value| value.as_vec3())
    }

    pub fn get_vec4(&self, name: &str) -> Option<mmd_math::Vec4> {
        self.get_property(name).and_then(|value| value.as_vec4())
    }

    /// Opacity of the material, `1` when the property is absent.
    pub fn opacity(&self) -> f32 {
        self.get_float(Self::OPACITY).unwrap_or(1.0)
    }

    /// Returns `false` without changing anything if the property exists with a different kind.
    pub fn set_property(&mut self, name: &str, value: MaterialPropertyValue) -> bool {
        let index = match self.property_name_index_map.get(name) {
            Some(index) => *index,
            None => {
                self.property_name_index_map
                    .insert(name.to_owned(), self.properties.len());
                self.properties.push(MaterialProperty {
                    name: name.to_owned(),
                    value,
                });
                return true;
            }
        };

        if !is_same_kind(&self.properties[index].value, &value) {
            return false;
        }

        self.properties[index].value = value;
        true
    }

    pub fn transparent(&self) -> bool {
        self.transparent
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperty {
    pub name: String,
    pub value: MaterialPropertyValue,
}

fn is_same_kind(lhs: &MaterialPropertyValue, rhs: &MaterialPropertyValue) -> bool {
    matches!(
        (lhs, rhs),
        (MaterialPropertyValue::Float(_), MaterialPropertyValue::Float(_))
            | (MaterialPropertyValue::Vec3(_), MaterialPropertyValue::Vec3(_))
            | (MaterialPropertyValue::Vec4(_), MaterialPropertyValue::Vec4(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_math::Vec3;

    #[test]
    fn test_material_set_property_rejects_kind_change() {
        let mut material = Material::new("skin");

        assert!(material.set_property(Material::OPACITY, MaterialPropertyValue::Float(0.5)));
        assert!(!material.set_property(
            Material::OPACITY,
            MaterialPropertyValue::Vec3(Vec3::ONE)
        ));
        assert_eq!(material.opacity(), 0.5);
    }

    #[test]
    fn test_material_load_from_source_transparency() {
        let mut properties = BTreeMap::new();
        properties.insert(
            Material::OPACITY.to_owned(),
            MaterialPropertyValue::Float(0.8),
        );
        let material = Material::load_from_source(&MaterialSource::new("hair".to_owned(), properties));

        assert_eq!(material.name(), "hair");
        assert!(material.transparent());
        assert!(!Material::new("empty").transparent());
    }
}
