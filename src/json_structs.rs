/*

    Declare data structs needed to parse scene JSON files.

    - SingleOrVec: a single <object> or an array of them
    - RootScene / SceneJSON / ObjectJSON: scene description
      consumed by the demo host

    @date: 13 Oct, 2025
    @author: Bartu
*/

use std::collections::HashSet;

use crate::error::SceneError;
use crate::prelude::*;
use crate::scene::{ObjectId, Scene};
use crate::bbox::BBox;
use crate::settings::GroupSettings;


// To handle JSON file having a single <object>
// or an array of <object>s.
// Untagged variants are tried in order, Multiple must come before
// Single or an empty array would become one all-default object.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SingleOrVec<T> {
    Empty,
    Multiple(Vec<T>),
    Single(T),
}

impl<T> SingleOrVec<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            SingleOrVec::Empty => &[],
            SingleOrVec::Single(t) => std::slice::from_ref(t),
            SingleOrVec::Multiple(vec) => vec.as_slice(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> Default for SingleOrVec<T> {
    fn default() -> Self {
        SingleOrVec::Empty
    }
}


#[derive(Debug, Deserialize)]
pub struct RootScene {
    #[serde(rename = "Scene")]
    pub scene: SceneJSON,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SceneJSON {
    pub objects: SceneObjectsJSON,
    pub settings: GroupSettings,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SceneObjectsJSON {
    #[serde(rename = "Object")]
    pub objects: SingleOrVec<ObjectJSON>,
}

// Objects with vertices become meshes, the rest become
// empties drawn as a box of HalfExtents
#[derive(Debug, Deserialize, Clone, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct ObjectJSON {
    #[default = "Object"]
    pub name: String,

    pub parent: Option<String>,

    #[serde(deserialize_with = "deser_vec3")]
    pub location: Vector3,

    /// XYZ euler angles in degrees
    #[serde(deserialize_with = "deser_vec3")]
    pub rotation: Vector3,

    #[default(Vector3::ONE)]
    #[serde(deserialize_with = "deser_vec3")]
    pub scale: Vector3,

    #[serde(deserialize_with = "deser_vecvec3")]
    pub vertices: Vec<Vector3>,

    #[default(Vector3::ONE)]
    #[serde(deserialize_with = "deser_vec3")]
    pub half_extents: Vector3,

    #[serde(deserialize_with = "deser_bool")]
    pub selected: bool,
}

impl ObjectJSON {
    pub fn matrix_local(&self) -> Matrix4 {
        compose_trs(self.location, self.rotation, self.scale)
    }
}

impl SceneJSON {
    /// Build the in-memory scene. Transforms in the file are relative to the
    /// parent, so parents are linked without compensation.
    pub fn build(&self) -> Result<Scene, SceneError> {
        let mut scene = Scene::new();
        let mut seen = HashSet::new();
        let mut ids: Vec<ObjectId> = Vec::new();

        for obj in self.objects.objects.iter() {
            if !seen.insert(obj.name.as_str()) {
                return Err(SceneError::DuplicateName(obj.name.clone()));
            }
            let id = if obj.vertices.is_empty() {
                let display = BBox::from_min_max(-obj.half_extents.abs(), obj.half_extents.abs());
                scene.add_empty(&obj.name, obj.matrix_local(), display)
            } else {
                scene.add_mesh(&obj.name, obj.matrix_local(), obj.vertices.clone())
            };
            ids.push(id);
        }

        for (obj, id) in self.objects.objects.iter().zip(ids.iter()) {
            if let Some(parent_name) = &obj.parent {
                let parent = scene
                    .find_by_name(parent_name)
                    .ok_or_else(|| SceneError::UnknownName(parent_name.clone()))?;
                scene.set_parent(*id, parent)?;
            }
            if obj.selected {
                scene.select(*id)?;
            }
        }

        debug!("Built scene with {} objects, {} selected", scene.len(), scene.selected().len());
        Ok(scene)
    }
}
