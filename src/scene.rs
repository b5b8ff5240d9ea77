/*

    Declare an in-memory Scene: objects with local transforms,
    parent links, selection and collections.

    This is the smallest host that the group command can run
    against. World matrices are never stored, they are always
    the product of local matrices up the parent chain, so
    reparenting only has to fix the child's local matrix.

    @date: 2 Oct, 2025
    @author: Bartu
*/

use serde::Serialize;

use crate::bbox::{BBox, Bounded, BoundsSource, world_bbox};
use crate::error::SceneError;
use crate::prelude::*;

pub const ROOT_COLLECTION: &str = "Scene Collection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(pub usize);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh { vertices: Vec<Vector3> },
    /// Draws as a box, `display` is given in the object's local space.
    Empty { display: BBox },
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub parent: Option<ObjectId>,
    /// Maps local space into the parent's space (world space if no parent).
    pub matrix_local: Matrix4,
    pub kind: ObjectKind,
    pub collection: String,
}

impl SceneObject {
    /// Local bounding box, the 8 corners of which are exposed to the extent fold.
    pub fn local_bbox(&self) -> BBox {
        match &self.kind {
            ObjectKind::Empty { display } => *display,
            ObjectKind::Mesh { vertices } => {
                let Some((first, rest)) = vertices.split_first() else {
                    return BBox::from_point(Vector3::ZERO);
                };
                let mut bbox = BBox::from_point(*first);
                for v in rest {
                    bbox.expand(v);
                }
                bbox
            }
        }
    }
}

/// Read-only view of an object together with its resolved world matrix.
#[derive(Debug, Clone, Copy)]
pub struct ObjectView<'a> {
    pub object: &'a SceneObject,
    pub world: Matrix4,
}

impl Bounded for ObjectView<'_> {
    fn world_matrix(&self) -> Matrix4 {
        self.world
    }

    fn local_corners(&self) -> [Vector3; 8] {
        self.object.local_bbox().corners()
    }

    fn local_vertices(&self) -> Option<&[Vector3]> {
        match &self.object.kind {
            ObjectKind::Mesh { vertices } => Some(vertices.as_slice()),
            ObjectKind::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub name: String,
    pub objects: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    collections: Vec<Collection>,
    selection: Vec<ObjectId>, // In selection order
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            collections: vec![Collection { name: ROOT_COLLECTION.to_string(), objects: vec![] }],
            selection: Vec::new(),
        }
    }

    pub fn add_mesh(&mut self, name: &str, matrix_local: Matrix4, vertices: Vec<Vector3>) -> ObjectId {
        self.add_object(name, matrix_local, ObjectKind::Mesh { vertices })
    }

    pub fn add_empty(&mut self, name: &str, matrix_local: Matrix4, display: BBox) -> ObjectId {
        self.add_object(name, matrix_local, ObjectKind::Empty { display })
    }

    /// Adds an object to the root collection. Names clashing with an existing
    /// object get a numeric suffix, e.g. "Cube.001".
    pub fn add_object(&mut self, name: &str, matrix_local: Matrix4, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.objects.len());
        let name = unique_name(name, |n| self.find_by_name(n).is_some());
        debug!("Adding object {:?} as '{}'", id, name);

        self.objects.push(SceneObject {
            id,
            name,
            parent: None,
            matrix_local,
            kind,
            collection: ROOT_COLLECTION.to_string(),
        });
        self.collections[0].objects.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn object(&self, id: ObjectId) -> Result<&SceneObject, SceneError> {
        self.objects.get(id.0).ok_or(SceneError::UnknownObject(id))
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject, SceneError> {
        self.objects.get_mut(id.0).ok_or(SceneError::UnknownObject(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().find(|o| o.name == name).map(|o| o.id)
    }

    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.parent == Some(id))
            .map(|o| o.id)
            .collect()
    }

    /// Product of local matrices from the root down to `id`.
    pub fn world_matrix(&self, id: ObjectId) -> Result<Matrix4, SceneError> {
        let obj = self.object(id)?;
        let mut mat = obj.matrix_local;
        let mut current = obj.parent;
        while let Some(pid) = current {
            let p = self.object(pid)?;
            mat = p.matrix_local * mat;
            current = p.parent;
        }
        Ok(mat)
    }

    pub fn world_location(&self, id: ObjectId) -> Result<Vector3, SceneError> {
        Ok(translation_of(&self.world_matrix(id)?))
    }

    pub fn view(&self, id: ObjectId) -> Result<ObjectView<'_>, SceneError> {
        Ok(ObjectView {
            object: self.object(id)?,
            world: self.world_matrix(id)?,
        })
    }

    /// True if `ancestor` appears on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> Result<bool, SceneError> {
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == ancestor {
                return Ok(true);
            }
            current = self.object(cid)?.parent;
        }
        Ok(false)
    }

    fn check_parenting(&self, child: ObjectId, parent: ObjectId) -> Result<(), SceneError> {
        self.object(child)?;
        if self.is_ancestor(child, parent)? {
            return Err(SceneError::ParentCycle { child, parent });
        }
        Ok(())
    }

    /// Links `child` under `parent` keeping its local matrix, so the child
    /// moves along with the parent's current world transform.
    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId) -> Result<(), SceneError> {
        self.check_parenting(child, parent)?;
        self.object_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Links `child` under `parent` and compensates its local matrix so that
    /// its world matrix does not change.
    pub fn set_parent_keep_world(&mut self, child: ObjectId, parent: ObjectId) -> Result<(), SceneError> {
        self.check_parenting(child, parent)?;

        let world = self.world_matrix(child)?;
        let parent_world = self.world_matrix(parent)?;
        let parent_inv = try_inverse(&parent_world).ok_or(SceneError::SingularTransform(parent))?;

        let obj = self.object_mut(child)?;
        obj.matrix_local = parent_inv * world;
        obj.parent = Some(parent);
        debug!("Parented '{}' to {:?} keeping world transform", obj.name, parent);
        Ok(())
    }

    pub fn clear_parent_keep_world(&mut self, child: ObjectId) -> Result<(), SceneError> {
        let world = self.world_matrix(child)?;
        let obj = self.object_mut(child)?;
        obj.matrix_local = world;
        obj.parent = None;
        Ok(())
    }

    pub fn select(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.object(id)?;
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    pub fn selected(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Creates an empty collection and returns the name it actually got.
    pub fn new_collection(&mut self, name: &str) -> String {
        let name = unique_name(name, |n| self.collection(n).is_some());
        debug!("Creating collection '{}'", name);
        self.collections.push(Collection { name: name.clone(), objects: vec![] });
        name
    }

    /// Unlinks `id` from its current collection and links it to `name`.
    pub fn move_to_collection(&mut self, id: ObjectId, name: &str) -> Result<(), SceneError> {
        let target = self
            .collections
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SceneError::UnknownName(name.to_string()))?;

        let obj = self.object_mut(id)?;
        let previous = std::mem::replace(&mut obj.collection, name.to_string());

        for c in self.collections.iter_mut().filter(|c| c.name == previous) {
            c.objects.retain(|o| *o != id);
        }
        self.collections[target].objects.push(id);
        Ok(())
    }

    /// Flat summary of every object, used for logging and JSON output.
    pub fn report(&self) -> Result<SceneReport, SceneError> {
        let mut objects = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            let view = self.view(obj.id)?;
            let parent = match obj.parent {
                Some(pid) => Some(self.object(pid)?.name.clone()),
                None => None,
            };
            objects.push(ObjectReport {
                name: obj.name.clone(),
                parent,
                collection: obj.collection.clone(),
                selected: self.is_selected(obj.id),
                world_location: translation_of(&view.world),
                world_bbox: world_bbox(&view, BoundsSource::Corners),
            });
        }
        Ok(SceneReport { objects, collections: self.collections.clone() })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectReport {
    pub name: String,
    pub parent: Option<String>,
    pub collection: String,
    pub selected: bool,
    pub world_location: Vector3,
    pub world_bbox: BBox,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub objects: Vec<ObjectReport>,
    pub collections: Vec<Collection>,
}

/// `base`, or `base.001`, `base.002`, ... whichever is free first.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}.{i:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
