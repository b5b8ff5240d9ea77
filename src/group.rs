/*

    Group builder: wrap a set of objects in a proxy parent
    that encloses their combined extent.

    The proxy is an empty drawn as a box. Its origin is the
    pivot (see ProxyPivot) and its display box is stored in
    local space so that its world bounds always equal the
    inflated extent of the selection, wherever the pivot is.

    Children are reparented keeping their world transforms.
    Since the proxy only carries a translation, its world
    matrix is always invertible, even for flat selections.

    @date: Nov 2025
    @author: bartu
*/

use serde::Serialize;

use crate::bbox::{BBox, Bounded, world_bbox};
use crate::error::SceneError;
use crate::prelude::*;
use crate::scene::{ObjectId, ObjectView, Scene};
use crate::settings::{GroupSettings, ProxyPivot};

/// What the group builder needs from the application owning the scene.
pub trait GroupHost {
    type Object<'a>: Bounded
    where
        Self: 'a;

    /// Currently selected objects, in selection order.
    fn selected_objects(&self) -> Vec<ObjectId>;

    fn bounded(&self, id: ObjectId) -> Result<Self::Object<'_>, SceneError>;

    /// Adds an empty at `location` drawn as `display` (local space), makes it
    /// the only selected object and returns its id.
    fn create_proxy(&mut self, name: &str, location: Vector3, display: BBox) -> Result<ObjectId, SceneError>;

    fn reparent_keep_world(&mut self, child: ObjectId, parent: ObjectId) -> Result<(), SceneError>;

    /// Creates a collection named after `name` and moves `members` into it,
    /// returns the name the collection actually got.
    fn collect_into(&mut self, name: &str, members: &[ObjectId]) -> Result<String, SceneError>;
}

impl GroupHost for Scene {
    type Object<'a> = ObjectView<'a>
    where
        Self: 'a;

    fn selected_objects(&self) -> Vec<ObjectId> {
        self.selected().to_vec()
    }

    fn bounded(&self, id: ObjectId) -> Result<ObjectView<'_>, SceneError> {
        self.view(id)
    }

    fn create_proxy(&mut self, name: &str, location: Vector3, display: BBox) -> Result<ObjectId, SceneError> {
        let id = self.add_empty(name, Matrix4::from_translation(location), display);
        self.deselect_all();
        self.select(id)?;
        Ok(id)
    }

    fn reparent_keep_world(&mut self, child: ObjectId, parent: ObjectId) -> Result<(), SceneError> {
        self.set_parent_keep_world(child, parent)
    }

    fn collect_into(&mut self, name: &str, members: &[ObjectId]) -> Result<String, SceneError> {
        let name = self.new_collection(name);
        for id in members {
            self.move_to_collection(*id, &name)?;
        }
        Ok(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupProxy {
    pub id: ObjectId,
    /// World position of the proxy's origin.
    pub center: Vector3,
    /// Per-axis extent of the (inflated) box.
    pub size: Vector3,
    /// World-space box the proxy encloses.
    pub bounds: BBox,
    pub children: Vec<ObjectId>,
    pub collection: Option<String>,
}

/// Volume-weighted mean of world positions. None if all volumes are zero.
pub fn center_of_mass<H: GroupHost>(host: &H, objects: &[ObjectId], settings: &GroupSettings) -> Result<Option<Vector3>, SceneError> {
    let mut total_mass: Float = 0.0;
    let mut total_center = Vector3::ZERO;

    for id in objects {
        let obj = host.bounded(*id)?;
        let mass = world_bbox(&obj, settings.bounds_source).volume();
        total_center += mass * translation_of(&obj.world_matrix());
        total_mass += mass;
    }

    if total_mass == 0.0 {
        return Ok(None);
    }
    Ok(Some(total_center / total_mass))
}

/// Parents `objects` to a new proxy enclosing `aabb` grown by `settings.margin`.
///
/// Returns Ok(None) without touching the host when `objects` is empty.
pub fn build_group<H: GroupHost>(
    host: &mut H,
    objects: &[ObjectId],
    aabb: &BBox,
    settings: &GroupSettings,
) -> Result<Option<GroupProxy>, SceneError> {

    if objects.is_empty() {
        warn!("Nothing to group, no proxy created.");
        return Ok(None);
    }

    // Fail before creating anything on bad input
    if !settings.margin.is_finite() || settings.margin < -1.0 {
        return Err(SceneError::InvalidMargin(settings.margin));
    }
    if !aabb.is_finite() {
        return Err(SceneError::NonFiniteBounds(format!("{:?}", aabb)));
    }
    for id in objects {
        host.bounded(*id)?;
    }

    let bounds = aabb.inflate(settings.margin);
    let center = match settings.pivot {
        ProxyPivot::BoundsCenter => bounds.center(),
        ProxyPivot::CenterOfMass => center_of_mass(host, objects, settings)?.unwrap_or_else(|| {
            debug!("Selection has no volume, using bounds center as pivot");
            bounds.center()
        }),
    };
    let display = BBox::from_min_max(bounds.min - center, bounds.max - center);

    let id = host.create_proxy(&settings.proxy_name, center, display)?;
    info!("Created proxy {:?} at {} with size {}", id, center, bounds.size());

    for child in objects {
        host.reparent_keep_world(*child, id)?;
    }

    let collection = match &settings.collection {
        Some(name) => {
            let mut members = Vec::with_capacity(objects.len() + 1);
            members.extend_from_slice(objects);
            members.push(id);
            Some(host.collect_into(name, &members)?)
        }
        None => None,
    };

    Ok(Some(GroupProxy {
        id,
        center,
        size: bounds.size(),
        bounds,
        children: objects.to_vec(),
        collection,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::{BoundsSource, box_corners, compute_aabb};

    fn cube(scene: &mut Scene, name: &str, mat: Matrix4) -> ObjectId {
        scene.add_mesh(name, mat, box_corners(&Vector3::splat(-1.), &Vector3::splat(1.)).to_vec())
    }

    fn aabb_of(scene: &Scene, ids: &[ObjectId]) -> BBox {
        let views: Vec<_> = ids.iter().map(|id| scene.view(*id).unwrap()).collect();
        compute_aabb(&views).unwrap()
    }

    #[test]
    fn proxy_matches_inflated_box() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "A", Matrix4::from_translation(Vector3::new(4., 0., 0.)));
        let b = cube(&mut scene, "B", Matrix4::from_translation(Vector3::new(0., 2., 0.)));
        let ids = [a, b];
        let aabb = aabb_of(&scene, &ids);

        let proxy = build_group(&mut scene, &ids, &aabb, &GroupSettings::with_margin(0.1)).unwrap().unwrap();

        // [-1, 5] x [-1, 3] x [-1, 1] grown by 5% of the size on each side
        assert!(proxy.bounds.min.abs_diff_eq(Vector3::new(-1.3, -1.2, -1.1), EPSILON));
        assert!(proxy.bounds.max.abs_diff_eq(Vector3::new(5.3, 3.2, 1.1), EPSILON));
        assert!(proxy.center.abs_diff_eq(Vector3::new(2., 1., 0.), EPSILON));
        assert!(proxy.size.abs_diff_eq(Vector3::new(6.6, 4.4, 2.2), EPSILON));

        // The proxy itself measures as the inflated box
        let measured = world_bbox(&scene.view(proxy.id).unwrap(), BoundsSource::Corners);
        assert!(measured.min.abs_diff_eq(proxy.bounds.min, EPSILON));
        assert!(measured.max.abs_diff_eq(proxy.bounds.max, EPSILON));
    }

    #[test]
    fn children_keep_world_pose() {
        let mut scene = Scene::new();
        let mats = [
            compose_trs(Vector3::new(1., 2., 3.), Vector3::new(15., 30., 45.), Vector3::new(1., 2., 0.5)),
            compose_trs(Vector3::new(-4., 0., 1.), Vector3::new(0., 0., 90.), Vector3::splat(3.)),
        ];
        let ids = [cube(&mut scene, "A", mats[0]), cube(&mut scene, "B", mats[1])];
        let aabb = aabb_of(&scene, &ids);

        let proxy = build_group(&mut scene, &ids, &aabb, &GroupSettings::with_margin(0.02)).unwrap().unwrap();

        for (id, mat) in ids.iter().zip(mats.iter()) {
            assert_eq!(scene.object(*id).unwrap().parent, Some(proxy.id));
            assert!(scene.world_matrix(*id).unwrap().abs_diff_eq(*mat, 1e-9));
        }
        assert_eq!(proxy.children, ids.to_vec());
    }

    #[test]
    fn empty_selection_is_noop() {
        let mut scene = Scene::new();
        cube(&mut scene, "A", Matrix4::IDENTITY);
        let aabb = BBox::from_min_max(Vector3::ZERO, Vector3::ONE);

        let res = build_group(&mut scene, &[], &aabb, &GroupSettings::default()).unwrap();
        assert_eq!(res, None);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.collections().len(), 1);
    }

    #[test]
    fn center_of_mass_pivot_keeps_bounds() {
        let mut scene = Scene::new();
        // Big cube (volume 8 * 27) at x = 0, small one (volume 8) at x = 10
        let big = cube(&mut scene, "Big", Matrix4::from_scale(Vector3::splat(3.)));
        let small = cube(&mut scene, "Small", Matrix4::from_translation(Vector3::new(10., 0., 0.)));
        let ids = [big, small];
        let aabb = aabb_of(&scene, &ids);

        let settings = GroupSettings { pivot: ProxyPivot::CenterOfMass, ..Default::default() };
        let proxy = build_group(&mut scene, &ids, &aabb, &settings).unwrap().unwrap();

        let expected_x = (8. * 10.) / (8. * 27. + 8.);
        assert!(proxy.center.abs_diff_eq(Vector3::new(expected_x, 0., 0.), EPSILON));
        assert!(scene.world_location(proxy.id).unwrap().abs_diff_eq(proxy.center, EPSILON));

        let measured = world_bbox(&scene.view(proxy.id).unwrap(), BoundsSource::Corners);
        assert!(measured.min.abs_diff_eq(aabb.min, EPSILON));
        assert!(measured.max.abs_diff_eq(aabb.max, EPSILON));
    }

    #[test]
    fn flat_selection_falls_back_to_bounds_center() {
        let mut scene = Scene::new();
        let flat = scene.add_mesh("Plane", Matrix4::from_translation(Vector3::new(0., 0., 5.)), vec![
            Vector3::new(-1., -1., 0.),
            Vector3::new(1., 1., 0.),
        ]);
        let aabb = aabb_of(&scene, &[flat]);
        let settings = GroupSettings { pivot: ProxyPivot::CenterOfMass, ..Default::default() };

        let proxy = build_group(&mut scene, &[flat], &aabb, &settings).unwrap().unwrap();
        assert!(proxy.center.abs_diff_eq(Vector3::new(0., 0., 5.), EPSILON));
        assert_eq!(proxy.size.z, 0.0);
        assert!(scene.world_matrix(flat).unwrap().abs_diff_eq(Matrix4::from_translation(Vector3::new(0., 0., 5.)), EPSILON));
    }

    #[test]
    fn members_move_to_new_collection() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "A", Matrix4::IDENTITY);
        let aabb = aabb_of(&scene, &[a]);

        let first = build_group(&mut scene, &[a], &aabb, &GroupSettings::default()).unwrap().unwrap();
        assert_eq!(first.collection.as_deref(), Some("MaxGrouped"));
        let members = &scene.collection("MaxGrouped").unwrap().objects;
        assert_eq!(members, &vec![a, first.id]);

        let second = build_group(&mut scene, &[first.id], &aabb, &GroupSettings::default()).unwrap().unwrap();
        assert_eq!(second.collection.as_deref(), Some("MaxGrouped.001"));
        assert_eq!(scene.object(first.id).unwrap().collection, "MaxGrouped.001");
    }

    #[test]
    fn no_collection_leaves_objects_in_place() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "A", Matrix4::IDENTITY);
        let aabb = aabb_of(&scene, &[a]);
        let settings = GroupSettings { collection: None, ..Default::default() };

        let proxy = build_group(&mut scene, &[a], &aabb, &settings).unwrap().unwrap();
        assert_eq!(proxy.collection, None);
        assert_eq!(scene.collections().len(), 1);
        assert!(scene.is_selected(proxy.id));
        assert!(!scene.is_selected(a));
    }

    #[test]
    fn bad_margin_creates_nothing() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "A", Matrix4::IDENTITY);
        let aabb = aabb_of(&scene, &[a]);

        for margin in [-3.0, f64::NAN, f64::INFINITY] {
            let res = build_group(&mut scene, &[a], &aabb, &GroupSettings::with_margin(margin));
            assert!(matches!(res, Err(SceneError::InvalidMargin(_))));
        }
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.object(a).unwrap().parent, None);

        // -1 collapses the box onto its center, which is still a valid proxy
        let proxy = build_group(&mut scene, &[a], &aabb, &GroupSettings::with_margin(-1.0)).unwrap().unwrap();
        assert_eq!(proxy.size, Vector3::ZERO);
    }

    #[test]
    fn non_finite_bounds_create_nothing() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "A", Matrix4::IDENTITY);
        let aabb = BBox::from_point(Vector3::splat(f64::NAN));

        let res = build_group(&mut scene, &[a], &aabb, &GroupSettings::default());
        assert!(matches!(res, Err(SceneError::NonFiniteBounds(_))));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn tiny_objects_still_have_mass() {
        let mut scene = Scene::new();
        // Sub-millimetre cubes, total world volume is 7.2e-11
        let a = cube(&mut scene, "A", Matrix4::from_scale(Vector3::splat(1e-4)));
        let b = cube(&mut scene, "B", compose_trs(Vector3::new(0.01, 0., 0.), Vector3::ZERO, Vector3::splat(2e-4)));
        let settings = GroupSettings { pivot: ProxyPivot::CenterOfMass, ..Default::default() };

        let com = center_of_mass(&scene, &[a, b], &settings).unwrap().unwrap();
        // b is 8 times heavier than a
        assert!(com.abs_diff_eq(Vector3::new(0.01 * 8. / 9., 0., 0.), 1e-12));
    }

    #[test]
    fn stale_id_creates_nothing() {
        let mut scene = Scene::new();
        let a = cube(&mut scene, "A", Matrix4::IDENTITY);
        let aabb = aabb_of(&scene, &[a]);

        let err = build_group(&mut scene, &[a, ObjectId(42)], &aabb, &GroupSettings::default());
        assert_eq!(err, Err(SceneError::UnknownObject(ObjectId(42))));
        assert_eq!(scene.len(), 1);
    }
}
