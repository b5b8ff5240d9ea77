/*

    Configuration of the group command.

    Loaded from the "Settings" block of a scene file (see
    json_parser.rs), every field is optional and numbers may
    be given as strings, e.g. "Margin": "0.05".

    @date: Nov 2025
    @author: bartu
*/

use serde::Serialize;

use crate::bbox::BoundsSource;
use crate::prelude::*;

pub const DEFAULT_PROXY_NAME: &str = "Group";
pub const DEFAULT_COLLECTION: &str = "MaxGrouped";

/// Where the proxy's origin goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyPivot {
    /// Midpoint of the inflated bounding box.
    #[default]
    BoundsCenter,
    /// Mean of the objects' world positions weighted by their bounding volume.
    CenterOfMass,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct GroupSettings {
    /// Fraction of the box size added around the selection, 0.02 is 2%.
    #[default = 0.0]
    #[serde(deserialize_with = "deser_float")]
    pub margin: Float,

    pub pivot: ProxyPivot,

    pub bounds_source: BoundsSource,

    #[default(_code = "DEFAULT_PROXY_NAME.to_string()")]
    pub proxy_name: String,

    /// Collection that receives the proxy and its children, None keeps them
    /// where they are.
    #[default(_code = "Some(DEFAULT_COLLECTION.to_string())")]
    pub collection: Option<String>,
}

impl GroupSettings {
    pub fn with_margin(margin: Float) -> Self {
        Self { margin, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let s: GroupSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, GroupSettings::default());
        assert_eq!(s.margin, 0.0);
        assert_eq!(s.pivot, ProxyPivot::BoundsCenter);
        assert_eq!(s.bounds_source, BoundsSource::Corners);
        assert_eq!(s.proxy_name, "Group");
        assert_eq!(s.collection.as_deref(), Some("MaxGrouped"));
    }

    #[test]
    fn lenient_values() {
        let s: GroupSettings = serde_json::from_str(r#"{
            "Margin": "0.02",
            "Pivot": "center_of_mass",
            "BoundsSource": "vertices",
            "ProxyName": "Box",
            "Collection": null
        }"#).unwrap();
        assert_eq!(s.margin, 0.02);
        assert_eq!(s.pivot, ProxyPivot::CenterOfMass);
        assert_eq!(s.bounds_source, BoundsSource::Vertices);
        assert_eq!(s.proxy_name, "Box");
        assert_eq!(s.collection, None);
    }
}
