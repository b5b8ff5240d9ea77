/*

    Provide utilities to parse scene JSON files.

    The parser is somewhat robust, let <a> be integer or float type,
    in JSON file <a> can be given both in quotes (string) or as is.

    e.g. In JSON file both
    "Margin": "0.02" and "Margin": 0.02
    works as margin: Float in source code

    Vector3 fields accept "x y z" strings or [x, y, z] arrays,
    vertex lists accept one flat "x y z x y z ..." string or an
    array of "x y z" strings.

    @date: 2 Oct, 2025
    @author: bartu
*/

use std::fmt::{self};
use std::fs::File;
use std::io::BufReader;

use serde::{Deserialize, Deserializer};
use serde::de::{self, Visitor, SeqAccess};

use crate::prelude::*;
use crate::json_structs::RootScene;

pub fn parse_scene_json(path: &str) -> Result<RootScene, Box<dyn std::error::Error>> {

    let span = tracing::span!(tracing::Level::INFO, "load_scene");
    let _enter = span.enter();

    // Open file
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading file from {}", path);

    // Parse JSON into Scene
    let root: RootScene = serde_json::from_reader(reader)?;
    Ok(root)
}

// Handles floats as string or number
pub(crate) fn deser_float<'de, D>(deserializer: D) -> Result<Float, D::Error>
where
    D: Deserializer<'de>,
{
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_f64()
            .ok_or_else(|| de::Error::custom("Invalid float"))
            .and_then(|v| finite(v).map_err(de::Error::custom)),
        serde_json::Value::String(s) => parse_finite(s.trim()).map_err(de::Error::custom),
        t => Err(de::Error::custom(format!("Expected float or string, found {t}"))),
    }
}

pub(crate) fn deser_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoolVisitor;

    impl<'de> serde::de::Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a boolean or a string containing true/false")
        }

        fn visit_bool<E>(self, v: bool) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, v: &str) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            match v.to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(E::custom(format!("invalid bool '{}'", v))),
            }
        }

        fn visit_u64<E>(self, v: u64) -> Result<bool, E>
        where
            E: serde::de::Error,
        {
            Ok(v != 0)
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

pub(crate) fn deser_vec3<'de, D>(deserializer: D) -> Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    struct Vec3Visitor;

    impl<'de> Visitor<'de> for Vec3Visitor {
        type Value = Vector3;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a Vec3 as a string 'x y z' or an array [x, y, z]")
        }

        // Given "X Y Z"
        fn visit_str<E>(self, value: &str) -> Result<Vector3, E>
        where
            E: de::Error,
        {
            parse_vec3_str(value).map_err(de::Error::custom)
        }

        // Given [X, Y, Z]
        fn visit_seq<A>(self, mut seq: A) -> Result<Vector3, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut next = || -> Result<Float, A::Error> {
                let v = seq.next_element::<Float>()?
                    .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
                finite(v).map_err(de::Error::custom)
            };
            let (x, y, z) = (next()?, next()?, next()?);
            if seq.next_element::<Float>()?.is_some() {
                return Err(de::Error::custom("Expected only 3 elements in Vec3 array"));
            }
            Ok(Vector3::new(x, y, z))
        }
    }

    deserializer.deserialize_any(Vec3Visitor)
}

pub(crate) fn deser_vecvec3<'de, D>(deserializer: D) -> Result<Vec<Vector3>, D::Error>
where
    D: Deserializer<'de>,
{
    // Deserialize a vector of Vector3
    // given either a single string of "X1 Y1 Z1 X2 Y2 Z2 ..." or
    // array of strings ["X1 Y1 Z1", "X2 Y2 Z2", ...]
    struct VecVec3Visitor;

    impl<'de> Visitor<'de> for VecVec3Visitor {
        type Value = Vec<Vector3>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string of 'X Y Z' triplets or an array of 'X Y Z' strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_string_vecvec3(v).map_err(de::Error::custom)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(elem) = seq.next_element::<String>()? {
                vec.push(parse_vec3_str(&elem).map_err(de::Error::custom)?);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(VecVec3Visitor)
}

/// Helper function: parse a string like "25 25 25" into Vector3
fn parse_vec3_str(s: &str) -> Result<Vector3, String> {
    let v = parse_string_vecvec3(s)?;
    match v.as_slice() {
        [single] => Ok(*single),
        _ => Err(format!("Expected 3 values, got {}", 3 * v.len())),
    }
}

pub fn parse_string_vecvec3(s: &str) -> Result<Vec<Vector3>, String> {
    let nums: Vec<Float> = s
        .split_whitespace()
        .map(parse_finite)
        .collect::<Result<_, _>>()?;

    if nums.len() % 3 != 0 {
        return Err(format!("Input length {} not divisible by 3", nums.len()));
    }

    Ok(nums.chunks_exact(3)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect())
}

// NaN and inf parse fine as f64 but have no place in a scene
fn finite(v: Float) -> Result<Float, String> {
    if v.is_finite() { Ok(v) } else { Err(format!("Expected a finite number, got {v}")) }
}

fn parse_finite(x: &str) -> Result<Float, String> {
    let v = x.parse::<Float>().map_err(|e| format!("'{x}': {e}"))?;
    finite(v)
}
