//! Model templates from glTF / GLB files.
//!
//! Only the node hierarchy is read: node names, mesh names and local
//! transforms. Vertex data stays with the renderer that draws the template.

use anyhow::anyhow;
use cgmath::{Deg, Euler, Quaternion, Vector3};

use crate::{
    data_structures::{
        instance::Instance,
        template::{Template, TemplateNode},
    },
    resources::rest::Asset,
};

fn to_template_node(node: gltf::scene::Node) -> TemplateNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    TemplateNode {
        name,
        mesh: node
            .mesh()
            .map(|mesh| mesh.name().unwrap_or("unknown_mesh").to_string()),
        local: Instance {
            position: translation.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        },
        children: node.children().map(to_template_node).collect(),
    }
}

/// Root nodes of the default scene (or the first scene if none is marked
/// default).
pub fn parse_nodes(file_name: &str, bytes: &[u8]) -> anyhow::Result<Vec<TemplateNode>> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| anyhow!("{file_name} contains no scene"))?;
    let nodes: Vec<TemplateNode> = scene.nodes().map(to_template_node).collect();
    if nodes.is_empty() {
        log::warn!("{file_name} has an empty scene, marks will be invisible");
    }
    Ok(nodes)
}

/// Correction from the asset library: rotation (degrees, XYZ) and offset
/// applied to the model before the mark transform.
pub fn asset_root(asset: &Asset) -> Instance {
    Instance {
        position: Vector3::new(asset.translation_x, asset.translation_y, asset.translation_z),
        rotation: Quaternion::from(Euler {
            x: Deg(asset.rotation_x),
            y: Deg(asset.rotation_y),
            z: Deg(asset.rotation_z),
        }),
        scale: Vector3::new(1.0, 1.0, 1.0),
    }
}

pub fn model_template(asset: &Asset, bytes: &[u8]) -> anyhow::Result<Template> {
    let nodes = parse_nodes(&asset.name, bytes)?;
    Ok(Template::model(asset.name.clone(), nodes, asset_root(asset)))
}

#[cfg(test)]
mod tests {
    use cgmath::Rotation;

    use super::*;
    use crate::data_structures::template::TemplateKind;

    const CAR: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "body", "translation": [0, 0, 0.5], "children": [1]},
            {"name": "cabin", "scale": [1, 1, 2]}
        ]
    }"#;

    #[test]
    fn keeps_the_node_hierarchy() {
        let nodes = parse_nodes("car.gltf", CAR.as_bytes()).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "body");
        assert_eq!(nodes[0].local.position, Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(nodes[0].children[0].local.scale, Vector3::new(1.0, 1.0, 2.0));
        assert_eq!(nodes[0].count(), 2);
    }

    #[test]
    fn applies_asset_corrections() {
        let asset = Asset {
            rotation_z: 90.0,
            translation_z: 1.0,
            ..Asset::new("car")
        };
        let template = model_template(&asset, CAR.as_bytes()).unwrap();
        assert!(matches!(template.kind, TemplateKind::Model(_)));
        assert_eq!(template.root.position, Vector3::new(0.0, 0.0, 1.0));
        let x_axis = template.root.rotation.rotate_vector(Vector3::unit_x());
        assert!((x_axis.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_nodes("broken.glb", b"not a model").is_err());
    }
}
