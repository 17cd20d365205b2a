//! JSON graph description loader.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "root": {
//!     "id": "locomotion",
//!     "type": "blendLinear",
//!     "data": { "alpha": 0.0, "sync": true, "timeScale": 1.0, "alphaVar": "speed" },
//!     "children": [
//!       { "id": "walk", "type": "clip",
//!         "data": { "url": "walk.fbx", "startFrame": 0, "endFrame": 29,
//!                   "timeScale": 1.0, "loopFlag": true },
//!         "children": [] }
//!     ]
//!   }
//! }
//! ```
//!
//! Clip urls are resolved through a [`ClipLibrary`]; this module never
//! touches the filesystem.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::animation::clip::ClipLibrary;
use crate::animation::nodes::{
    AnimBlendLinear, AnimClip, AnimManipulator, AnimNode, JointVar, JointVarKind,
};
use crate::errors::{AnimError, Result};

const SUPPORTED_VERSION: &str = "1.0";

#[derive(Debug, Deserialize)]
struct GraphDesc {
    version: String,
    root: NodeDesc,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum NodeType {
    Clip,
    BlendLinear,
    Manipulator,
}

#[derive(Debug, Deserialize)]
struct NodeDesc {
    id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    children: Vec<NodeDesc>,
}

fn default_one() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClipData {
    url: String,
    start_frame: f32,
    end_frame: f32,
    #[serde(default = "default_one")]
    time_scale: f32,
    #[serde(default)]
    loop_flag: bool,
    #[serde(default)]
    time_scale_var: String,
    #[serde(default)]
    loop_flag_var: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlendLinearData {
    #[serde(default)]
    alpha: f32,
    #[serde(default)]
    sync: bool,
    #[serde(default = "default_one")]
    time_scale: f32,
    #[serde(default)]
    alpha_var: String,
    #[serde(default)]
    time_scale_var: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JointVarData {
    var: String,
    joint_name: String,
    #[serde(rename = "type")]
    kind: JointVarKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManipulatorData {
    #[serde(default = "default_one")]
    alpha: f32,
    #[serde(default)]
    alpha_var: String,
    #[serde(default)]
    joints: Vec<JointVarData>,
}

/// Builds [`AnimNode`] trees from JSON graph descriptions.
pub struct AnimGraphLoader<'a> {
    library: &'a ClipLibrary,
}

impl<'a> AnimGraphLoader<'a> {
    #[must_use]
    pub fn new(library: &'a ClipLibrary) -> Self {
        Self { library }
    }

    pub fn load_str(&self, json: &str) -> Result<AnimNode> {
        let desc: GraphDesc = serde_json::from_str(json)?;
        self.load_desc(desc)
    }

    pub fn load_value(&self, json: Value) -> Result<AnimNode> {
        let desc: GraphDesc = serde_json::from_value(json)?;
        self.load_desc(desc)
    }

    fn load_desc(&self, desc: GraphDesc) -> Result<AnimNode> {
        if desc.version != SUPPORTED_VERSION {
            return Err(AnimError::UnsupportedVersion(desc.version));
        }
        let root = self.build_node(desc.root)?;
        log::debug!("Loaded animation graph rooted at '{}'", root.id());
        Ok(root)
    }

    fn build_node(&self, desc: NodeDesc) -> Result<AnimNode> {
        let NodeDesc {
            id,
            node_type,
            data,
            children,
        } = desc;

        let children = children
            .into_iter()
            .map(|child| self.build_node(child))
            .collect::<Result<Vec<_>>>()?;

        match node_type {
            NodeType::Clip => {
                let data: ClipData = decode(&id, data)?;
                if !children.is_empty() {
                    return Err(AnimError::TooManyChildren {
                        id,
                        max: 0,
                        got: children.len(),
                    });
                }
                let clip = self.library.get(&data.url).cloned().ok_or_else(|| {
                    AnimError::UnknownClip {
                        id: id.clone(),
                        url: data.url.clone(),
                    }
                })?;
                let mut node = AnimClip::new(
                    &id,
                    clip,
                    data.start_frame,
                    data.end_frame,
                    data.time_scale,
                    data.loop_flag,
                );
                node.set_time_scale_var(&data.time_scale_var);
                node.set_loop_flag_var(&data.loop_flag_var);
                Ok(node.into())
            }
            NodeType::BlendLinear => {
                let data: BlendLinearData = decode(&id, data)?;
                let mut node =
                    AnimBlendLinear::new(&id, data.alpha, data.sync, data.time_scale, children)?;
                node.set_alpha_var(&data.alpha_var);
                node.set_time_scale_var(&data.time_scale_var);
                Ok(node.into())
            }
            NodeType::Manipulator => {
                let data: ManipulatorData = decode(&id, data)?;
                if children.len() > 1 {
                    return Err(AnimError::TooManyChildren {
                        id,
                        max: 1,
                        got: children.len(),
                    });
                }
                let mut node = AnimManipulator::new(&id, data.alpha);
                node.set_alpha_var(&data.alpha_var);
                for joint in &data.joints {
                    node.add_joint_var(JointVar::new(&joint.var, &joint.joint_name, joint.kind));
                }
                if let Some(child) = children.into_iter().next() {
                    node.set_child(child);
                }
                Ok(node.into())
            }
        }
    }
}

fn decode<T: DeserializeOwned>(id: &str, data: Value) -> Result<T> {
    // Nodes may omit `data` entirely; treat that as an empty object.
    let data = if data.is_null() { Value::Object(serde_json::Map::new()) } else { data };
    serde_json::from_value(data).map_err(|source| AnimError::BadNodeData {
        id: id.to_string(),
        source,
    })
}
