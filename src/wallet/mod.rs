mod graph;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::util::stable_hash;

pub use graph::{EdgeRejection, HierarchyRow, WalletGraph, WalletPatch};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletColor {
    #[default]
    Purple,
    Blue,
    Green,
    Red,
}

impl WalletColor {
    pub const PALETTE: [WalletColor; 4] = [Self::Blue, Self::Green, Self::Red, Self::Purple];

    pub fn for_id(id: &str) -> Self {
        Self::PALETTE[(stable_hash(id) % Self::PALETTE.len() as u64) as usize]
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Purple => [168, 85, 247],
            Self::Blue => [59, 130, 246],
            Self::Green => [34, 197, 94],
            Self::Red => [239, 68, 68],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletNode {
    pub id: String,
    pub name: String,
    pub address: String,
    pub x: f32,
    pub y: f32,
    pub condition: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub color: WalletColor,
    #[serde(default)]
    pub valid: bool,
}

impl WalletNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}
