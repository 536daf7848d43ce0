use std::fmt;

use serde::{Deserialize, Serialize};

use tessel_map::VoxelMap;

/// Longest sign text kept, in bytes, including room for a terminator.
pub const MAX_SIGN_LENGTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sign {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub face: i32,
    pub text: String,
}

impl Sign {
    /// Text is cut to fit `MAX_SIGN_LENGTH` on a char boundary.
    pub fn new(x: i32, y: i32, z: i32, face: i32, text: &str) -> Self {
        let mut end = text.len().min(MAX_SIGN_LENGTH - 1);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            x,
            y,
            z,
            face,
            text: text[..end].to_string(),
        }
    }
}

/// Last observer pose, restored on the next start.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rx: f32,
    pub ry: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store no longer accepts operations.
    Closed,
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Closed => write!(f, "store is closed"),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistent home of block, light, sign and chunk-key data.
///
/// Writes land in an open transaction until `commit`. Loads see committed data plus
/// the open transaction.
pub trait DurableStore: Send + Sync {
    fn insert_block(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    ) -> Result<(), StoreError>;
    fn insert_light(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    ) -> Result<(), StoreError>;
    #[allow(clippy::too_many_arguments)]
    fn insert_sign(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        face: i32,
        text: &str,
    ) -> Result<(), StoreError>;
    fn delete_sign(&self, x: i32, y: i32, z: i32, face: i32) -> Result<(), StoreError>;
    fn delete_signs(&self, x: i32, y: i32, z: i32) -> Result<(), StoreError>;
    fn set_key(&self, p: i32, q: i32, key: i32) -> Result<(), StoreError>;
    /// Version key of chunk `(p,q)`, 0 when never set.
    fn get_key(&self, p: i32, q: i32) -> Result<i32, StoreError>;
    fn commit(&self) -> Result<(), StoreError>;
    fn load_blocks(&self, p: i32, q: i32, map: &mut VoxelMap) -> Result<(), StoreError>;
    fn load_lights(&self, p: i32, q: i32, map: &mut VoxelMap) -> Result<(), StoreError>;
    fn load_signs(&self, p: i32, q: i32) -> Result<Vec<Sign>, StoreError>;
    fn save_state(&self, state: ObserverState) -> Result<(), StoreError>;
    fn load_state(&self) -> Result<Option<ObserverState>, StoreError>;
}
