use tessel_blocks::BlockId;

/// Outbound half of a remote world source. Calls must not block.
pub trait RemoteNotifier: Send + Sync {
    /// Asks for chunk `(p,q)` changes newer than `key`.
    fn request_chunk(&self, p: i32, q: i32, key: i32);
    fn send_block(&self, x: i32, y: i32, z: i32, w: BlockId);
    fn send_light(&self, x: i32, y: i32, z: i32, w: i8);
    fn send_sign(&self, x: i32, y: i32, z: i32, face: i32, text: &str);
}

/// Single-player: nothing leaves the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineRemote;

impl RemoteNotifier for OfflineRemote {
    fn request_chunk(&self, _p: i32, _q: i32, _key: i32) {}
    fn send_block(&self, _x: i32, _y: i32, _z: i32, _w: BlockId) {}
    fn send_light(&self, _x: i32, _y: i32, _z: i32, _w: i8) {}
    fn send_sign(&self, _x: i32, _y: i32, _z: i32, _face: i32, _text: &str) {}
}

/// Inbound updates from a remote world source, already decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteEvent {
    Block {
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: BlockId,
    },
    Light {
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    },
    /// New version key for chunk `(p,q)`.
    Key { p: i32, q: i32, key: i32 },
    /// Chunk `(p,q)` should be re-meshed.
    Redraw { p: i32, q: i32 },
    Sign {
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        face: i32,
        text: String,
    },
}
