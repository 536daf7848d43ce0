use tessel_persist::Sign;

/// Signs attached to voxels of one chunk. At most one sign per (x,y,z,face).
#[derive(Clone, Debug, Default)]
pub struct SignList {
    signs: Vec<Sign>,
}

impl SignList {
    pub fn from_signs(signs: Vec<Sign>) -> Self {
        let mut list = Self::default();
        for s in signs {
            list.add(s);
        }
        list
    }

    /// Inserts `sign`, replacing any sign already on the same face.
    pub fn add(&mut self, sign: Sign) {
        self.remove(sign.x, sign.y, sign.z, sign.face);
        self.signs.push(sign);
    }

    /// Returns true if a sign was removed.
    pub fn remove(&mut self, x: i32, y: i32, z: i32, face: i32) -> bool {
        let before = self.signs.len();
        self.signs
            .retain(|s| (s.x, s.y, s.z, s.face) != (x, y, z, face));
        self.signs.len() != before
    }

    /// Drops every face of the voxel at `(x,y,z)`.
    pub fn remove_all(&mut self, x: i32, y: i32, z: i32) -> bool {
        let before = self.signs.len();
        self.signs.retain(|s| (s.x, s.y, s.z) != (x, y, z));
        self.signs.len() != before
    }

    pub fn get(&self, x: i32, y: i32, z: i32, face: i32) -> Option<&Sign> {
        self.signs
            .iter()
            .find(|s| (s.x, s.y, s.z, s.face) == (x, y, z, face))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sign> {
        self.signs.iter()
    }

    pub fn len(&self) -> usize {
        self.signs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }
}
