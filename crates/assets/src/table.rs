use scenekit_common::MeshHandle;

use crate::mesh::AnimatedMesh;

/// Errors from asset lookups and construction.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("mesh {mesh}: {bones} bone matrices but {inverse_binds} inverse bind matrices")]
    BoneCountMismatch {
        mesh: String,
        bones: usize,
        inverse_binds: usize,
    },
}

/// Owns every loaded mesh. Entities and scene slots hold `MeshHandle`s, so
/// one mesh can back any number of instances.
#[derive(Default)]
pub struct MeshTable {
    meshes: Vec<Box<dyn AnimatedMesh>>,
}

impl std::fmt::Debug for MeshTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.meshes.iter().map(|m| m.name()))
            .finish()
    }
}

impl MeshTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its handle. Handles are never reused.
    pub fn insert(&mut self, mesh: impl AnimatedMesh + 'static) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        tracing::debug!(name = mesh.name(), ?handle, "mesh registered");
        self.meshes.push(Box::new(mesh));
        handle
    }

    /// Resolve a handle, failing with `UnknownMesh` if it was never issued.
    pub fn get(&self, handle: MeshHandle) -> Result<&dyn AnimatedMesh, AssetError> {
        self.meshes
            .get(handle.0 as usize)
            .map(|mesh| &**mesh)
            .ok_or(AssetError::UnknownMesh(handle))
    }

    pub fn get_mut(&mut self, handle: MeshHandle) -> Result<&mut dyn AnimatedMesh, AssetError> {
        match self.meshes.get_mut(handle.0 as usize) {
            Some(mesh) => Ok(&mut **mesh),
            None => Err(AssetError::UnknownMesh(handle)),
        }
    }

    pub fn contains(&self, handle: MeshHandle) -> bool {
        (handle.0 as usize) < self.meshes.len()
    }

    /// First mesh registered under `name`.
    pub fn find_by_name(&self, name: &str) -> Option<MeshHandle> {
        self.meshes
            .iter()
            .position(|m| m.name() == name)
            .map(|i| MeshHandle(i as u32))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
