//! Uniform view over the nodes of the storage tree.
//!
//! The tree is made of distinct structs. `Entity` wraps a reference to any of
//! them so that traversals can hand out root-to-node paths, and consumers can
//! match over every kind of node exhaustively.

use super::{
    Filesystem, LuksContainer, LvmLogicalVolume, LvmVolumeGroup, Partition, PartitionTable,
    Payload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity<'a> {
    PartitionTable(&'a PartitionTable),
    Partition(&'a Partition),
    Luks(&'a LuksContainer),
    VolumeGroup(&'a LvmVolumeGroup),
    LogicalVolume(&'a LvmLogicalVolume),
    Filesystem(&'a Filesystem),
}

impl<'a> Entity<'a> {
    /// Returns the kind of the entity, for logging and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::PartitionTable(_) => "partition-table",
            Entity::Partition(_) => "partition",
            Entity::Luks(_) => "luks",
            Entity::VolumeGroup(_) => "volume-group",
            Entity::LogicalVolume(_) => "logical-volume",
            Entity::Filesystem(_) => "filesystem",
        }
    }

    /// Returns a user friendly description of the entity.
    ///
    /// Output examples:
    ///
    /// - `partition [start:1048576 size:4096]`
    /// - `luks container [uuid:abcd1234-...]`
    /// - `filesystem [type:ext4 mnt:/]`
    pub fn describe(&self) -> String {
        match self {
            Entity::PartitionTable(pt) => format!("partition table [type:{}]", pt.pt_type),
            Entity::Partition(p) => format!("partition [start:{} size:{}]", p.start, p.size),
            Entity::Luks(luks) => format!("luks container [uuid:{}]", luks.uuid),
            Entity::VolumeGroup(vg) => format!("volume group '{}'", vg.name),
            Entity::LogicalVolume(lv) => format!("logical volume '{}'", lv.name),
            Entity::Filesystem(fs) => format!("filesystem [{}]", fs.description()),
        }
    }

    /// Returns the direct children of the entity, in tree order.
    pub fn children(&self) -> Vec<Entity<'a>> {
        match *self {
            Entity::PartitionTable(pt) => pt.partitions.iter().map(Entity::Partition).collect(),
            Entity::Partition(p) => p.payload.iter().map(Entity::from).collect(),
            Entity::Luks(luks) => vec![Entity::from(luks.payload.as_ref())],
            Entity::VolumeGroup(vg) => vg
                .logical_volumes
                .iter()
                .map(Entity::LogicalVolume)
                .collect(),
            Entity::LogicalVolume(lv) => vec![Entity::from(&lv.payload)],
            Entity::Filesystem(_) => vec![],
        }
    }

    pub fn as_filesystem(&self) -> Option<&'a Filesystem> {
        match *self {
            Entity::Filesystem(fs) => Some(fs),
            _ => None,
        }
    }
}

impl<'a> From<&'a Payload> for Entity<'a> {
    fn from(payload: &'a Payload) -> Self {
        match payload {
            Payload::Filesystem(fs) => Entity::Filesystem(fs),
            Payload::Luks(luks) => Entity::Luks(luks),
            Payload::Lvm(vg) => Entity::VolumeGroup(vg),
        }
    }
}

impl<'a> From<&'a PartitionTable> for Entity<'a> {
    fn from(pt: &'a PartitionTable) -> Self {
        Entity::PartitionTable(pt)
    }
}

/// The path from the root of the tree to an entity, both ends included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPath<'a> {
    nodes: Vec<Entity<'a>>,
    entity: Entity<'a>,
}

impl<'a> EntityPath<'a> {
    /// The entity the path leads to.
    pub fn entity(&self) -> Entity<'a> {
        self.entity
    }

    /// Every entity on the path, starting at the root and ending with the
    /// entity itself.
    pub fn nodes(&self) -> &[Entity<'a>] {
        &self.nodes
    }

    /// Every entity on the path except the entity itself.
    pub fn ancestors(&self) -> &[Entity<'a>] {
        self.nodes
            .split_last()
            .map(|(_, ancestors)| ancestors)
            .unwrap_or_default()
    }
}

impl PartitionTable {
    /// Returns the path to every entity of the tree, in pre-order. The
    /// partition table itself comes first.
    pub fn entities(&self) -> Vec<EntityPath<'_>> {
        fn walk<'a>(
            entity: Entity<'a>,
            stack: &mut Vec<Entity<'a>>,
            out: &mut Vec<EntityPath<'a>>,
        ) {
            stack.push(entity);
            out.push(EntityPath {
                nodes: stack.clone(),
                entity,
            });
            for child in entity.children() {
                walk(child, stack, out);
            }
            stack.pop();
        }

        let mut out = Vec::new();
        walk(Entity::from(self), &mut Vec::new(), &mut out);
        out
    }

    /// Returns every filesystem of the tree along with the path to it, in
    /// pre-order.
    pub fn mountables(&self) -> Vec<(&Filesystem, EntityPath<'_>)> {
        self.entities()
            .into_iter()
            .filter_map(|path| path.entity().as_filesystem().map(|fs| (fs, path)))
            .collect()
    }
}
