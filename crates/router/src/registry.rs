//! Category-partitioned command registry.
//!
//! Each partition sits behind its own `RwLock`, so dispatchers reading one
//! category never wait on a late registration into another. Registration is
//! append-only: nothing is ever removed for the lifetime of the registry.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::info;

use crate::{
    descriptor::{Category, CommandDescriptor},
    handler::CommandHandler,
};

/// Identity assigned to a registered (descriptor, handler) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered command as seen by readers.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub id: CommandId,
    pub descriptor: Arc<CommandDescriptor>,
    pub handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Partition {
    order: Vec<RegisteredCommand>,
    by_id: HashMap<CommandId, usize>,
}

pub struct CommandRegistry {
    partitions: [RwLock<Partition>; Category::COUNT],
    next_id: AtomicU64,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            partitions: std::array::from_fn(|_| RwLock::new(Partition::default())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a command to the partition chosen by its descriptor's category.
    /// Duplicate names are allowed; the earlier registration is tried first.
    pub fn register(
        &self,
        descriptor: CommandDescriptor,
        handler: impl CommandHandler + 'static,
    ) -> CommandId {
        self.register_shared(descriptor, Arc::new(handler))
    }

    pub fn register_shared(
        &self,
        descriptor: CommandDescriptor,
        handler: Arc<dyn CommandHandler>,
    ) -> CommandId {
        let id = CommandId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let category = descriptor.category();
        let name = descriptor.name().to_string();
        let command = RegisteredCommand {
            id,
            descriptor: Arc::new(descriptor),
            handler,
        };

        {
            let mut partition = self.partitions[category.index()]
                .write()
                .unwrap_or_else(|e| e.into_inner());
            let position = partition.order.len();
            partition.order.push(command);
            partition.by_id.insert(id, position);
        }

        info!(command = %name, %category, %id, "command registered");
        id
    }

    /// Snapshot of a partition in registration order.
    pub fn lookup(&self, category: Category) -> Vec<RegisteredCommand> {
        self.partitions[category.index()]
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .order
            .clone()
    }

    pub fn get(&self, id: CommandId) -> Option<RegisteredCommand> {
        self.partitions.iter().find_map(|lock| {
            let partition = lock.read().unwrap_or_else(|e| e.into_inner());
            partition
                .by_id
                .get(&id)
                .and_then(|&i| partition.order.get(i).cloned())
        })
    }

    pub fn len_of(&self, category: Category) -> usize {
        self.partitions[category.index()]
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .order
            .len()
    }

    /// Total number of registered commands across every partition.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|&c| self.len_of(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
