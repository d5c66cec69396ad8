//! Export registry — what each file makes visible to other files.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{FileId, SymbolId};
use crate::index::{DefKind, Definition};

/// One entry in a file's export table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Export {
    /// A symbol defined in the exporting file itself.
    Local(SymbolId),
    /// A re-export: the name is forwarded from another module. Resolution
    /// chases `source` and looks up `imported_name` there.
    Reexport {
        source: SmolStr,
        imported_name: SmolStr,
    },
}

/// Per-file export tables, keyed by exported name.
///
/// The table preserves declaration order so snapshots stay deterministic.
/// When a name is exported twice the later declaration wins, matching how
/// module systems shadow earlier bindings.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    by_file: FxHashMap<FileId, IndexMap<SmolStr, Export>>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a file's export table from its definitions.
    pub fn update_file(&mut self, file: FileId, definitions: &[Definition]) {
        let mut table = IndexMap::new();

        for def in definitions {
            let Some(info) = &def.export else { continue };

            let export = match &def.kind {
                DefKind::Import { source, .. } if info.is_reexport => Export::Reexport {
                    source: source.clone(),
                    imported_name: def.name.clone(),
                },
                _ => Export::Local(def.id.clone()),
            };
            table.insert(info.exported_name.clone(), export);
        }

        if table.is_empty() {
            self.by_file.remove(&file);
        } else {
            self.by_file.insert(file, table);
        }
    }

    pub fn remove_file(&mut self, file: FileId) {
        self.by_file.remove(&file);
    }

    pub fn clear(&mut self) {
        self.by_file.clear();
    }

    /// Look up what `file` exports under `name`.
    pub fn lookup(&self, file: FileId, name: &str) -> Option<&Export> {
        self.by_file.get(&file)?.get(name)
    }

    /// All exports of `file` in declaration order.
    pub fn exports_of(&self, file: FileId) -> impl Iterator<Item = (&SmolStr, &Export)> {
        self.by_file.get(&file).into_iter().flatten()
    }
}
